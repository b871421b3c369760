//! # Domain Entities
//!
//! Fixed-depth binary Merkle tree and its membership proofs.
//!
//! The tree always commits to a full width of `2^depth` leaves. Slots past
//! the real leaves hold the configured default leaf. Only the populated
//! prefix of each level is stored; the remainder is represented by the
//! per-level default subtree hash, which gives the same root and proofs as
//! materialising the full width.

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use shared_types::Hash;

use super::errors::MerkleError;
use super::value_objects::MerkleConfig;

/// A Merkle tree of fixed depth built from an ordered leaf list.
///
/// Rebuilt from scratch for every block; never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedMerkleTree {
    config: MerkleConfig,
    /// `levels[0]` holds the real leaves; `levels[k]` the populated nodes
    /// at height `k`. `levels[depth]` holds the root when non-empty.
    levels: Vec<Vec<Hash>>,
    /// `defaults[k]` is the root of an all-default subtree of height `k`.
    defaults: Vec<Hash>,
}

impl FixedMerkleTree {
    /// Build a tree of `depth` over already-hashed leaves.
    pub fn new(depth: usize, leaves: Vec<Hash>) -> Result<Self, MerkleError> {
        Self::with_config(MerkleConfig::with_depth(depth), leaves)
    }

    /// Build a tree over raw leaf data, hashing each item with keccak256.
    pub fn from_data<T: AsRef<[u8]>>(depth: usize, data: &[T]) -> Result<Self, MerkleError> {
        let leaves = data.iter().map(|item| keccak256(item.as_ref())).collect();
        Self::new(depth, leaves)
    }

    /// Build a tree with an explicit shape and padding leaf.
    pub fn with_config(config: MerkleConfig, leaves: Vec<Hash>) -> Result<Self, MerkleError> {
        config.validate()?;

        let capacity = config.capacity();
        if leaves.len() > capacity {
            return Err(MerkleError::TooManyLeaves {
                count: leaves.len(),
                capacity,
            });
        }

        let defaults = default_hashes(&config);
        let mut levels = Vec::with_capacity(config.depth + 1);
        levels.push(leaves);

        for height in 0..config.depth {
            let current = &levels[height];
            let next: Vec<Hash> = current
                .chunks(2)
                .map(|pair| {
                    let right = pair.get(1).unwrap_or(&defaults[height]);
                    hash_pair(&pair[0], right)
                })
                .collect();
            levels.push(next);
        }

        Ok(Self {
            config,
            levels,
            defaults,
        })
    }

    /// The commitment root.
    pub fn root(&self) -> Hash {
        self.levels[self.config.depth]
            .first()
            .copied()
            .unwrap_or(self.defaults[self.config.depth])
    }

    pub fn depth(&self) -> usize {
        self.config.depth
    }

    pub fn config(&self) -> &MerkleConfig {
        &self.config
    }

    /// Number of real (non-padding) leaves.
    pub fn leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    pub fn leaves(&self) -> &[Hash] {
        &self.levels[0]
    }

    /// Proof for the first occurrence of `leaf`.
    pub fn membership_proof(&self, leaf: &Hash) -> Result<MerkleProof, MerkleError> {
        let index = self
            .leaves()
            .iter()
            .position(|candidate| candidate == leaf)
            .ok_or(MerkleError::LeafNotFound { leaf: *leaf })?;
        self.proof_at(index)
    }

    /// Proof for the real leaf at `index`.
    pub fn proof_at(&self, index: usize) -> Result<MerkleProof, MerkleError> {
        if index >= self.leaf_count() {
            return Err(MerkleError::IndexOutOfRange {
                index,
                count: self.leaf_count(),
            });
        }

        let siblings = (0..self.config.depth)
            .map(|height| {
                let sibling = (index >> height) ^ 1;
                self.levels[height]
                    .get(sibling)
                    .copied()
                    .unwrap_or(self.defaults[height])
            })
            .collect();

        Ok(MerkleProof { index, siblings })
    }

    /// Whether `proof` places `leaf` at `index` under this tree's root.
    pub fn check_membership(&self, leaf: &Hash, index: usize, proof: &MerkleProof) -> bool {
        proof.index == index
            && proof.siblings.len() == self.config.depth
            && proof.verify(leaf, &self.root())
    }
}

/// Root of a tree with no real leaves.
pub fn empty_root(depth: usize) -> Result<Hash, MerkleError> {
    empty_root_with(&MerkleConfig::with_depth(depth))
}

/// Root of a tree with no real leaves under an explicit configuration.
pub fn empty_root_with(config: &MerkleConfig) -> Result<Hash, MerkleError> {
    config.validate()?;
    Ok(default_hashes(config)[config.depth])
}

/// A membership proof: the leaf index plus one sibling per level, leaf
/// level first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    /// Position of the proven leaf.
    pub index: usize,
    /// Sibling hashes from the leaf level up to just below the root.
    pub siblings: Vec<Hash>,
}

impl MerkleProof {
    /// Recompute the root from `leaf` and compare with `root`.
    ///
    /// At each level the index parity selects whether the running hash is
    /// the left or right child.
    pub fn verify(&self, leaf: &Hash, root: &Hash) -> bool {
        // Index bits beyond the proof length would alias another leaf
        let levels = self.siblings.len();
        if levels < usize::BITS as usize && self.index >> levels != 0 {
            return false;
        }

        let mut current = *leaf;
        let mut index = self.index;
        for sibling in &self.siblings {
            current = if index % 2 == 0 {
                hash_pair(&current, sibling)
            } else {
                hash_pair(sibling, &current)
            };
            index /= 2;
        }

        current == *root
    }

    /// Concatenated siblings (`32 * depth` bytes), the proof layout the
    /// root-chain contract consumes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.siblings.concat()
    }

    /// Parse a concatenated sibling list for the leaf at `index`.
    pub fn from_bytes(index: usize, bytes: &[u8]) -> Result<Self, MerkleError> {
        if bytes.len() % 32 != 0 {
            return Err(MerkleError::MalformedProof {
                length: bytes.len(),
            });
        }

        let siblings = bytes
            .chunks_exact(32)
            .map(|chunk| {
                let mut hash = [0u8; 32];
                hash.copy_from_slice(chunk);
                hash
            })
            .collect();

        Ok(Self { index, siblings })
    }

    pub fn depth(&self) -> usize {
        self.siblings.len()
    }
}

/// keccak256, the root-chain hash function.
pub fn keccak256(data: &[u8]) -> Hash {
    Keccak256::digest(data).into()
}

/// parent = keccak256(left || right)
fn hash_pair(left: &Hash, right: &Hash) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

fn default_hashes(config: &MerkleConfig) -> Vec<Hash> {
    let mut defaults = Vec::with_capacity(config.depth + 1);
    defaults.push(config.default_leaf);
    for height in 0..config.depth {
        let below = defaults[height];
        defaults.push(hash_pair(&below, &below));
    }
    defaults
}
