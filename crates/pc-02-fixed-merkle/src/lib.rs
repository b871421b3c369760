//! # Fixed-Depth Merkle Tree (pc-02)
//!
//! Deterministic, order-sensitive commitment over at most `2^depth` leaves,
//! with membership proofs the root-chain contract can re-verify.
//!
//! ## Compatibility
//!
//! | Parameter | Value | Note |
//! |-----------|-------|------|
//! | Hash | keccak256 | parent = H(left \|\| right) |
//! | Depth | 16 | must equal the contract's proof length |
//! | Padding leaf | 32 zero bytes | inserted without hashing |
//! | Proof layout | `32 * depth` bytes | siblings, leaf level first |
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): tree construction and proof logic, no I/O
//!
//! ## Usage
//!
//! ```
//! use pc_02_fixed_merkle::FixedMerkleTree;
//!
//! let leaf = [7u8; 32];
//! let tree = FixedMerkleTree::new(16, vec![leaf]).unwrap();
//! let proof = tree.membership_proof(&leaf).unwrap();
//! assert!(proof.verify(&leaf, &tree.root()));
//! ```

pub mod domain;

// Re-export public API
pub use domain::entities::{empty_root, empty_root_with, keccak256, FixedMerkleTree, MerkleProof};
pub use domain::errors::MerkleError;
pub use domain::value_objects::{MerkleConfig, DEFAULT_DEPTH, DEFAULT_LEAF, MAX_DEPTH};
