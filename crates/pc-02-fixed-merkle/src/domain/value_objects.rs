//! # Value Objects
//!
//! Tree shape and padding configuration.

use serde::{Deserialize, Serialize};
use shared_types::Hash;

use super::errors::MerkleError;

/// Padding leaf for unused slots. Inserted as-is, never re-hashed.
pub const DEFAULT_LEAF: Hash = [0u8; 32];

/// Depth used for child-chain block commitments.
///
/// Must equal the root-chain contract's proof length, otherwise proofs
/// fail on-chain.
pub const DEFAULT_DEPTH: usize = 16;

/// Largest supported depth.
pub const MAX_DEPTH: usize = 32;

/// Shape of a fixed-depth tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleConfig {
    /// Number of levels above the leaves. Width is `2^depth`.
    pub depth: usize,
    /// Hash placed in every unused leaf slot.
    pub default_leaf: Hash,
}

impl Default for MerkleConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            default_leaf: DEFAULT_LEAF,
        }
    }
}

impl MerkleConfig {
    pub fn with_depth(depth: usize) -> Self {
        Self {
            depth,
            ..Self::default()
        }
    }

    /// Check the depth is in range.
    pub fn validate(&self) -> Result<(), MerkleError> {
        if self.depth == 0 || self.depth > MAX_DEPTH {
            return Err(MerkleError::InvalidDepth {
                depth: self.depth,
                max: MAX_DEPTH,
            });
        }
        Ok(())
    }

    /// Number of leaf slots, `2^depth`.
    pub fn capacity(&self) -> usize {
        1usize << self.depth
    }
}
