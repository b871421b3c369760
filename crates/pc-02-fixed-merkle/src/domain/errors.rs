//! # Domain Errors
//!
//! Error types for tree construction and proof handling.

use shared_types::Hash;
use thiserror::Error;

/// Errors that can occur while building trees or producing proofs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MerkleError {
    /// Depth outside `1..=MAX_DEPTH`.
    #[error("Invalid tree depth {depth} (allowed 1..={max})")]
    InvalidDepth { depth: usize, max: usize },

    /// More leaves than the tree width `2^depth`.
    #[error("Too many leaves: {count} exceeds width {capacity}")]
    TooManyLeaves { count: usize, capacity: usize },

    /// The requested leaf is not among the real leaves.
    #[error("Leaf not found: {}", hex::encode(&leaf[..8]))]
    LeafNotFound { leaf: Hash },

    /// Index outside the populated leaf range.
    #[error("Leaf index {index} out of range (leaf count {count})")]
    IndexOutOfRange { index: usize, count: usize },

    /// Proof bytes are not a whole number of 32-byte siblings.
    #[error("Malformed proof: {length} bytes is not a multiple of 32")]
    MalformedProof { length: usize },
}
