//! # Codec Errors
//!
//! Error types for transaction encoding and signature handling.

use shared_types::{Address, PositionError};
use thiserror::Error;

use super::entities::Slot;

/// Errors from the raw secp256k1 layer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// The signature bytes do not form a valid (r, s) pair.
    #[error("Invalid signature format")]
    InvalidFormat,

    /// Signature has high S value (EIP-2 malleability protection)
    #[error("Malleable signature (high S value)")]
    MalleableSignature,

    /// Invalid recovery ID (v must be 0, 1, 27, or 28)
    #[error("Invalid recovery ID: {0}")]
    InvalidRecoveryId(u8),

    /// Failed to recover public key from signature
    #[error("Failed to recover public key")]
    RecoveryFailed,

    /// The signing key refused to sign the prehash.
    #[error("Signing failed")]
    SigningFailed,
}

/// Errors from encoding, decoding and validating transactions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    /// RLP structure could not be decoded.
    #[error("RLP decoding failed: {0}")]
    Rlp(String),

    /// Top-level list has neither 11 (unsigned) nor 13 (signed) items.
    #[error("Invalid field count: expected 11 or 13, got {0}")]
    InvalidFieldCount(usize),

    /// An owner field is not 20 bytes.
    #[error("Invalid address length: {0}")]
    InvalidAddressLength(usize),

    /// A signature field is not 65 bytes.
    #[error("Invalid signature length: {0}")]
    InvalidSignatureLength(usize),

    /// An index field does not fit its packed position width.
    #[error("Field {field} out of range")]
    FieldOutOfRange { field: &'static str },

    /// Input references an invalid UTXO position.
    #[error("Invalid input position: {0}")]
    Position(#[from] PositionError),

    /// The slot references an input but carries the all-zero signature.
    #[error("Missing signature for {slot}")]
    MissingSignature { slot: Slot },

    /// The slot signature is malformed or recovery failed.
    #[error("Invalid signature for {slot}: {source}")]
    InvalidSignature {
        slot: Slot,
        #[source]
        source: SignatureError,
    },

    /// The slot signature recovers to someone other than the input owner.
    #[error("Signer mismatch for {slot}: expected {expected:?}, got {actual:?}")]
    SignerMismatch {
        slot: Slot,
        expected: Address,
        actual: Address,
    },

    /// No owner was supplied for a present input.
    #[error("Owner of input {slot} was not resolved")]
    UnresolvedInput { slot: Slot },

    /// Raw signature error outside of a transaction slot.
    #[error(transparent)]
    Signature(#[from] SignatureError),
}

impl From<rlp::DecoderError> for CodecError {
    fn from(err: rlp::DecoderError) -> Self {
        Self::Rlp(err.to_string())
    }
}
