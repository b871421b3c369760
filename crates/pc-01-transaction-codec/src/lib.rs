//! # Transaction Codec (pc-01)
//!
//! Canonical binary layout, hashing, signing and sender recovery for the
//! fixed-shape child-chain transaction (two inputs, two outputs, one fee).
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): pure encoding and cryptography, no I/O
//!   - `entities`: [`Transaction`], [`TxOutput`], [`Slot`]
//!   - `encoding`: canonical unsigned and signed RLP layouts
//!   - `ecdsa`: keccak256, secp256k1 recoverable signatures, address derivation
//!
//! ## Compatibility Notes
//!
//! - The unsigned encoding is the exact byte string the root-chain contract
//!   hashes. Reordering fields breaks every signature and Merkle proof.
//! - Signatures are `r || s || v` (65 bytes, `v` in {27, 28}); 65 zero bytes
//!   means "unsigned".

pub mod domain;

// Re-export public API
pub use domain::ecdsa::{
    address_from_pubkey, address_from_signing_key, keccak256, recover_address, sign_hash,
};
pub use domain::entities::{Signature, Slot, Transaction, TxOutput, NULL_SIGNATURE, SIGNATURE_LENGTH};
pub use domain::errors::{CodecError, SignatureError};
pub use k256::ecdsa::SigningKey;
