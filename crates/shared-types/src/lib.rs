//! # Shared Types Crate
//!
//! Types shared by every child-chain subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: hashes, addresses, amounts and UTXO
//!   positions are defined once here and re-used by the codec, the Merkle
//!   tree, the ledger and the exit validator.
//! - **Wire Compatibility**: [`UtxoPosition`] packs to the exact integer the
//!   root-chain contract expects as `utxoPos`.

pub mod entities;
pub mod errors;
pub mod position;

pub use entities::*;
pub use errors::*;
pub use position::*;
