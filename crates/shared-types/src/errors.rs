//! # Error Types
//!
//! Errors raised while building shared values.

use thiserror::Error;

/// A UTXO position component does not fit the packed encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    /// Transaction index must be below `100_000`.
    #[error("Transaction index {txindex} out of range (max {max})")]
    TxIndexOutOfRange { txindex: u32, max: u32 },

    /// Output index must be below `10_000`.
    #[error("Output index {oindex} out of range (max {max})")]
    OutputIndexOutOfRange { oindex: u16, max: u16 },

    /// Block number too large to pack into 64 bits.
    #[error("Block number {blknum} overflows the packed position")]
    BlockNumberOverflow { blknum: u64 },
}
