//! # Domain Errors

use pc_02_fixed_merkle::MerkleError;
use shared_types::UtxoPosition;
use thiserror::Error;

/// Errors from exit validation and challenge construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExitError {
    /// The block is unknown or still pending.
    #[error("Block {blknum} is not finalized")]
    BlockNotFinalized { blknum: u64 },

    /// No transaction at the position's index.
    #[error("No transaction at {position}")]
    TransactionNotFound { position: UtxoPosition },

    /// The transaction has no such output.
    #[error("No output at {position}")]
    OutputNotFound { position: UtxoPosition },

    /// The ledger holds no entry for the position.
    #[error("UTXO not found: {position}")]
    UtxoNotFound { position: UtxoPosition },

    /// Claimed owner or amount differs from the committed output.
    #[error("Exit claim does not match output {position}")]
    ClaimMismatch { position: UtxoPosition },

    /// Membership proof does not verify against the block root.
    #[error("Transaction at {position} is not included in its block")]
    NotIncluded { position: UtxoPosition },

    /// The candidate transaction does not spend the exiting output.
    #[error("Transaction at {challenging} does not spend {exit}")]
    NotADoubleSpend {
        exit: UtxoPosition,
        challenging: UtxoPosition,
    },

    /// The exiting output was never spent on the child chain.
    #[error("UTXO {position} is unspent")]
    NotSpent { position: UtxoPosition },

    /// Rebuilt tree disagrees with the stored block root.
    #[error("Stored root of block {blknum} does not match its transactions")]
    CommitmentMismatch { blknum: u64 },

    /// Tree construction failed.
    #[error("Merkle error: {0}")]
    Merkle(#[from] MerkleError),
}
