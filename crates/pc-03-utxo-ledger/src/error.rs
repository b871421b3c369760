//! Error types for the child-chain ledger

use pc_01_transaction_codec::{CodecError, SignatureError};
use pc_02_fixed_merkle::MerkleError;
use shared_types::{Address, Hash, PositionError, UtxoPosition, U256};
use thiserror::Error;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, ChildChainError>;

/// Coarse classification callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing, malformed or non-matching transaction signature.
    Signature,
    /// Unknown or already-spent input, or an inconsistent ledger request.
    Ledger,
    /// Block submission by a non-operator key or without a key.
    Authorization,
    /// Structurally invalid request or configuration.
    Malformed,
}

/// Errors returned by ledger operations.
///
/// Every error leaves the ledger exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChildChainError {
    /// A required input signature is missing, malformed or wrong
    #[error("Invalid transaction signature: {0}")]
    InvalidSignature(#[from] CodecError),

    /// Input references no known output
    #[error("UTXO not found: {position}")]
    UtxoNotFound { position: UtxoPosition },

    /// Input was already consumed
    #[error("UTXO already spent: {position}")]
    UtxoAlreadySpent { position: UtxoPosition },

    /// Inputs do not cover outputs plus fee exactly
    #[error("Balance mismatch: inputs {inputs}, outputs plus fee {outputs}")]
    BalanceMismatch { inputs: U256, outputs: U256 },

    /// Amount arithmetic overflowed 256 bits
    #[error("Amount overflow")]
    AmountOverflow,

    /// Transfer references no input at all
    #[error("Transaction has no inputs")]
    NoInputs,

    /// Both slots reference the same output
    #[error("Duplicate input: {position}")]
    DuplicateInput { position: UtxoPosition },

    /// Pending block already holds `2^depth` transactions
    #[error("Pending block is full ({capacity} transactions)")]
    BlockFull { capacity: usize },

    /// Deposit of zero value
    #[error("Deposit amount must be non-zero")]
    ZeroDeposit,

    /// Root-chain deposit event does not match the next allocation
    #[error("Deposit block mismatch: expected {expected}, got {actual}")]
    DepositBlockMismatch { expected: u64, actual: u64 },

    /// All deposit numbers below the pending block are used
    #[error("Deposit numbers exhausted before block {pending_block}")]
    DepositCapacityExhausted { pending_block: u64 },

    /// Exit event disagrees with the recorded output
    #[error("Exit does not match UTXO {position}")]
    ExitMismatch { position: UtxoPosition },

    /// `submit_block` called without a key
    #[error("No signing key supplied for block submission")]
    MissingSigningKey,

    /// Block signed by someone other than the authority
    #[error("Unauthorized block signer: expected {expected:?}, got {actual:?}")]
    UnauthorizedSigner { expected: Address, actual: Address },

    /// Signed root differs from the pending block's root
    #[error("Root mismatch: expected {expected:?}, got {actual:?}")]
    RootMismatch { expected: Hash, actual: Hash },

    /// Block signature could not be produced or recovered
    #[error("Invalid block signature: {0}")]
    InvalidBlockSignature(#[source] SignatureError),

    /// Commitment tree error
    #[error("Merkle error: {0}")]
    Merkle(#[from] MerkleError),

    /// Position outside the packed layout
    #[error("Position error: {0}")]
    Position(#[from] PositionError),

    /// Next block number does not fit in 64 bits
    #[error("Block number overflow")]
    BlockNumberOverflow,

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ChildChainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidSignature(_) => ErrorKind::Signature,
            Self::UtxoNotFound { .. }
            | Self::UtxoAlreadySpent { .. }
            | Self::BalanceMismatch { .. }
            | Self::DepositBlockMismatch { .. }
            | Self::DepositCapacityExhausted { .. }
            | Self::ExitMismatch { .. } => ErrorKind::Ledger,
            Self::MissingSigningKey
            | Self::UnauthorizedSigner { .. }
            | Self::RootMismatch { .. }
            | Self::InvalidBlockSignature(_) => ErrorKind::Authorization,
            Self::AmountOverflow
            | Self::NoInputs
            | Self::DuplicateInput { .. }
            | Self::BlockFull { .. }
            | Self::ZeroDeposit
            | Self::Merkle(_)
            | Self::Position(_)
            | Self::BlockNumberOverflow
            | Self::InvalidConfig(_) => ErrorKind::Malformed,
        }
    }
}
