//! Error types for the operator service

use pc_03_utxo_ledger::ChildChainError;
use thiserror::Error;

use crate::domain::ExitError;
use crate::ports::GatewayError;

/// Result type for operator flows
pub type Result<T> = std::result::Result<T, OperatorError>;

/// Errors from operator flows
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperatorError {
    /// The ledger refused the operation
    #[error("Ledger error: {0}")]
    Ledger(#[from] ChildChainError),

    /// Exit evidence could not be built
    #[error("Exit error: {0}")]
    Exit(#[from] ExitError),

    /// The root-chain call failed
    #[error("Root chain error: {0}")]
    Gateway(#[from] GatewayError),
}
