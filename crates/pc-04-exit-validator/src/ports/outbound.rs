//! # Outbound Ports (Driven Ports / SPI)
//!
//! The root-chain contract, as seen by the operator.

use shared_types::{Hash, U256};
use thiserror::Error;

use crate::domain::entities::{ChallengeEvidence, StartExitCall};

/// Error from root-chain calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The contract reverted the call
    #[error("Root chain rejected call: {reason}")]
    Rejected { reason: String },

    /// Transport error
    #[error("Communication error: {0}")]
    Communication(String),
}

/// Gateway to the root-chain contract.
///
/// Implementations own transport, gas and nonce handling.
#[async_trait::async_trait]
pub trait RootChainGateway: Send + Sync {
    /// `deposit(txBytes)` with `value` attached.
    async fn deposit(&self, tx_bytes: Vec<u8>, value: U256) -> Result<(), GatewayError>;

    /// `submitBlock(root)`, signed by the authority.
    async fn submit_block(&self, root: Hash) -> Result<(), GatewayError>;

    /// `startExit(...)`.
    async fn start_exit(&self, call: StartExitCall) -> Result<(), GatewayError>;

    /// `challengeExit(...)`.
    async fn challenge_exit(&self, evidence: ChallengeEvidence) -> Result<(), GatewayError>;
}
