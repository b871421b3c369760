//! Root-chain events consumed by the ledger

use serde::{Deserialize, Serialize};
use shared_types::{Address, UtxoPosition, U256};

/// `Deposit(depositor, blknum, amount)` emitted by the root-chain contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositCreated {
    pub depositor: Address,
    pub blknum: u64,
    pub amount: U256,
}

/// `ExitStarted(exitor, utxoPos, amount)` emitted by the root-chain contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitStarted {
    pub exitor: Address,
    pub utxo_pos: UtxoPosition,
    pub amount: U256,
}

/// Events the child chain follows on the root chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RootChainEvent {
    Deposit(DepositCreated),
    ExitStarted(ExitStarted),
}

impl From<DepositCreated> for RootChainEvent {
    fn from(event: DepositCreated) -> Self {
        Self::Deposit(event)
    }
}

impl From<ExitStarted> for RootChainEvent {
    fn from(event: ExitStarted) -> Self {
        Self::ExitStarted(event)
    }
}
