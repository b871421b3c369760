//! # Inbound Ports
//!
//! Driving API of the ledger.
//!
//! | Trait | Used by |
//! |-------|---------|
//! | [`LedgerReader`] | exit validation, read-only queries |
//! | [`ChildChainApi`] | operator service, client submission |

use pc_01_transaction_codec::{Signature, SigningKey, Transaction};
use shared_types::{Address, Hash, UtxoPosition, U256};
use std::sync::Arc;

use crate::domain::{Block, DepositReceipt, UtxoEntry};
use crate::error::Result;
use crate::events::{DepositCreated, ExitStarted};

/// Read-only view of ledger state.
///
/// Finalized blocks are immutable, so readers never wait on block
/// assembly.
pub trait LedgerReader: Send + Sync {
    /// Ledger entry at `position`.
    fn utxo(&self, position: &UtxoPosition) -> Option<UtxoEntry>;

    /// Finalized block by number.
    fn block(&self, blknum: u64) -> Option<Arc<Block>>;

    /// Transaction by block number and index, pending block included.
    fn transaction(&self, blknum: u64, txindex: u32) -> Option<Transaction>;

    /// Number of the block under construction.
    fn current_block_number(&self) -> u64;

    /// Commitment tree depth for all blocks.
    fn merkle_depth(&self) -> usize;
}

/// Mutating API of the ledger.
///
/// All mutations are serialized; a failed call changes nothing.
pub trait ChildChainApi: LedgerReader {
    /// Create a deposit block holding one output for `owner`.
    fn apply_deposit(&self, owner: Address, amount: U256) -> Result<DepositReceipt>;

    /// Apply a root-chain deposit event.
    fn apply_deposit_event(&self, event: &DepositCreated) -> Result<DepositReceipt>;

    /// Validate and append a transfer to the pending block.
    ///
    /// Returns the transaction's position (output index 0).
    fn apply_transaction(&self, tx: Transaction) -> Result<UtxoPosition>;

    /// Finalize the pending block, signing its root with `key`.
    fn submit_block(&self, key: Option<&SigningKey>) -> Result<Arc<Block>>;

    /// Finalize the pending block with an externally produced signature.
    fn submit_signed_block(&self, root: Hash, signature: Signature) -> Result<Arc<Block>>;

    /// Withdraw an output exited on the root chain.
    fn apply_exit(&self, event: &ExitStarted) -> Result<()>;
}
