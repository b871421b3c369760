//! # Domain Entities
//!
//! Ledger entries, finalized blocks and deposit receipts.

use pc_01_transaction_codec::{Signature, Transaction, NULL_SIGNATURE};
use pc_02_fixed_merkle::{FixedMerkleTree, MerkleError};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use shared_types::{Address, Hash, UtxoPosition, U256};

/// A ledger entry for one transaction output.
///
/// ## Invariant
///
/// `spent` flips from `false` to `true` exactly once and never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoEntry {
    pub owner: Address,
    pub amount: U256,
    pub spent: bool,
    /// Position of the child-chain transaction that consumed this output.
    pub spent_by: Option<UtxoPosition>,
    /// Set when the output was withdrawn through a root-chain exit.
    pub exited: bool,
}

impl UtxoEntry {
    pub fn unspent(owner: Address, amount: U256) -> Self {
        Self {
            owner,
            amount,
            spent: false,
            spent_by: None,
            exited: false,
        }
    }
}

/// How a block number was allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    /// Single-transaction block created by a root-chain deposit.
    Deposit,
    /// Block assembled from transfers and signed by the operator.
    Operator,
}

/// A finalized, immutable child-chain block.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub number: u64,
    pub kind: BlockKind,
    /// Inclusion order; transaction `i` is leaf `i`.
    pub transactions: Vec<Transaction>,
    pub root: Hash,
    /// Seconds since the Unix epoch at finalization.
    pub timestamp: u64,
    /// Operator signature over `root`. All zero for deposit blocks.
    #[serde_as(as = "Bytes")]
    pub signature: Signature,
}

impl Block {
    pub fn is_deposit(&self) -> bool {
        self.kind == BlockKind::Deposit
    }

    pub fn is_signed(&self) -> bool {
        self.signature != NULL_SIGNATURE
    }

    pub fn transaction(&self, txindex: u32) -> Option<&Transaction> {
        self.transactions.get(txindex as usize)
    }

    /// Commitment leaves in inclusion order.
    pub fn leaves(&self) -> Vec<Hash> {
        self.transactions.iter().map(Transaction::merkle_hash).collect()
    }

    /// Rebuild the commitment tree for this block.
    pub fn merkle_tree(&self, depth: usize) -> Result<FixedMerkleTree, MerkleError> {
        FixedMerkleTree::new(depth, self.leaves())
    }
}

/// Result of applying a deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositReceipt {
    pub blknum: u64,
    /// Position of the single deposit output.
    pub position: UtxoPosition,
    pub tx_hash: Hash,
    pub root: Hash,
}
