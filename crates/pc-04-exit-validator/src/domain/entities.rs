//! # Domain Entities
//!
//! Exit claims and the evidence packages submitted to the root chain.

use pc_01_transaction_codec::Transaction;
use pc_03_utxo_ledger::ExitStarted;
use serde::{Deserialize, Serialize};
use shared_types::{Address, UtxoPosition, U256};

use super::errors::ExitError;

/// An exit as recorded by the root chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitClaim {
    pub utxo_pos: UtxoPosition,
    pub owner: Address,
    pub amount: U256,
}

impl From<&ExitStarted> for ExitClaim {
    fn from(event: &ExitStarted) -> Self {
        Self {
            utxo_pos: event.utxo_pos,
            owner: event.exitor,
            amount: event.amount,
        }
    }
}

/// Proof that one transaction is committed in a finalized block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InclusionEvidence {
    /// Position of the transaction (output index 0).
    pub tx_pos: UtxoPosition,
    /// Unsigned encoding of the transaction.
    pub tx_bytes: Vec<u8>,
    /// Concatenated Merkle siblings, `32 * depth` bytes.
    pub proof: Vec<u8>,
    /// `sig1 || sig2`, 130 bytes.
    pub sigs: Vec<u8>,
}

/// Everything needed to start an exit on the root chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitEvidence {
    pub utxo_pos: UtxoPosition,
    /// Inclusion of the transaction that created the exiting output.
    pub exit: InclusionEvidence,
    /// Inclusion of that transaction's inputs, per slot. Empty for deposits.
    pub inputs: [Option<InclusionEvidence>; 2],
}

impl ExitEvidence {
    pub fn tx_bytes(&self) -> &[u8] {
        &self.exit.tx_bytes
    }

    pub fn proof(&self) -> &[u8] {
        &self.exit.proof
    }

    pub fn sigs(&self) -> &[u8] {
        &self.exit.sigs
    }
}

/// Argument triple for one transaction in a `startExit` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxArgs {
    pub tx_bytes: Vec<u8>,
    pub proof: Vec<u8>,
    pub sigs: Vec<u8>,
}

impl From<&InclusionEvidence> for TxArgs {
    fn from(evidence: &InclusionEvidence) -> Self {
        Self {
            tx_bytes: evidence.tx_bytes.clone(),
            proof: evidence.proof.clone(),
            sigs: evidence.sigs.clone(),
        }
    }
}

/// Arguments of the root-chain
/// `startExit(utxoPos, txBytes, proof, sigs, in1TxBytes, in1Proof, in1Sigs, in2TxBytes, in2Proof, in2Sigs)`
/// call. Absent inputs are passed as empty byte strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartExitCall {
    pub utxo_pos: u64,
    pub exit: TxArgs,
    pub inputs: [TxArgs; 2],
}

impl From<&ExitEvidence> for StartExitCall {
    fn from(evidence: &ExitEvidence) -> Self {
        let input = |slot: usize| {
            evidence.inputs[slot]
                .as_ref()
                .map(TxArgs::from)
                .unwrap_or_default()
        };
        Self {
            utxo_pos: evidence.utxo_pos.pack(),
            exit: TxArgs::from(&evidence.exit),
            inputs: [input(0), input(1)],
        }
    }
}

/// A transaction offered as proof that an exiting output was spent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeCandidate {
    /// Position of the spending transaction (output index ignored).
    pub tx_pos: UtxoPosition,
    pub tx: Transaction,
}

/// Arguments of the root-chain
/// `challengeExit(cUtxoPos, eUtxoPos, txBytes, proof, sigs)` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeEvidence {
    /// Position of the spending transaction.
    pub challenging_utxo_pos: UtxoPosition,
    /// Position being exited.
    pub exit_utxo_pos: UtxoPosition,
    pub tx_bytes: Vec<u8>,
    pub proof: Vec<u8>,
    pub sigs: Vec<u8>,
}

/// Outcome of checking an exit against the child chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitAssessment {
    /// The output exists, matches the claim and is unspent (or already
    /// withdrawn through this exit).
    Valid,
    /// The output was spent in a finalized block; the evidence proves it.
    Challengeable(ChallengeEvidence),
    /// The output was spent by a transaction still in the pending block.
    /// It becomes challengeable once that block is finalized.
    AwaitingBlock { spent_by: UtxoPosition },
    /// The claim does not describe a committed output.
    Rejected(ExitError),
}
