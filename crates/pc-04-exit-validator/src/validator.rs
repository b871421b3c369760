//! # Exit Validator
//!
//! Decides, from ledger-visible facts only, whether an exit is valid or
//! double-spent, and assembles the evidence the root chain needs.
//!
//! The validator never mutates the ledger. The root chain owns the
//! authoritative removal of a challenged exit.

use lru::LruCache;
use parking_lot::Mutex;
use pc_01_transaction_codec::Transaction;
use pc_02_fixed_merkle::FixedMerkleTree;
use pc_03_utxo_ledger::{Block, LedgerReader};
use shared_types::UtxoPosition;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::ValidatorConfig;
use crate::domain::{
    ChallengeCandidate, ChallengeEvidence, ExitAssessment, ExitClaim, ExitError, ExitEvidence,
    InclusionEvidence,
};

/// Exit and challenge validation against a ledger.
///
/// Rebuilt block trees are kept in an LRU cache keyed by block number;
/// finalized blocks never change, so cached trees never go stale.
pub struct ExitValidator<L: LedgerReader> {
    ledger: Arc<L>,
    trees: Mutex<LruCache<u64, Arc<FixedMerkleTree>>>,
}

impl<L: LedgerReader> ExitValidator<L> {
    pub fn new(ledger: Arc<L>, config: ValidatorConfig) -> Self {
        Self {
            ledger,
            trees: Mutex::new(LruCache::new(config.cache_capacity())),
        }
    }

    pub fn ledger(&self) -> &Arc<L> {
        &self.ledger
    }

    /// Number of block trees currently cached.
    pub fn cached_tree_count(&self) -> usize {
        self.trees.lock().len()
    }

    /// Check an exit claim and build its `startExit` evidence.
    ///
    /// The claimed owner and amount must match both the committed output
    /// and the ledger entry created for it. Spent status is not checked
    /// here; see [`Self::assess_exit`].
    pub fn validate_exit(&self, claim: &ExitClaim) -> Result<ExitEvidence, ExitError> {
        let position = claim.utxo_pos;
        let (exit, tx) = self.inclusion(position)?;

        let output = tx
            .output(position.oindex())
            .ok_or(ExitError::OutputNotFound { position })?;
        if output.owner != claim.owner || output.amount != claim.amount {
            return Err(ExitError::ClaimMismatch { position });
        }

        let entry = self
            .ledger
            .utxo(&position)
            .ok_or(ExitError::UtxoNotFound { position })?;
        if entry.owner != claim.owner || entry.amount != claim.amount {
            return Err(ExitError::ClaimMismatch { position });
        }

        let mut inputs = [None, None];
        for (slot, input) in tx.present_inputs() {
            let (evidence, _) = self.inclusion(input)?;
            inputs[slot.index()] = Some(evidence);
        }

        debug!("[pc-04] Exit evidence built for {}", position);

        Ok(ExitEvidence {
            utxo_pos: position,
            exit,
            inputs,
        })
    }

    /// Check that `candidate` is committed and spends `exit_pos`.
    pub fn verify_double_spend(
        &self,
        exit_pos: UtxoPosition,
        candidate: &ChallengeCandidate,
    ) -> Result<ChallengeEvidence, ExitError> {
        let tx_pos = candidate.tx_pos.tx_position();
        let block = self.finalized_block(tx_pos.blknum())?;
        let tree = self.tree_for(&block)?;

        let proof = tree
            .proof_at(tx_pos.txindex() as usize)
            .map_err(|_| ExitError::NotIncluded { position: tx_pos })?;
        if !proof.verify(&candidate.tx.merkle_hash(), &block.root) {
            return Err(ExitError::NotIncluded { position: tx_pos });
        }

        let spends_exit = candidate
            .tx
            .present_inputs()
            .any(|(_, input)| input == exit_pos);
        if !spends_exit {
            return Err(ExitError::NotADoubleSpend {
                exit: exit_pos,
                challenging: tx_pos,
            });
        }

        Ok(ChallengeEvidence {
            challenging_utxo_pos: tx_pos,
            exit_utxo_pos: exit_pos,
            tx_bytes: candidate.tx.encode_unsigned(),
            proof: proof.to_bytes(),
            sigs: candidate.tx.joined_signatures(),
        })
    }

    /// Look up the ledger's record of who spent `exit_pos` and build the
    /// challenge from it.
    pub fn find_double_spend(&self, exit_pos: UtxoPosition) -> Result<ChallengeEvidence, ExitError> {
        let entry = self
            .ledger
            .utxo(&exit_pos)
            .ok_or(ExitError::UtxoNotFound { position: exit_pos })?;
        let spent_by = entry
            .spent_by
            .ok_or(ExitError::NotSpent { position: exit_pos })?;

        let block = self.finalized_block(spent_by.blknum())?;
        let tx = block
            .transaction(spent_by.txindex())
            .cloned()
            .ok_or(ExitError::TransactionNotFound { position: spent_by })?;

        self.verify_double_spend(exit_pos, &ChallengeCandidate {
            tx_pos: spent_by,
            tx,
        })
    }

    /// Classify an exit recorded on the root chain.
    pub fn assess_exit(&self, claim: &ExitClaim) -> ExitAssessment {
        if let Err(err) = self.validate_exit(claim) {
            warn!("[pc-04] Exit {} rejected: {}", claim.utxo_pos, err);
            return ExitAssessment::Rejected(err);
        }

        let spent_by = self.ledger.utxo(&claim.utxo_pos).and_then(|e| e.spent_by);
        let Some(spent_by) = spent_by else {
            return ExitAssessment::Valid;
        };

        match self.find_double_spend(claim.utxo_pos) {
            Ok(evidence) => {
                warn!(
                    "[pc-04] Exit {} is a double spend (spent at {})",
                    claim.utxo_pos, spent_by
                );
                ExitAssessment::Challengeable(evidence)
            }
            Err(ExitError::BlockNotFinalized { .. }) => ExitAssessment::AwaitingBlock { spent_by },
            Err(err) => ExitAssessment::Rejected(err),
        }
    }

    fn finalized_block(&self, blknum: u64) -> Result<Arc<Block>, ExitError> {
        self.ledger
            .block(blknum)
            .ok_or(ExitError::BlockNotFinalized { blknum })
    }

    /// Inclusion evidence for the transaction at `position` (output index
    /// ignored), with the transaction itself.
    fn inclusion(
        &self,
        position: UtxoPosition,
    ) -> Result<(InclusionEvidence, Transaction), ExitError> {
        let tx_pos = position.tx_position();
        let block = self.finalized_block(tx_pos.blknum())?;
        let tx = block
            .transaction(tx_pos.txindex())
            .cloned()
            .ok_or(ExitError::TransactionNotFound { position: tx_pos })?;

        let tree = self.tree_for(&block)?;
        let proof = tree
            .proof_at(tx_pos.txindex() as usize)
            .map_err(|_| ExitError::NotIncluded { position: tx_pos })?;
        if !proof.verify(&tx.merkle_hash(), &block.root) {
            return Err(ExitError::NotIncluded { position: tx_pos });
        }

        let evidence = InclusionEvidence {
            tx_pos,
            tx_bytes: tx.encode_unsigned(),
            proof: proof.to_bytes(),
            sigs: tx.joined_signatures(),
        };
        Ok((evidence, tx))
    }

    fn tree_for(&self, block: &Block) -> Result<Arc<FixedMerkleTree>, ExitError> {
        if let Some(tree) = self.trees.lock().get(&block.number) {
            return Ok(Arc::clone(tree));
        }

        let tree = block.merkle_tree(self.ledger.merkle_depth())?;
        if tree.root() != block.root {
            warn!(
                "[pc-04] Block {} root {} does not match its transactions",
                block.number,
                hex::encode(&block.root[..8])
            );
            return Err(ExitError::CommitmentMismatch {
                blknum: block.number,
            });
        }

        let tree = Arc::new(tree);
        self.trees.lock().put(block.number, Arc::clone(&tree));
        Ok(tree)
    }
}
