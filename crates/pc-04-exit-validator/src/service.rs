//! # Child Chain Operator
//!
//! Application service that drives the ledger from root-chain events and
//! pushes blocks, exits and challenges back to the root chain.
//!
//! ## Architecture
//!
//! - Inbound: [`RootChainEvent`]s delivered by whatever follows the contract
//! - Ledger: any [`ChildChainApi`]
//! - Outbound: the [`RootChainGateway`] port
//!
//! ## Event Handling
//!
//! | Event | Assessment | Action |
//! |-------|------------|--------|
//! | `Deposit` | - | Create the deposit block |
//! | `ExitStarted` | Valid | Mark the UTXO exited |
//! | `ExitStarted` | Challengeable | `challengeExit` with the spending tx |
//! | `ExitStarted` | AwaitingBlock | Nothing yet; retry after the next block |
//! | `ExitStarted` | Rejected | Nothing; logged |

use pc_01_transaction_codec::{SigningKey, Transaction};
use pc_03_utxo_ledger::{
    Block, ChildChainApi, ChildChainError, DepositReceipt, ExitStarted, RootChainEvent,
};
use shared_types::{Address, UtxoPosition, U256};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::ValidatorConfig;
use crate::domain::{
    ChallengeCandidate, ChallengeEvidence, ExitAssessment, ExitClaim, ExitError, StartExitCall,
};
use crate::error::{OperatorError, Result};
use crate::ports::RootChainGateway;
use crate::validator::ExitValidator;

/// What handling a root-chain event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Deposited(DepositReceipt),
    Exited {
        utxo_pos: UtxoPosition,
    },
    Challenged(ChallengeEvidence),
    AwaitingBlock {
        utxo_pos: UtxoPosition,
        spent_by: UtxoPosition,
    },
    Rejected {
        utxo_pos: UtxoPosition,
        reason: ExitError,
    },
}

/// The block-producing authority.
pub struct ChildChainOperator<L: ChildChainApi, G: RootChainGateway> {
    ledger: Arc<L>,
    validator: ExitValidator<L>,
    gateway: G,
    key: SigningKey,
}

impl<L: ChildChainApi, G: RootChainGateway> ChildChainOperator<L, G> {
    /// `key` must be the ledger's configured authority, or every
    /// [`Self::commit_block`] fails with `UnauthorizedSigner`.
    pub fn new(ledger: Arc<L>, gateway: G, key: SigningKey, config: ValidatorConfig) -> Self {
        let validator = ExitValidator::new(Arc::clone(&ledger), config);
        Self {
            ledger,
            validator,
            gateway,
            key,
        }
    }

    pub fn ledger(&self) -> &Arc<L> {
        &self.ledger
    }

    pub fn validator(&self) -> &ExitValidator<L> {
        &self.validator
    }

    /// Send a deposit of `amount` to `owner` to the root chain.
    ///
    /// The ledger changes only when the resulting `Deposit` event comes back
    /// through [`Self::handle_event`].
    pub async fn request_deposit(&self, owner: Address, amount: U256) -> Result<Vec<u8>> {
        if amount.is_zero() {
            return Err(ChildChainError::ZeroDeposit.into());
        }

        let tx_bytes = Transaction::deposit(owner, amount).encode_unsigned();
        self.gateway.deposit(tx_bytes.clone(), amount).await?;
        debug!("[pc-04] Deposit of {} requested", amount);
        Ok(tx_bytes)
    }

    /// Finalize the pending block and publish its root.
    ///
    /// The block stays finalized locally when the root-chain call fails;
    /// use [`Self::publish_block`] to retry.
    pub async fn commit_block(&self) -> Result<Arc<Block>> {
        let block = self.ledger.submit_block(Some(&self.key))?;
        self.publish(&block).await?;
        Ok(block)
    }

    /// Resend the root of an already finalized block.
    pub async fn publish_block(&self, blknum: u64) -> Result<Arc<Block>> {
        let block = self
            .ledger
            .block(blknum)
            .ok_or(ExitError::BlockNotFinalized { blknum })?;
        self.publish(&block).await?;
        Ok(block)
    }

    /// Start an exit of an unspent output on the root chain.
    pub async fn start_exit(&self, position: UtxoPosition) -> Result<StartExitCall> {
        let call = self.start_exit_call(position)?;
        self.gateway.start_exit(call.clone()).await?;
        info!("[pc-04] Exit started for {}", position);
        Ok(call)
    }

    /// Build `startExit` arguments without sending them.
    pub fn start_exit_call(&self, position: UtxoPosition) -> Result<StartExitCall> {
        let entry = self
            .ledger
            .utxo(&position)
            .ok_or(ExitError::UtxoNotFound { position })?;
        if entry.spent {
            return Err(ChildChainError::UtxoAlreadySpent { position }.into());
        }

        let claim = ExitClaim {
            utxo_pos: position,
            owner: entry.owner,
            amount: entry.amount,
        };
        let evidence = self.validator.validate_exit(&claim)?;
        Ok(StartExitCall::from(&evidence))
    }

    /// Challenge the exit of `exit_pos` with a specific spending transaction.
    pub async fn challenge(
        &self,
        exit_pos: UtxoPosition,
        candidate: &ChallengeCandidate,
    ) -> Result<ChallengeEvidence> {
        let evidence = self.validator.verify_double_spend(exit_pos, candidate)?;
        self.gateway.challenge_exit(evidence.clone()).await?;
        info!(
            "[pc-04] Exit {} challenged with {}",
            exit_pos, evidence.challenging_utxo_pos
        );
        Ok(evidence)
    }

    /// Apply one root-chain event.
    pub async fn handle_event(&self, event: RootChainEvent) -> Result<EventOutcome> {
        match event {
            RootChainEvent::Deposit(deposit) => {
                let receipt = self.ledger.apply_deposit_event(&deposit)?;
                Ok(EventOutcome::Deposited(receipt))
            }
            RootChainEvent::ExitStarted(exit) => self.handle_exit(&exit).await,
        }
    }

    async fn handle_exit(&self, exit: &ExitStarted) -> Result<EventOutcome> {
        let claim = ExitClaim::from(exit);

        match self.validator.assess_exit(&claim) {
            ExitAssessment::Valid => match self.withdraw(exit) {
                // Spent between assessment and withdrawal
                Err(OperatorError::Ledger(ChildChainError::UtxoAlreadySpent { .. })) => {
                    debug!("[pc-04] Exit {} spent while assessing, reassessing", exit.utxo_pos);
                    let assessment = self.validator.assess_exit(&claim);
                    self.settle_exit(exit, assessment).await
                }
                outcome => outcome,
            },
            assessment => self.settle_exit(exit, assessment).await,
        }
    }

    async fn settle_exit(
        &self,
        exit: &ExitStarted,
        assessment: ExitAssessment,
    ) -> Result<EventOutcome> {
        let utxo_pos = exit.utxo_pos;

        match assessment {
            ExitAssessment::Valid => self.withdraw(exit),
            ExitAssessment::Challengeable(evidence) => {
                self.gateway.challenge_exit(evidence.clone()).await?;
                info!(
                    "[pc-04] Exit {} challenged with {}",
                    utxo_pos, evidence.challenging_utxo_pos
                );
                Ok(EventOutcome::Challenged(evidence))
            }
            ExitAssessment::AwaitingBlock { spent_by } => {
                info!(
                    "[pc-04] Exit {} spent by pending tx {}, challenge after next block",
                    utxo_pos, spent_by
                );
                Ok(EventOutcome::AwaitingBlock { utxo_pos, spent_by })
            }
            ExitAssessment::Rejected(reason) => Ok(EventOutcome::Rejected { utxo_pos, reason }),
        }
    }

    /// Mark an exited output withdrawn; replays are no-ops.
    fn withdraw(&self, exit: &ExitStarted) -> Result<EventOutcome> {
        let utxo_pos = exit.utxo_pos;
        let already_exited = self.ledger.utxo(&utxo_pos).is_some_and(|e| e.exited);
        if already_exited {
            debug!("[pc-04] Exit {} already applied", utxo_pos);
        } else {
            self.ledger.apply_exit(exit)?;
        }
        Ok(EventOutcome::Exited { utxo_pos })
    }

    async fn publish(&self, block: &Block) -> Result<()> {
        self.gateway
            .submit_block(block.root)
            .await
            .inspect_err(|err| {
                warn!(
                    "[pc-04] Publishing block {} failed: {}",
                    block.number, err
                )
            })?;
        info!(
            "[pc-04] Block {} published with root {}",
            block.number,
            hex::encode(block.root)
        );
        Ok(())
    }
}
