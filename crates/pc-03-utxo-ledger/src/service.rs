//! # Child-Chain Ledger Service
//!
//! The single-writer state machine behind the child chain: applies deposits
//! and transfers, tracks spent outputs and finalizes operator blocks.
//!
//! ## Locking
//!
//! | Lock | Guards | Taken by |
//! |------|--------|----------|
//! | `writer` (Mutex) | block counters, pending block | every mutation |
//! | `utxos` (RwLock) | ledger entries | mutations (write), queries (read) |
//! | `blocks` (RwLock) | finalized blocks | finalization (write), queries (read) |
//!
//! Locks are always taken in the order `writer → utxos → blocks`. Holding
//! `writer` for the whole of a mutation makes "check unspent, then mark
//! spent" a single critical section and makes finalization atomic with
//! respect to concurrent transfers.

use parking_lot::{Mutex, RwLock};
use pc_01_transaction_codec::{
    address_from_signing_key, recover_address, sign_hash, Signature, SigningKey, Slot,
    Transaction, NULL_SIGNATURE,
};
use pc_02_fixed_merkle::FixedMerkleTree;
use shared_types::{address_to_hex, Address, Hash, UtxoPosition, U256};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::ChildChainConfig;
use crate::domain::{Block, BlockKind, DepositReceipt, UtxoEntry};
use crate::error::{ChildChainError, Result};
use crate::events::{DepositCreated, ExitStarted};
use crate::ports::inbound::{ChildChainApi, LedgerReader};
use crate::ports::outbound::{SystemTimeSource, TimeSource};

/// State owned by the single writer.
struct WriterState {
    /// Offset of the next deposit below the pending block number.
    next_deposit_offset: u64,
    /// Transactions of the pending block, in inclusion order.
    pending: Vec<Transaction>,
}

/// The child-chain ledger.
///
/// ## Thread Safety
///
/// Shareable across threads via `Arc`. Mutations serialize on an internal
/// mutex; queries against finalized blocks and ledger entries only take
/// read locks.
pub struct ChildChain {
    config: ChildChainConfig,
    time: Arc<dyn TimeSource>,
    writer: Mutex<WriterState>,
    /// Number the pending block will be finalized under. Only changed while
    /// `writer` is held, after the finalized block is visible in `blocks`.
    current_block: AtomicU64,
    utxos: RwLock<HashMap<UtxoPosition, UtxoEntry>>,
    blocks: RwLock<BTreeMap<u64, Arc<Block>>>,
}

impl ChildChain {
    /// Create an empty ledger using the system clock.
    pub fn new(config: ChildChainConfig) -> Result<Self> {
        Self::with_time_source(config, Arc::new(SystemTimeSource))
    }

    pub fn with_time_source(config: ChildChainConfig, time: Arc<dyn TimeSource>) -> Result<Self> {
        config.validate()?;

        info!("[pc-03] Initializing child chain");
        info!("  Authority: {}", address_to_hex(&config.authority));
        info!("  Child block interval: {}", config.child_block_interval);
        info!("  Merkle depth: {}", config.merkle_depth);

        Ok(Self {
            writer: Mutex::new(WriterState {
                next_deposit_offset: 1,
                pending: Vec::new(),
            }),
            current_block: AtomicU64::new(config.child_block_interval),
            utxos: RwLock::new(HashMap::new()),
            blocks: RwLock::new(BTreeMap::new()),
            config,
            time,
        })
    }

    pub fn config(&self) -> &ChildChainConfig {
        &self.config
    }

    /// Block number the next deposit will receive.
    pub fn next_deposit_block_number(&self) -> u64 {
        let state = self.writer.lock();
        self.deposit_block_number(&state)
    }

    /// Snapshot of the pending block.
    pub fn pending_transactions(&self) -> Vec<Transaction> {
        self.writer.lock().pending.clone()
    }

    /// Unspent outputs owned by `owner`, in chain order.
    pub fn utxos_owned_by(&self, owner: &Address) -> Vec<(UtxoPosition, UtxoEntry)> {
        let utxos = self.utxos.read();
        let mut owned: Vec<_> = utxos
            .iter()
            .filter(|(_, entry)| entry.owner == *owner && !entry.spent)
            .map(|(position, entry)| (*position, *entry))
            .collect();
        owned.sort_by_key(|(position, _)| *position);
        owned
    }

    /// Number of finalized blocks, deposit blocks included.
    pub fn block_count(&self) -> usize {
        self.blocks.read().len()
    }

    fn deposit_block_number(&self, state: &WriterState) -> u64 {
        self.current_block.load(Ordering::Acquire) - self.config.child_block_interval
            + state.next_deposit_offset
    }

    fn pending_root(&self, state: &WriterState) -> Result<Hash> {
        let leaves = state.pending.iter().map(Transaction::merkle_hash).collect();
        let tree = FixedMerkleTree::with_config(self.config.merkle_config(), leaves)?;
        Ok(tree.root())
    }

    // =========================================================================
    // Deposits
    // =========================================================================

    fn deposit_locked(
        &self,
        state: &mut WriterState,
        owner: Address,
        amount: U256,
        announced: Option<u64>,
    ) -> Result<DepositReceipt> {
        if amount.is_zero() {
            return Err(ChildChainError::ZeroDeposit);
        }

        if state.next_deposit_offset >= self.config.child_block_interval {
            return Err(ChildChainError::DepositCapacityExhausted {
                pending_block: self.current_block.load(Ordering::Acquire),
            });
        }

        let blknum = self.deposit_block_number(state);
        if let Some(actual) = announced {
            if actual != blknum {
                return Err(ChildChainError::DepositBlockMismatch {
                    expected: blknum,
                    actual,
                });
            }
        }

        let position = UtxoPosition::new(blknum, 0, 0)?;
        let tx = Transaction::deposit(owner, amount);
        let tx_hash = tx.hash();
        let tree = FixedMerkleTree::with_config(self.config.merkle_config(), vec![tx.merkle_hash()])?;
        let root = tree.root();

        let block = Block {
            number: blknum,
            kind: BlockKind::Deposit,
            transactions: vec![tx],
            root,
            timestamp: self.time.now(),
            signature: NULL_SIGNATURE,
        };

        // Block first, so a visible deposit output always has its block
        self.blocks.write().insert(blknum, Arc::new(block));
        self.utxos
            .write()
            .insert(position, UtxoEntry::unspent(owner, amount));
        state.next_deposit_offset += 1;

        info!(
            "[pc-03] Deposit block {} created: {} to {}",
            blknum,
            amount,
            address_to_hex(&owner)
        );

        Ok(DepositReceipt {
            blknum,
            position,
            tx_hash,
            root,
        })
    }

    // =========================================================================
    // Transfers
    // =========================================================================

    fn transaction_locked(&self, state: &mut WriterState, tx: Transaction) -> Result<UtxoPosition> {
        let inputs: Vec<(Slot, UtxoPosition)> = tx.present_inputs().collect();
        if inputs.is_empty() {
            return Err(ChildChainError::NoInputs);
        }
        if let [(_, first), (_, second)] = inputs.as_slice() {
            if first == second {
                return Err(ChildChainError::DuplicateInput { position: *first });
            }
        }

        let capacity = self.config.merkle_config().capacity();
        if state.pending.len() >= capacity {
            return Err(ChildChainError::BlockFull { capacity });
        }

        let mut utxos = self.utxos.write();

        let mut owners = [None, None];
        let mut entries = Vec::with_capacity(inputs.len());
        for (slot, position) in &inputs {
            let entry = utxos
                .get(position)
                .copied()
                .ok_or(ChildChainError::UtxoNotFound {
                    position: *position,
                })?;
            owners[slot.index()] = Some(entry.owner);
            entries.push((*position, entry));
        }

        tx.validate_signatures(owners)?;

        let mut input_total = U256::zero();
        for (position, entry) in &entries {
            if entry.spent {
                return Err(ChildChainError::UtxoAlreadySpent {
                    position: *position,
                });
            }
            input_total = input_total
                .checked_add(entry.amount)
                .ok_or(ChildChainError::AmountOverflow)?;
        }

        let spend = tx.total_spend().ok_or(ChildChainError::AmountOverflow)?;
        if input_total != spend {
            return Err(ChildChainError::BalanceMismatch {
                inputs: input_total,
                outputs: spend,
            });
        }

        let txindex =
            u32::try_from(state.pending.len()).map_err(|_| ChildChainError::BlockFull { capacity })?;
        let tx_position =
            UtxoPosition::new(self.current_block.load(Ordering::Acquire), txindex, 0)?;
        let mut created = Vec::with_capacity(tx.outputs.len());
        for (oindex, output) in (0u16..).zip(tx.outputs.iter()) {
            if !output.is_empty() {
                created.push((tx_position.with_output(oindex)?, *output));
            }
        }

        // Validation complete; nothing below can fail
        for (position, _) in &entries {
            if let Some(entry) = utxos.get_mut(position) {
                entry.spent = true;
                entry.spent_by = Some(tx_position);
            }
        }
        for (position, output) in created {
            utxos.insert(position, UtxoEntry::unspent(output.owner, output.amount));
        }

        debug!(
            "[pc-03] Applied tx {} at {} ({} inputs)",
            hex::encode(&tx.hash()[..8]),
            tx_position,
            entries.len()
        );
        state.pending.push(tx);

        Ok(tx_position)
    }

    // =========================================================================
    // Finalization
    // =========================================================================

    fn finalize_locked(
        &self,
        state: &mut WriterState,
        root: Hash,
        signature: Signature,
    ) -> Result<Arc<Block>> {
        let number = self.current_block.load(Ordering::Acquire);
        let next = number
            .checked_add(self.config.child_block_interval)
            .ok_or(ChildChainError::BlockNumberOverflow)?;

        let block = Arc::new(Block {
            number,
            kind: BlockKind::Operator,
            transactions: std::mem::take(&mut state.pending),
            root,
            timestamp: self.time.now(),
            signature,
        });

        self.blocks.write().insert(number, Arc::clone(&block));
        self.current_block.store(next, Ordering::Release);
        state.next_deposit_offset = 1;

        info!(
            "[pc-03] Block {} finalized: {} transactions, root {}",
            number,
            block.transactions.len(),
            hex::encode(&root[..8])
        );

        Ok(block)
    }

    /// `root` must commit to the pending block and be signed by the authority.
    fn check_signed_root(&self, state: &WriterState, root: &Hash, signature: &Signature) -> Result<()> {
        let expected = self.pending_root(state)?;
        if *root != expected {
            return Err(ChildChainError::RootMismatch {
                expected,
                actual: *root,
            });
        }
        let signer =
            recover_address(root, signature).map_err(ChildChainError::InvalidBlockSignature)?;
        self.check_authority(signer)
    }

    fn check_authority(&self, signer: Address) -> Result<()> {
        if signer != self.config.authority {
            return Err(ChildChainError::UnauthorizedSigner {
                expected: self.config.authority,
                actual: signer,
            });
        }
        Ok(())
    }
}

impl LedgerReader for ChildChain {
    fn utxo(&self, position: &UtxoPosition) -> Option<UtxoEntry> {
        self.utxos.read().get(position).copied()
    }

    fn block(&self, blknum: u64) -> Option<Arc<Block>> {
        self.blocks.read().get(&blknum).cloned()
    }

    fn transaction(&self, blknum: u64, txindex: u32) -> Option<Transaction> {
        if let Some(block) = self.block(blknum) {
            return block.transaction(txindex).cloned();
        }

        // The pending block may have been finalized since the lookup above
        let state = self.writer.lock();
        if blknum == self.current_block.load(Ordering::Acquire) {
            return state.pending.get(txindex as usize).cloned();
        }
        self.block(blknum)
            .and_then(|block| block.transaction(txindex).cloned())
    }

    fn current_block_number(&self) -> u64 {
        self.current_block.load(Ordering::Acquire)
    }

    fn merkle_depth(&self) -> usize {
        self.config.merkle_depth
    }
}

impl ChildChainApi for ChildChain {
    fn apply_deposit(&self, owner: Address, amount: U256) -> Result<DepositReceipt> {
        let mut state = self.writer.lock();
        self.deposit_locked(&mut state, owner, amount, None)
            .inspect_err(|err| warn!("[pc-03] Deposit rejected: {}", err))
    }

    fn apply_deposit_event(&self, event: &DepositCreated) -> Result<DepositReceipt> {
        let mut state = self.writer.lock();
        self.deposit_locked(&mut state, event.depositor, event.amount, Some(event.blknum))
            .inspect_err(|err| warn!("[pc-03] Deposit event rejected: {}", err))
    }

    fn apply_transaction(&self, tx: Transaction) -> Result<UtxoPosition> {
        let mut state = self.writer.lock();
        self.transaction_locked(&mut state, tx)
            .inspect_err(|err| warn!("[pc-03] Transaction rejected: {}", err))
    }

    fn submit_block(&self, key: Option<&SigningKey>) -> Result<Arc<Block>> {
        let Some(key) = key else {
            warn!("[pc-03] Block submission without signing key");
            return Err(ChildChainError::MissingSigningKey);
        };

        self.check_authority(address_from_signing_key(key))
            .inspect_err(|err| warn!("[pc-03] Block submission rejected: {}", err))?;

        let mut state = self.writer.lock();
        let root = self.pending_root(&state)?;
        let signature = sign_hash(&root, key).map_err(ChildChainError::InvalidBlockSignature)?;
        self.finalize_locked(&mut state, root, signature)
    }

    fn submit_signed_block(&self, root: Hash, signature: Signature) -> Result<Arc<Block>> {
        let mut state = self.writer.lock();
        self.check_signed_root(&state, &root, &signature)
            .inspect_err(|err| warn!("[pc-03] Signed block rejected: {}", err))?;
        self.finalize_locked(&mut state, root, signature)
    }

    fn apply_exit(&self, event: &ExitStarted) -> Result<()> {
        let _state = self.writer.lock();
        let mut utxos = self.utxos.write();
        let position = event.utxo_pos;

        let entry = utxos
            .get_mut(&position)
            .ok_or(ChildChainError::UtxoNotFound { position })?;

        if entry.owner != event.exitor || entry.amount != event.amount {
            warn!("[pc-03] Exit event does not match UTXO {}", position);
            return Err(ChildChainError::ExitMismatch { position });
        }
        if entry.spent {
            warn!("[pc-03] Exit of already spent UTXO {}", position);
            return Err(ChildChainError::UtxoAlreadySpent { position });
        }

        entry.spent = true;
        entry.exited = true;
        info!("[pc-03] UTXO {} exited to root chain", position);
        Ok(())
    }
}
