//! # Shared Test Fixtures
//!
//! Accounts, a ready-to-use child chain, and an in-memory root-chain
//! contract that checks proofs the same way the deployed contract does.

use async_trait::async_trait;
use parking_lot::Mutex;
use pc_01_transaction_codec::{
    address_from_signing_key, keccak256, SigningKey, Slot, Transaction,
};
use pc_02_fixed_merkle::{empty_root, FixedMerkleTree, MerkleProof, DEFAULT_DEPTH};
use pc_03_utxo_ledger::{
    Block, ChildChain, ChildChainApi, ChildChainConfig, DepositCreated, ExitStarted,
    RootChainEvent,
};
use pc_04_exit_validator::{
    ChallengeEvidence, GatewayError, RootChainGateway, StartExitCall, TxArgs,
};
use shared_types::{Address, Hash, UtxoPosition, U256};
use std::collections::BTreeMap;
use std::sync::{Arc, Once};
use tokio::sync::mpsc;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static TRACING: Once = Once::new();

/// Install a test-friendly subscriber once per process.
///
/// Honours `RUST_LOG`; defaults to `warn`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_test_writer())
            .try_init();
    });
}

// =============================================================================
// ACCOUNTS AND LEDGER
// =============================================================================

/// A key pair with its child-chain address.
pub struct Account {
    pub key: SigningKey,
    pub address: Address,
}

impl Account {
    pub fn random() -> Self {
        let key = SigningKey::random(&mut rand::thread_rng());
        let address = address_from_signing_key(&key);
        Self { key, address }
    }
}

/// A fresh ledger with its authority key.
pub struct TestChain {
    pub chain: Arc<ChildChain>,
    pub authority: Account,
}

impl TestChain {
    pub fn new() -> Self {
        Self::with_config(|config| config)
    }

    pub fn with_config(customize: impl FnOnce(ChildChainConfig) -> ChildChainConfig) -> Self {
        init_tracing();
        let authority = Account::random();
        let config = customize(ChildChainConfig::with_authority(authority.address));
        let chain = Arc::new(ChildChain::new(config).expect("valid test config"));
        Self { chain, authority }
    }

    pub fn deposit(&self, owner: Address, amount: u64) -> UtxoPosition {
        self.chain
            .apply_deposit(owner, U256::from(amount))
            .expect("deposit")
            .position
    }

    pub fn submit(&self) -> Arc<Block> {
        self.chain
            .submit_block(Some(&self.authority.key))
            .expect("authority submission")
    }
}

impl Default for TestChain {
    fn default() -> Self {
        Self::new()
    }
}

/// Single-input transfer of `amount` signed by `from`.
pub fn signed_transfer(
    input: UtxoPosition,
    to: Address,
    amount: u64,
    from: &SigningKey,
) -> Transaction {
    let mut tx = Transaction::transfer(input, to, amount);
    tx.sign(Slot::First, from).expect("signing");
    tx
}

// =============================================================================
// SIMULATED ROOT CHAIN
// =============================================================================

/// A call received by [`SimulatedRootChain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootChainCall {
    Deposit { tx_bytes: Vec<u8>, value: U256 },
    SubmitBlock(Hash),
    StartExit(StartExitCall),
    ChallengeExit(ChallengeEvidence),
}

/// An exit recorded by the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedExit {
    pub owner: Address,
    pub amount: U256,
}

struct ContractState {
    current_child_block: u64,
    current_deposit_block: u64,
    roots: BTreeMap<u64, Hash>,
    exits: BTreeMap<u64, RecordedExit>,
    calls: Vec<RootChainCall>,
}

struct Contract {
    interval: u64,
    state: Mutex<ContractState>,
    events: mpsc::UnboundedSender<RootChainEvent>,
}

/// In-memory root-chain contract.
///
/// Deposits and exits are checked as the contract checks them and emit
/// the matching events on the channel returned by [`Self::new`].
#[derive(Clone)]
pub struct SimulatedRootChain {
    inner: Arc<Contract>,
}

impl SimulatedRootChain {
    pub fn new(interval: u64) -> (Self, mpsc::UnboundedReceiver<RootChainEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let inner = Arc::new(Contract {
            interval,
            state: Mutex::new(ContractState {
                current_child_block: interval,
                current_deposit_block: 1,
                roots: BTreeMap::new(),
                exits: BTreeMap::new(),
                calls: Vec::new(),
            }),
            events,
        });
        (Self { inner }, receiver)
    }

    pub fn calls(&self) -> Vec<RootChainCall> {
        self.inner.state.lock().calls.clone()
    }

    pub fn exit(&self, utxo_pos: UtxoPosition) -> Option<RecordedExit> {
        self.inner.state.lock().exits.get(&utxo_pos.pack()).copied()
    }

    pub fn root(&self, blknum: u64) -> Option<Hash> {
        self.inner.state.lock().roots.get(&blknum).copied()
    }

    pub fn current_child_block(&self) -> u64 {
        self.inner.state.lock().current_child_block
    }

    /// Record an exit directly, as if an owner called `startExit` without
    /// going through the operator.
    pub fn record_exit(&self, utxo_pos: UtxoPosition, owner: Address, amount: U256) {
        self.inner
            .state
            .lock()
            .exits
            .insert(utxo_pos.pack(), RecordedExit { owner, amount });
        self.emit(ExitStarted {
            exitor: owner,
            utxo_pos,
            amount,
        });
    }

    fn emit(&self, event: impl Into<RootChainEvent>) {
        // Nobody listening is fine for tests that only inspect calls.
        let _ = self.inner.events.send(event.into());
    }

    fn check_inclusion(
        state: &ContractState,
        tx_pos: UtxoPosition,
        args: &TxArgs,
    ) -> Result<Transaction, GatewayError> {
        let root = state
            .roots
            .get(&tx_pos.blknum())
            .ok_or_else(|| rejected(format!("unknown block {}", tx_pos.blknum())))?;
        let tx = Transaction::decode(&args.tx_bytes).map_err(|e| rejected(e.to_string()))?;

        let mut leaf_data = keccak256(&args.tx_bytes).to_vec();
        leaf_data.extend_from_slice(&args.sigs);
        let leaf = keccak256(&leaf_data);

        let proof = MerkleProof::from_bytes(tx_pos.txindex() as usize, &args.proof)
            .map_err(|e| rejected(e.to_string()))?;
        if !proof.verify(&leaf, root) {
            return Err(rejected(format!("invalid proof for {}", tx_pos)));
        }
        Ok(tx)
    }
}

fn rejected(reason: impl Into<String>) -> GatewayError {
    let reason = reason.into();
    debug!("[root-chain] Call reverted: {}", reason);
    GatewayError::Rejected { reason }
}

#[async_trait]
impl RootChainGateway for SimulatedRootChain {
    async fn deposit(&self, tx_bytes: Vec<u8>, value: U256) -> Result<(), GatewayError> {
        let tx = Transaction::decode(&tx_bytes).map_err(|e| rejected(e.to_string()))?;
        let output = tx.outputs[0];
        if !tx.is_deposit() || output.amount != value {
            return Err(rejected("deposit value mismatch"));
        }

        let blknum = {
            let mut state = self.inner.state.lock();
            state.calls.push(RootChainCall::Deposit {
                tx_bytes: tx_bytes.clone(),
                value,
            });
            let blknum =
                state.current_child_block - self.inner.interval + state.current_deposit_block;
            state.current_deposit_block += 1;

            let root = FixedMerkleTree::new(DEFAULT_DEPTH, vec![tx.merkle_hash()])
                .map_err(|e| rejected(e.to_string()))?
                .root();
            state.roots.insert(blknum, root);
            blknum
        };

        self.emit(DepositCreated {
            depositor: output.owner,
            blknum,
            amount: value,
        });
        Ok(())
    }

    async fn submit_block(&self, root: Hash) -> Result<(), GatewayError> {
        let mut state = self.inner.state.lock();
        state.calls.push(RootChainCall::SubmitBlock(root));
        let blknum = state.current_child_block;
        state.roots.insert(blknum, root);
        state.current_child_block += self.inner.interval;
        state.current_deposit_block = 1;
        Ok(())
    }

    async fn start_exit(&self, call: StartExitCall) -> Result<(), GatewayError> {
        let utxo_pos =
            UtxoPosition::unpack(call.utxo_pos).map_err(|e| rejected(e.to_string()))?;
        let recorded = {
            let mut state = self.inner.state.lock();
            state.calls.push(RootChainCall::StartExit(call.clone()));

            let tx = Self::check_inclusion(&state, utxo_pos.tx_position(), &call.exit)?;
            for (slot, input) in tx.present_inputs() {
                Self::check_inclusion(&state, input.tx_position(), &call.inputs[slot.index()])?;
            }

            let output = tx
                .output(utxo_pos.oindex())
                .ok_or_else(|| rejected("no such output"))?;
            let recorded = RecordedExit {
                owner: output.owner,
                amount: output.amount,
            };
            state.exits.insert(call.utxo_pos, recorded);
            recorded
        };

        self.emit(ExitStarted {
            exitor: recorded.owner,
            utxo_pos,
            amount: recorded.amount,
        });
        Ok(())
    }

    async fn challenge_exit(&self, evidence: ChallengeEvidence) -> Result<(), GatewayError> {
        let mut state = self.inner.state.lock();
        state
            .calls
            .push(RootChainCall::ChallengeExit(evidence.clone()));

        let args = TxArgs {
            tx_bytes: evidence.tx_bytes.clone(),
            proof: evidence.proof.clone(),
            sigs: evidence.sigs.clone(),
        };
        let tx = Self::check_inclusion(&state, evidence.challenging_utxo_pos, &args)?;
        if !tx
            .present_inputs()
            .any(|(_, input)| input == evidence.exit_utxo_pos)
        {
            return Err(rejected("challenge does not spend the exit"));
        }

        state.exits.remove(&evidence.exit_utxo_pos.pack());
        Ok(())
    }
}

/// Root of a block with no transactions at the default depth.
pub fn empty_block_root() -> Hash {
    empty_root(DEFAULT_DEPTH).expect("default depth is valid")
}
