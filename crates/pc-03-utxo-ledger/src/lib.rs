//! # UTXO Ledger (pc-03)
//!
//! The child-chain state machine. Applies root-chain deposits and signed
//! transfers, prevents double-spends, and finalizes pending blocks into
//! immutable, operator-signed, Merkle-committed blocks.
//!
//! ## Block Numbering
//!
//! ```text
//!  deposits        operator   deposits          operator
//!  1, 2, ... 999   1000       1001, ... 1999    2000 ...
//! ```
//!
//! Operator blocks are multiples of `child_block_interval`. Deposits since
//! the last submission fill the numbers just below the pending block; the
//! counter resets on every submission, matching the root-chain contract.
//!
//! ## Ledger Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | An output is spent at most once | `apply_transaction` checks and marks under the writer lock |
//! | Inputs equal outputs plus fee | checked U256 arithmetic before any mutation |
//! | Only the authority finalizes blocks | `submit_block` / `submit_signed_block` |
//! | Finalized blocks never change | stored behind `Arc`, never mutated |
//!
//! ## Hexagonal Architecture
//!
//! - **Domain Layer** (`domain/`): [`UtxoEntry`], [`Block`], [`DepositReceipt`]
//! - **Ports Layer** (`ports/`): [`LedgerReader`], [`ChildChainApi`], [`TimeSource`]
//! - **Service** (`service`): [`ChildChain`]

pub mod config;
pub mod domain;
pub mod error;
pub mod events;
pub mod ports;
pub mod service;

// Re-export public API
pub use config::ChildChainConfig;
pub use domain::{Block, BlockKind, DepositReceipt, UtxoEntry};
pub use error::{ChildChainError, ErrorKind, Result};
pub use events::{DepositCreated, ExitStarted, RootChainEvent};
pub use ports::{ChildChainApi, LedgerReader, ManualTimeSource, SystemTimeSource, TimeSource};
pub use service::ChildChain;
