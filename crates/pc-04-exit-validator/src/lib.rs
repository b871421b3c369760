//! # Exit Validator (pc-04)
//!
//! Checks exits against the child chain, builds the inclusion evidence the
//! root chain demands, and detects double-spent exits so they can be
//! challenged.
//!
//! ## Exit Game
//!
//! ```text
//!  owner ──startExit(utxoPos, tx, proof, sigs, inputs...)──▶ root chain
//!                                                              │
//!                                   ExitStarted event ◀────────┘
//!                                          │
//!                         assess_exit ─────┼──▶ Valid          → mark exited
//!                                          ├──▶ Challengeable  → challengeExit
//!                                          ├──▶ AwaitingBlock  → retry later
//!                                          └──▶ Rejected       → ignore
//! ```
//!
//! A challenge is sound only when the spending transaction is committed in
//! a finalized block and names the exiting output as one of its inputs.
//!
//! ## Hexagonal Architecture
//!
//! - **Domain Layer** (`domain/`): [`ExitClaim`], [`ExitEvidence`], [`ChallengeEvidence`]
//! - **Ports Layer** (`ports/`): [`RootChainGateway`]
//! - **Validator** (`validator`): [`ExitValidator`]
//! - **Service** (`service`): [`ChildChainOperator`]

pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;
pub mod validator;

// Re-export public API
pub use config::ValidatorConfig;
pub use domain::{
    ChallengeCandidate, ChallengeEvidence, ExitAssessment, ExitClaim, ExitError, ExitEvidence,
    InclusionEvidence, StartExitCall, TxArgs,
};
pub use error::{OperatorError, Result};
pub use ports::{GatewayError, RootChainGateway};
pub use service::{ChildChainOperator, EventOutcome};
pub use validator::ExitValidator;
