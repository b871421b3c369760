//! # Ports Layer
//!
//! - **Inbound** (`inbound`): [`LedgerReader`], [`ChildChainApi`]
//! - **Outbound** (`outbound`): [`TimeSource`]

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
