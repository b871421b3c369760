//! # Ports Layer
//!
//! - **Outbound** (`outbound`): [`RootChainGateway`]

pub mod outbound;

pub use outbound::*;
