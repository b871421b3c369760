//! # Domain Layer
//!
//! Ledger records and finalized blocks.

pub mod entities;

pub use entities::*;
