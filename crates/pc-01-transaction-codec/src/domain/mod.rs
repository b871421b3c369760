//! # Domain Layer
//!
//! Pure transaction encoding and signature logic with no I/O dependencies.

pub mod ecdsa;
pub mod entities;
pub mod errors;
pub mod encoding;
