//! # Domain Layer
//!
//! Exit claims, evidence packages and validation errors.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
