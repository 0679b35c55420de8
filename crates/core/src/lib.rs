//! AssetLedger Core - Domain entities, services, and traits.
//!
//! This crate contains the core business logic for AssetLedger.
//! It is database-agnostic and defines traits that are implemented
//! by the `storage-sqlite` crate.

pub mod assets;
pub mod errors;
pub mod ledger;
pub mod metrics;
pub mod reconciliation;
pub mod valuation;

// Re-export common types from the asset and ledger modules
pub use assets::*;
pub use ledger::*;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
