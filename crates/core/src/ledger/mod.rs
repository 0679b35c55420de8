//! Ledger module - entry models, ordering, idempotency, and traits.

mod idempotency;
mod ledger_model;
mod ledger_traits;


pub use idempotency::revaluation_idempotency_key;
pub use ledger_model::{
    last_entry, LedgerEntry, LedgerEntryUpdate, NewLedgerEntry, ProjectionUpdate, TransactionType,
};
pub use ledger_traits::LedgerRepositoryTrait;
