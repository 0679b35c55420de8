//! Reconciliation module - the coordinated ledger write path.

mod reconciliation_model;
mod reconciliation_service;
mod reconciliation_traits;

#[cfg(test)]
mod reconciliation_service_tests;

pub use reconciliation_model::{ReconcileReceipt, ReconcileState};
pub use reconciliation_service::ReconciliationService;
pub use reconciliation_traits::ReconciliationServiceTrait;
