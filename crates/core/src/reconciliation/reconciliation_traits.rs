use async_trait::async_trait;
use chrono::NaiveDate;

use super::reconciliation_model::ReconcileReceipt;
use crate::ledger::{LedgerEntryUpdate, NewLedgerEntry};
use crate::Result;

/// Trait defining the contract for the reconciliation coordinator.
///
/// This is the only write path to an asset's derived valuation state. Every
/// operation applies its ledger write and the projection write atomically;
/// a `StaleProjection` failure is returned to the caller for retry, never
/// retried silently.
#[async_trait]
pub trait ReconciliationServiceTrait: Send + Sync {
    async fn record_transaction(
        &self,
        owner_id: &str,
        entry: NewLedgerEntry,
    ) -> Result<ReconcileReceipt>;

    async fn edit_transaction(
        &self,
        owner_id: &str,
        update: LedgerEntryUpdate,
    ) -> Result<ReconcileReceipt>;

    async fn delete_transaction(&self, owner_id: &str, entry_id: &str)
        -> Result<ReconcileReceipt>;

    /// Applies a policy-driven re-valuation for a scheduled asset.
    /// Idempotent for a given `(asset_id, as_of)` pair.
    async fn run_scheduled_revaluation(
        &self,
        owner_id: &str,
        asset_id: &str,
        as_of: NaiveDate,
    ) -> Result<ReconcileReceipt>;

    /// Cron entry point: runs the scheduled re-valuation for every active
    /// scheduled asset whose `next_valuation_date` has elapsed.
    async fn run_due_revaluations(
        &self,
        owner_id: &str,
        as_of: NaiveDate,
    ) -> Result<Vec<ReconcileReceipt>>;
}
