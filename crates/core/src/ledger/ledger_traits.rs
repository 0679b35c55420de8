use async_trait::async_trait;

use super::ledger_model::{LedgerEntry, LedgerEntryUpdate, NewLedgerEntry, ProjectionUpdate};
use crate::Result;

/// Trait defining the contract for ledger repository operations.
///
/// The `*_with_projection` methods are the system's one shared-mutable-state
/// hazard: the ledger write and the asset projection write must land under a
/// single atomic commit, and the projection's `expected_version` must still
/// match the asset row. Implementations fail with `StaleProjection` without
/// applying either write when it does not.
#[async_trait]
pub trait LedgerRepositoryTrait: Send + Sync {
    fn get_entry(&self, owner_id: &str, entry_id: &str) -> Result<LedgerEntry>;
    /// All entries for one asset, ordered by date then insertion order.
    fn list_for_asset(&self, owner_id: &str, asset_id: &str) -> Result<Vec<LedgerEntry>>;
    /// All entries for one owner, ordered by date then insertion order.
    fn list_for_owner(&self, owner_id: &str) -> Result<Vec<LedgerEntry>>;
    /// Looks up a synthesized entry by its idempotency key.
    fn find_by_idempotency_key(&self, owner_id: &str, key: &str) -> Result<Option<LedgerEntry>>;

    /// Appends a ledger entry and applies the projection update atomically.
    async fn append_with_projection(
        &self,
        owner_id: &str,
        entry: NewLedgerEntry,
        projection: ProjectionUpdate,
    ) -> Result<LedgerEntry>;

    /// Replaces an entry's fields and applies the projection update atomically.
    async fn replace_with_projection(
        &self,
        owner_id: &str,
        update: LedgerEntryUpdate,
        projection: ProjectionUpdate,
    ) -> Result<LedgerEntry>;

    /// Deletes an entry and applies the projection update atomically.
    /// Returns the deleted entry.
    async fn delete_with_projection(
        &self,
        owner_id: &str,
        entry_id: &str,
        projection: ProjectionUpdate,
    ) -> Result<LedgerEntry>;
}
