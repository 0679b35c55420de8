use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;

use assetledger_core::errors::{Error, LedgerError, Result};
use assetledger_core::ledger::{
    LedgerEntry, LedgerEntryUpdate, LedgerRepositoryTrait, NewLedgerEntry, ProjectionUpdate,
};

use super::model::LedgerEntryDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{assets, ledger_entries};
use crate::utils::DATE_FORMAT;

/// Repository for the append-only ledger and its asset projection.
///
/// Each `*_with_projection` method runs inside one writer-actor transaction:
/// the ledger write, the version check, and the projection write commit or
/// roll back together.
pub struct LedgerRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository instance.
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

fn load_entry_scoped(
    conn: &mut SqliteConnection,
    owner_id: &str,
    entry_id: &str,
) -> Result<LedgerEntryDB> {
    ledger_entries::table
        .filter(ledger_entries::id.eq(entry_id))
        .filter(ledger_entries::owner_id.eq(owner_id))
        .select(LedgerEntryDB::as_select())
        .first::<LedgerEntryDB>(conn)
        .optional()
        .map_err(StorageError::from)?
        .ok_or_else(|| Error::Ledger(LedgerError::NotFound(format!("Ledger entry {}", entry_id))))
}

/// Applies the projection write after verifying the optimistic version.
///
/// Runs inside the caller's transaction; a `StaleProjection` error rolls the
/// accompanying ledger write back too.
fn apply_projection(conn: &mut SqliteConnection, projection: &ProjectionUpdate) -> Result<()> {
    let found: i64 = assets::table
        .filter(assets::id.eq(&projection.asset_id))
        .filter(assets::owner_id.eq(&projection.owner_id))
        .select(assets::version)
        .first(conn)
        .optional()
        .map_err(StorageError::from)?
        .ok_or_else(|| {
            Error::Ledger(LedgerError::NotFound(format!(
                "Asset {}",
                projection.asset_id
            )))
        })?;

    if found != projection.expected_version {
        return Err(Error::Ledger(LedgerError::StaleProjection {
            asset_id: projection.asset_id.clone(),
            expected: projection.expected_version,
            found,
        }));
    }

    let now = Utc::now().to_rfc3339();
    let target = assets::table
        .filter(assets::id.eq(&projection.asset_id))
        .filter(assets::owner_id.eq(&projection.owner_id));

    let affected = match projection.next_valuation_date {
        Some(next) => diesel::update(target)
            .set((
                assets::current_value.eq(projection.current_value.to_string()),
                assets::last_value_update_date
                    .eq(projection.last_value_update_date.format(DATE_FORMAT).to_string()),
                assets::next_valuation_date.eq(Some(next.format(DATE_FORMAT).to_string())),
                assets::version.eq(found + 1),
                assets::updated_at.eq(&now),
            ))
            .execute(conn),
        None => diesel::update(target)
            .set((
                assets::current_value.eq(projection.current_value.to_string()),
                assets::last_value_update_date
                    .eq(projection.last_value_update_date.format(DATE_FORMAT).to_string()),
                assets::version.eq(found + 1),
                assets::updated_at.eq(&now),
            ))
            .execute(conn),
    }
    .map_err(StorageError::from)?;

    if affected != 1 {
        return Err(Error::Ledger(LedgerError::NotFound(format!(
            "Asset {}",
            projection.asset_id
        ))));
    }
    Ok(())
}

#[async_trait]
impl LedgerRepositoryTrait for LedgerRepository {
    fn get_entry(&self, owner_id: &str, entry_id: &str) -> Result<LedgerEntry> {
        let mut conn = get_connection(&self.pool)?;
        load_entry_scoped(&mut conn, owner_id, entry_id).map(LedgerEntry::from)
    }

    fn list_for_asset(&self, owner_id: &str, asset_id: &str) -> Result<Vec<LedgerEntry>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = ledger_entries::table
            .filter(ledger_entries::owner_id.eq(owner_id))
            .filter(ledger_entries::asset_id.eq(asset_id))
            .select(LedgerEntryDB::as_select())
            .order((
                ledger_entries::date.asc(),
                ledger_entries::created_at.asc(),
                ledger_entries::id.asc(),
            ))
            .load::<LedgerEntryDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(LedgerEntry::from).collect())
    }

    fn list_for_owner(&self, owner_id: &str) -> Result<Vec<LedgerEntry>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = ledger_entries::table
            .filter(ledger_entries::owner_id.eq(owner_id))
            .select(LedgerEntryDB::as_select())
            .order((
                ledger_entries::date.asc(),
                ledger_entries::created_at.asc(),
                ledger_entries::id.asc(),
            ))
            .load::<LedgerEntryDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(LedgerEntry::from).collect())
    }

    fn find_by_idempotency_key(&self, owner_id: &str, key: &str) -> Result<Option<LedgerEntry>> {
        let mut conn = get_connection(&self.pool)?;
        let row = ledger_entries::table
            .filter(ledger_entries::owner_id.eq(owner_id))
            .filter(ledger_entries::idempotency_key.eq(key))
            .select(LedgerEntryDB::as_select())
            .first::<LedgerEntryDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(LedgerEntry::from))
    }

    async fn append_with_projection(
        &self,
        owner_id: &str,
        entry: NewLedgerEntry,
        projection: ProjectionUpdate,
    ) -> Result<LedgerEntry> {
        let row = LedgerEntryDB::from_new(owner_id, entry);

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<LedgerEntry> {
                apply_projection(conn, &projection)?;
                let inserted = diesel::insert_into(ledger_entries::table)
                    .values(&row)
                    .get_result::<LedgerEntryDB>(conn)
                    .map_err(StorageError::from)?;
                Ok(LedgerEntry::from(inserted))
            })
            .await
    }

    async fn replace_with_projection(
        &self,
        owner_id: &str,
        update: LedgerEntryUpdate,
        projection: ProjectionUpdate,
    ) -> Result<LedgerEntry> {
        let owner_id = owner_id.to_string();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<LedgerEntry> {
                apply_projection(conn, &projection)?;

                let mut row = load_entry_scoped(conn, &owner_id, &update.id)?;
                row.date = update.date.format(DATE_FORMAT).to_string();
                row.transaction_type = update.transaction_type.as_db_str().to_string();
                row.amount = update.amount.to_string();
                row.quantity = update.quantity.map(|q| q.to_string());
                row.price_per_unit = update.price_per_unit.map(|p| p.to_string());
                if let Some(value) = update.value_after_transaction {
                    row.value_after_transaction = value.to_string();
                }
                row.notes = update.notes;
                row.updated_at = Utc::now().to_rfc3339();

                let updated = diesel::update(
                    ledger_entries::table
                        .filter(ledger_entries::id.eq(&row.id))
                        .filter(ledger_entries::owner_id.eq(&owner_id)),
                )
                .set(&row)
                .get_result::<LedgerEntryDB>(conn)
                .map_err(StorageError::from)?;
                Ok(LedgerEntry::from(updated))
            })
            .await
    }

    async fn delete_with_projection(
        &self,
        owner_id: &str,
        entry_id: &str,
        projection: ProjectionUpdate,
    ) -> Result<LedgerEntry> {
        let owner_id = owner_id.to_string();
        let entry_id = entry_id.to_string();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<LedgerEntry> {
                apply_projection(conn, &projection)?;

                let row = load_entry_scoped(conn, &owner_id, &entry_id)?;
                diesel::delete(
                    ledger_entries::table
                        .filter(ledger_entries::id.eq(&entry_id))
                        .filter(ledger_entries::owner_id.eq(&owner_id)),
                )
                .execute(conn)
                .map_err(StorageError::from)?;
                Ok(LedgerEntry::from(row))
            })
            .await
    }
}
