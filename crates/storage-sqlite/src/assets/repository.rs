use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use diesel::SqliteConnection;
use rust_decimal::Decimal;

use assetledger_core::assets::{
    Asset, AssetRepositoryTrait, AssetUpdate, NewAsset, ValuationMethod, ValuationPolicy,
};
use assetledger_core::errors::{Error, LedgerError, Result};

use super::model::AssetDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::assets;
use crate::utils::DATE_FORMAT;

/// Repository for managing asset rows.
///
/// Reads use the shared pool; all writes go through the writer actor. The
/// projection columns (`current_value`, `last_value_update_date`, `version`)
/// are never written here; they belong to the ledger repository's atomic
/// projection updates.
pub struct AssetRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl AssetRepository {
    /// Creates a new AssetRepository instance.
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

fn load_scoped(
    conn: &mut SqliteConnection,
    owner_id: &str,
    asset_id: &str,
) -> Result<AssetDB> {
    assets::table
        .filter(assets::id.eq(asset_id))
        .filter(assets::owner_id.eq(owner_id))
        .select(AssetDB::as_select())
        .first::<AssetDB>(conn)
        .optional()
        .map_err(StorageError::from)?
        .ok_or_else(|| Error::Ledger(LedgerError::NotFound(format!("Asset {}", asset_id))))
}

#[async_trait]
impl AssetRepositoryTrait for AssetRepository {
    fn get_by_id(&self, owner_id: &str, asset_id: &str) -> Result<Asset> {
        let mut conn = get_connection(&self.pool)?;
        load_scoped(&mut conn, owner_id, asset_id).map(Asset::from)
    }

    fn list(&self, owner_id: &str) -> Result<Vec<Asset>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = assets::table
            .filter(assets::owner_id.eq(owner_id))
            .select(AssetDB::as_select())
            .order(assets::created_at.asc())
            .load::<AssetDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Asset::from).collect())
    }

    fn list_scheduled_due(&self, owner_id: &str, as_of: NaiveDate) -> Result<Vec<Asset>> {
        let mut conn = get_connection(&self.pool)?;
        // Dates are %Y-%m-%d TEXT, so string comparison is chronological.
        let cutoff = as_of.format(DATE_FORMAT).to_string();
        let rows = assets::table
            .filter(assets::owner_id.eq(owner_id))
            .filter(assets::is_active.eq(true))
            .filter(assets::valuation_method.eq(ValuationMethod::Scheduled.as_db_str()))
            .filter(assets::next_valuation_date.le(cutoff))
            .select(AssetDB::as_select())
            .order(assets::next_valuation_date.asc())
            .load::<AssetDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Asset::from).collect())
    }

    async fn create(&self, owner_id: &str, new_asset: NewAsset) -> Result<Asset> {
        new_asset.validate()?;
        let row = AssetDB::from_new(owner_id, new_asset);

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Asset> {
                let inserted = diesel::insert_into(assets::table)
                    .values(&row)
                    .get_result::<AssetDB>(conn)
                    .map_err(StorageError::from)?;
                Ok(Asset::from(inserted))
            })
            .await
    }

    async fn update_details(&self, owner_id: &str, update: AssetUpdate) -> Result<Asset> {
        update.validate()?;
        let owner_id = owner_id.to_string();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Asset> {
                let mut row = load_scoped(conn, &owner_id, &update.id)?;
                row.name = update.name;
                row.symbol = update.symbol;
                row.location = update.location;
                row.quantity = update.quantity.map(|q| q.to_string());
                row.valuation_method = update.valuation_method.as_db_str().to_string();
                row.next_valuation_date = update
                    .next_valuation_date
                    .map(|d| d.format(DATE_FORMAT).to_string());
                if let Some(cadence) = update.valuation_cadence_days {
                    row.valuation_cadence_days = cadence;
                }
                row.updated_at = Utc::now().to_rfc3339();

                let updated = diesel::update(
                    assets::table
                        .filter(assets::id.eq(&row.id))
                        .filter(assets::owner_id.eq(&owner_id)),
                )
                .set(&row)
                .get_result::<AssetDB>(conn)
                .map_err(StorageError::from)?;
                Ok(Asset::from(updated))
            })
            .await
    }

    async fn set_valuation_policy(
        &self,
        owner_id: &str,
        asset_id: &str,
        policy: ValuationPolicy,
    ) -> Result<Asset> {
        policy.validate()?;
        let owner_id = owner_id.to_string();
        let asset_id = asset_id.to_string();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Asset> {
                // Metadata-only: the projection value and version stay put,
                // so no ledger entry accompanies a policy switch.
                let mut row = load_scoped(conn, &owner_id, &asset_id)?;
                row.depreciation_method = policy.depreciation_method.as_db_str().to_string();
                row.appreciation_type = policy.appreciation_type.as_db_str().to_string();
                row.annual_rate_of_return =
                    policy.annual_rate_of_return.map(|d| d.to_string());
                row.useful_life_years = policy.useful_life_years.map(|d| d.to_string());
                row.salvage_value = policy.salvage_value.map(|d| d.to_string());
                row.updated_at = Utc::now().to_rfc3339();

                let updated = diesel::update(
                    assets::table
                        .filter(assets::id.eq(&asset_id))
                        .filter(assets::owner_id.eq(&owner_id)),
                )
                .set(&row)
                .get_result::<AssetDB>(conn)
                .map_err(StorageError::from)?;
                Ok(Asset::from(updated))
            })
            .await
    }

    async fn retire(
        &self,
        owner_id: &str,
        asset_id: &str,
        sold_date: NaiveDate,
        sale_value: Option<Decimal>,
    ) -> Result<Asset> {
        let owner_id = owner_id.to_string();
        let asset_id = asset_id.to_string();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Asset> {
                let mut row = load_scoped(conn, &owner_id, &asset_id)?;
                row.is_active = false;
                row.sold_date = Some(sold_date.format(DATE_FORMAT).to_string());
                row.sale_value = sale_value.map(|v| v.to_string());
                row.updated_at = Utc::now().to_rfc3339();

                let updated = diesel::update(
                    assets::table
                        .filter(assets::id.eq(&asset_id))
                        .filter(assets::owner_id.eq(&owner_id)),
                )
                .set(&row)
                .get_result::<AssetDB>(conn)
                .map_err(StorageError::from)?;
                Ok(Asset::from(updated))
            })
            .await
    }
}
