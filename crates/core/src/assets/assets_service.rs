use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;

use super::assets_model::{Asset, AssetUpdate, NewAsset, ValuationPolicy};
use super::assets_traits::{AssetRepositoryTrait, AssetServiceTrait};
use crate::Result;

/// Service for managing assets.
///
/// The service holds and serves the asset projection: read accessors plus
/// metadata writes. It never computes valuations and never touches
/// `current_value` — that is the reconciliation coordinator's job.
pub struct AssetService {
    asset_repository: Arc<dyn AssetRepositoryTrait>,
}

impl AssetService {
    /// Creates a new AssetService instance with an injected repository.
    pub fn new(asset_repository: Arc<dyn AssetRepositoryTrait>) -> Self {
        Self { asset_repository }
    }
}

#[async_trait]
impl AssetServiceTrait for AssetService {
    fn get_asset(&self, owner_id: &str, asset_id: &str) -> Result<Asset> {
        self.asset_repository.get_by_id(owner_id, asset_id)
    }

    fn list_assets(&self, owner_id: &str) -> Result<Vec<Asset>> {
        self.asset_repository.list(owner_id)
    }

    async fn create_asset(&self, owner_id: &str, new_asset: NewAsset) -> Result<Asset> {
        new_asset.validate()?;
        debug!("Creating asset '{}' for owner {}", new_asset.name, owner_id);
        self.asset_repository.create(owner_id, new_asset).await
    }

    async fn update_asset(&self, owner_id: &str, update: AssetUpdate) -> Result<Asset> {
        update.validate()?;
        self.asset_repository.update_details(owner_id, update).await
    }

    /// Changes the valuation policy. Selecting one side clears the other,
    /// and the change is metadata-only: it takes effect on the next
    /// valuation event, without writing a ledger entry.
    async fn set_valuation_policy(
        &self,
        owner_id: &str,
        asset_id: &str,
        policy: ValuationPolicy,
    ) -> Result<Asset> {
        policy.validate()?;
        // Confirm the asset exists in the caller's scope before writing.
        self.asset_repository.get_by_id(owner_id, asset_id)?;
        debug!(
            "Setting valuation policy for asset {}: depreciation={}, appreciation={}",
            asset_id,
            policy.depreciation_method.as_db_str(),
            policy.appreciation_type.as_db_str()
        );
        self.asset_repository
            .set_valuation_policy(owner_id, asset_id, policy)
            .await
    }

    async fn retire_asset(
        &self,
        owner_id: &str,
        asset_id: &str,
        sold_date: NaiveDate,
        sale_value: Option<Decimal>,
    ) -> Result<Asset> {
        debug!("Retiring asset {} as of {}", asset_id, sold_date);
        self.asset_repository
            .retire(owner_id, asset_id, sold_date, sale_value)
            .await
    }
}
