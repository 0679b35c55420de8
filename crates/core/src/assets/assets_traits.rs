use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::assets_model::{Asset, AssetUpdate, NewAsset, ValuationPolicy};
use crate::Result;

/// Trait defining the contract for Asset repository operations.
///
/// All lookups are owner-scoped; a miss in another owner's scope is a plain
/// not-found, never a leak.
#[async_trait]
pub trait AssetRepositoryTrait: Send + Sync {
    fn get_by_id(&self, owner_id: &str, asset_id: &str) -> Result<Asset>;
    fn list(&self, owner_id: &str) -> Result<Vec<Asset>>;
    /// Active scheduled assets whose `next_valuation_date` has elapsed.
    fn list_scheduled_due(&self, owner_id: &str, as_of: NaiveDate) -> Result<Vec<Asset>>;
    async fn create(&self, owner_id: &str, new_asset: NewAsset) -> Result<Asset>;
    async fn update_details(&self, owner_id: &str, update: AssetUpdate) -> Result<Asset>;
    /// Persists a policy change. Metadata-only: no ledger entry is written
    /// and the projection value is untouched.
    async fn set_valuation_policy(
        &self,
        owner_id: &str,
        asset_id: &str,
        policy: ValuationPolicy,
    ) -> Result<Asset>;
    /// Soft-retires the asset. Assets referenced by ledger entries are never
    /// hard-deleted.
    async fn retire(
        &self,
        owner_id: &str,
        asset_id: &str,
        sold_date: NaiveDate,
        sale_value: Option<Decimal>,
    ) -> Result<Asset>;
}

/// Trait defining the contract for Asset service operations.
#[async_trait]
pub trait AssetServiceTrait: Send + Sync {
    fn get_asset(&self, owner_id: &str, asset_id: &str) -> Result<Asset>;
    fn list_assets(&self, owner_id: &str) -> Result<Vec<Asset>>;
    async fn create_asset(&self, owner_id: &str, new_asset: NewAsset) -> Result<Asset>;
    async fn update_asset(&self, owner_id: &str, update: AssetUpdate) -> Result<Asset>;
    async fn set_valuation_policy(
        &self,
        owner_id: &str,
        asset_id: &str,
        policy: ValuationPolicy,
    ) -> Result<Asset>;
    async fn retire_asset(
        &self,
        owner_id: &str,
        asset_id: &str,
        sold_date: NaiveDate,
        sale_value: Option<Decimal>,
    ) -> Result<Asset>;
}
