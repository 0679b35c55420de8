//! Database models for assets.

use chrono::Utc;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use assetledger_core::assets::{
    AppreciationType, Asset, AssetType, DepreciationMethod, NewAsset, ValuationMethod,
    ValuationPolicy, DEFAULT_VALUATION_CADENCE_DAYS,
};

use crate::utils::{parse_date_tolerant, parse_datetime_tolerant, parse_decimal_tolerant, DATE_FORMAT};

/// Database model for assets.
///
/// Decimals and dates are TEXT; enums are their SCREAMING_SNAKE_CASE
/// strings. The flattened valuation policy lives in its own columns.
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::assets)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AssetDB {
    pub id: String,
    pub owner_id: String,
    pub asset_type: String,
    pub name: String,
    pub symbol: Option<String>,
    pub location: Option<String>,
    pub quantity: Option<String>,
    pub currency: String,
    pub initial_value: String,
    pub current_value: String,
    pub acquisition_date: String,
    pub last_value_update_date: String,
    pub depreciation_method: String,
    pub appreciation_type: String,
    pub annual_rate_of_return: Option<String>,
    pub useful_life_years: Option<String>,
    pub salvage_value: Option<String>,
    pub valuation_method: String,
    pub next_valuation_date: Option<String>,
    pub valuation_cadence_days: i64,
    pub is_active: bool,
    pub sold_date: Option<String>,
    pub sale_value: Option<String>,
    pub version: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl AssetDB {
    /// Builds the row for a brand-new asset. The projection starts at the
    /// acquisition point and version 1.
    pub fn from_new(owner_id: &str, new: NewAsset) -> Self {
        let now = Utc::now().to_rfc3339();
        let acquisition = new.acquisition_date.format(DATE_FORMAT).to_string();
        Self {
            id: new.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            owner_id: owner_id.to_string(),
            asset_type: new.asset_type.as_db_str().to_string(),
            name: new.name,
            symbol: new.symbol,
            location: new.location,
            quantity: new.quantity.map(|q| q.to_string()),
            currency: new.currency,
            initial_value: new.initial_value.to_string(),
            current_value: new.initial_value.to_string(),
            acquisition_date: acquisition.clone(),
            last_value_update_date: acquisition,
            depreciation_method: new.valuation_policy.depreciation_method.as_db_str().to_string(),
            appreciation_type: new.valuation_policy.appreciation_type.as_db_str().to_string(),
            annual_rate_of_return: new
                .valuation_policy
                .annual_rate_of_return
                .map(|d| d.to_string()),
            useful_life_years: new.valuation_policy.useful_life_years.map(|d| d.to_string()),
            salvage_value: new.valuation_policy.salvage_value.map(|d| d.to_string()),
            valuation_method: new.valuation_method.as_db_str().to_string(),
            next_valuation_date: new
                .next_valuation_date
                .map(|d| d.format(DATE_FORMAT).to_string()),
            valuation_cadence_days: new
                .valuation_cadence_days
                .unwrap_or(DEFAULT_VALUATION_CADENCE_DAYS),
            is_active: true,
            sold_date: None,
            sale_value: None,
            version: 1,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

impl From<AssetDB> for Asset {
    fn from(db: AssetDB) -> Self {
        let valuation_policy = ValuationPolicy {
            depreciation_method: DepreciationMethod::from_db_str(&db.depreciation_method)
                .unwrap_or_else(|e| {
                    log::error!("Asset {}: {}", db.id, e);
                    DepreciationMethod::None
                }),
            appreciation_type: AppreciationType::from_db_str(&db.appreciation_type)
                .unwrap_or_else(|e| {
                    log::error!("Asset {}: {}", db.id, e);
                    AppreciationType::None
                }),
            annual_rate_of_return: db
                .annual_rate_of_return
                .as_deref()
                .map(|s| parse_decimal_tolerant(s, "annual_rate_of_return")),
            useful_life_years: db
                .useful_life_years
                .as_deref()
                .map(|s| parse_decimal_tolerant(s, "useful_life_years")),
            salvage_value: db
                .salvage_value
                .as_deref()
                .map(|s| parse_decimal_tolerant(s, "salvage_value")),
        };

        Self {
            asset_type: AssetType::from_db_str(&db.asset_type).unwrap_or_else(|e| {
                log::error!("Asset {}: {}", db.id, e);
                AssetType::Other
            }),
            name: db.name,
            symbol: db.symbol,
            location: db.location,
            quantity: db.quantity.as_deref().map(|s| parse_decimal_tolerant(s, "quantity")),
            currency: db.currency,
            initial_value: parse_decimal_tolerant(&db.initial_value, "initial_value"),
            current_value: parse_decimal_tolerant(&db.current_value, "current_value"),
            acquisition_date: parse_date_tolerant(&db.acquisition_date, "acquisition_date"),
            last_value_update_date: parse_date_tolerant(
                &db.last_value_update_date,
                "last_value_update_date",
            ),
            valuation_policy,
            valuation_method: ValuationMethod::from_db_str(&db.valuation_method).unwrap_or_else(
                |e| {
                    log::error!("Asset {}: {}", db.id, e);
                    ValuationMethod::Manual
                },
            ),
            next_valuation_date: db
                .next_valuation_date
                .as_deref()
                .map(|s| parse_date_tolerant(s, "next_valuation_date")),
            valuation_cadence_days: db.valuation_cadence_days,
            is_active: db.is_active,
            sold_date: db.sold_date.as_deref().map(|s| parse_date_tolerant(s, "sold_date")),
            sale_value: db.sale_value.as_deref().map(|s| parse_decimal_tolerant(s, "sale_value")),
            version: db.version,
            created_at: parse_datetime_tolerant(&db.created_at, "created_at"),
            updated_at: parse_datetime_tolerant(&db.updated_at, "updated_at"),
            owner_id: db.owner_id,
            id: db.id,
        }
    }
}
