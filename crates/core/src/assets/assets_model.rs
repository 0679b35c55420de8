//! Asset domain models.
//!
//! The `Asset` struct is the projection side of the ledger: its
//! `current_value` and `last_value_update_date` are derived state, mutated
//! only by the reconciliation coordinator so that they always match the
//! chronologically last ledger entry.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, LedgerError, Result, ValidationError};

/// Classification of a tracked holding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetType {
    Property,
    Stock,
    Crypto,
    TermDeposit,
    #[default]
    Other,
}

impl AssetType {
    /// Returns the database string representation (SCREAMING_SNAKE_CASE).
    pub const fn as_db_str(&self) -> &'static str {
        match self {
            AssetType::Property => "PROPERTY",
            AssetType::Stock => "STOCK",
            AssetType::Crypto => "CRYPTO",
            AssetType::TermDeposit => "TERM_DEPOSIT",
            AssetType::Other => "OTHER",
        }
    }

    /// Parses the database string representation.
    pub fn from_db_str(s: &str) -> Result<Self> {
        match s {
            "PROPERTY" => Ok(AssetType::Property),
            "STOCK" => Ok(AssetType::Stock),
            "CRYPTO" => Ok(AssetType::Crypto),
            "TERM_DEPOSIT" => Ok(AssetType::TermDeposit),
            "OTHER" => Ok(AssetType::Other),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown asset type: {}",
                other
            )))),
        }
    }
}

/// Depreciation side of the valuation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DepreciationMethod {
    #[default]
    None,
    StraightLine,
    DoubleDeclining,
}

impl DepreciationMethod {
    pub const fn as_db_str(&self) -> &'static str {
        match self {
            DepreciationMethod::None => "NONE",
            DepreciationMethod::StraightLine => "STRAIGHT_LINE",
            DepreciationMethod::DoubleDeclining => "DOUBLE_DECLINING",
        }
    }

    pub fn from_db_str(s: &str) -> Result<Self> {
        match s {
            "NONE" => Ok(DepreciationMethod::None),
            "STRAIGHT_LINE" => Ok(DepreciationMethod::StraightLine),
            "DOUBLE_DECLINING" => Ok(DepreciationMethod::DoubleDeclining),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown depreciation method: {}",
                other
            )))),
        }
    }
}

/// Appreciation side of the valuation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppreciationType {
    #[default]
    None,
    Compound,
    Linear,
}

impl AppreciationType {
    pub const fn as_db_str(&self) -> &'static str {
        match self {
            AppreciationType::None => "NONE",
            AppreciationType::Compound => "COMPOUND",
            AppreciationType::Linear => "LINEAR",
        }
    }

    pub fn from_db_str(s: &str) -> Result<Self> {
        match s {
            "NONE" => Ok(AppreciationType::None),
            "COMPOUND" => Ok(AppreciationType::Compound),
            "LINEAR" => Ok(AppreciationType::Linear),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown appreciation type: {}",
                other
            )))),
        }
    }
}

/// How re-valuations are triggered for an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValuationMethod {
    #[default]
    Manual,
    Scheduled,
    Automatic,
}

impl ValuationMethod {
    pub const fn as_db_str(&self) -> &'static str {
        match self {
            ValuationMethod::Manual => "MANUAL",
            ValuationMethod::Scheduled => "SCHEDULED",
            ValuationMethod::Automatic => "AUTOMATIC",
        }
    }

    pub fn from_db_str(s: &str) -> Result<Self> {
        match s {
            "MANUAL" => Ok(ValuationMethod::Manual),
            "SCHEDULED" => Ok(ValuationMethod::Scheduled),
            "AUTOMATIC" => Ok(ValuationMethod::Automatic),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown valuation method: {}",
                other
            )))),
        }
    }
}

/// The combination of depreciation/appreciation method and rate parameters
/// governing how an asset's value evolves between explicit updates.
///
/// At most one of `depreciation_method` / `appreciation_type` is active at a
/// time; selecting one side clears the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ValuationPolicy {
    pub depreciation_method: DepreciationMethod,
    pub appreciation_type: AppreciationType,
    /// Annual rate in percent, required for appreciation policies.
    pub annual_rate_of_return: Option<Decimal>,
    /// Required for depreciation policies.
    pub useful_life_years: Option<Decimal>,
    /// Required for depreciation policies.
    pub salvage_value: Option<Decimal>,
}

impl ValuationPolicy {
    /// Policy with neither side active. The asset's value only moves on
    /// explicit ledger entries.
    pub fn none() -> Self {
        Self::default()
    }

    /// Builds a depreciation policy, clearing any appreciation side.
    pub fn depreciating(
        method: DepreciationMethod,
        useful_life_years: Decimal,
        salvage_value: Decimal,
    ) -> Self {
        Self {
            depreciation_method: method,
            appreciation_type: AppreciationType::None,
            annual_rate_of_return: None,
            useful_life_years: Some(useful_life_years),
            salvage_value: Some(salvage_value),
        }
    }

    /// Builds an appreciation policy, clearing any depreciation side.
    pub fn appreciating(appreciation_type: AppreciationType, annual_rate: Decimal) -> Self {
        Self {
            depreciation_method: DepreciationMethod::None,
            appreciation_type,
            annual_rate_of_return: Some(annual_rate),
            useful_life_years: None,
            salvage_value: None,
        }
    }

    /// True when neither side of the policy is active.
    pub fn is_none(&self) -> bool {
        self.depreciation_method == DepreciationMethod::None
            && self.appreciation_type == AppreciationType::None
    }

    /// Validates the policy invariant: exactly one of depreciation /
    /// appreciation may be active, and the active side must carry its
    /// parameters.
    pub fn validate(&self) -> Result<()> {
        let depreciating = self.depreciation_method != DepreciationMethod::None;
        let appreciating = self.appreciation_type != AppreciationType::None;

        if depreciating && appreciating {
            return Err(Error::Ledger(LedgerError::PolicyConflict(format!(
                "Depreciation method {} and appreciation type {} cannot both be active",
                self.depreciation_method.as_db_str(),
                self.appreciation_type.as_db_str()
            ))));
        }

        if depreciating {
            let life = self.useful_life_years.ok_or_else(|| {
                Error::Validation(ValidationError::MissingField("usefulLifeYears".to_string()))
            })?;
            if life <= Decimal::ZERO {
                return Err(Error::Validation(ValidationError::InvalidInput(
                    "Useful life must be positive".to_string(),
                )));
            }
            if self.salvage_value.is_none() {
                return Err(Error::Validation(ValidationError::MissingField(
                    "salvageValue".to_string(),
                )));
            }
        }

        if appreciating && self.annual_rate_of_return.is_none() {
            return Err(Error::Validation(ValidationError::MissingField(
                "annualRateOfReturn".to_string(),
            )));
        }

        Ok(())
    }
}

/// Domain model representing one tracked holding.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    /// Owner id supplied by the identity provider; trusted as-is.
    pub owner_id: String,
    pub asset_type: AssetType,
    pub name: String,
    pub symbol: Option<String>,
    pub location: Option<String>,
    pub quantity: Option<Decimal>,
    pub currency: String,

    // Valuation state. `current_value` and `last_value_update_date` are
    // written only by the reconciliation coordinator.
    pub initial_value: Decimal,
    pub current_value: Decimal,
    pub acquisition_date: NaiveDate,
    pub last_value_update_date: NaiveDate,

    #[serde(flatten)]
    pub valuation_policy: ValuationPolicy,

    // Scheduling
    pub valuation_method: ValuationMethod,
    pub next_valuation_date: Option<NaiveDate>,
    pub valuation_cadence_days: i64,

    // Lifecycle
    pub is_active: bool,
    pub sold_date: Option<NaiveDate>,
    pub sale_value: Option<Decimal>,

    /// Optimistic-concurrency version, bumped on every projection write.
    pub version: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Asset {
    /// True when the asset is scheduled and its next valuation date has
    /// elapsed as of the given date.
    pub fn is_revaluation_due(&self, as_of: NaiveDate) -> bool {
        self.valuation_method == ValuationMethod::Scheduled
            && self.is_active
            && self.next_valuation_date.is_some_and(|d| d <= as_of)
    }
}

/// Default re-valuation cadence for scheduled assets, in days.
pub const DEFAULT_VALUATION_CADENCE_DAYS: i64 = 30;

/// Input model for creating a new asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAsset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub asset_type: AssetType,
    pub name: String,
    pub symbol: Option<String>,
    pub location: Option<String>,
    pub quantity: Option<Decimal>,
    pub currency: String,
    pub initial_value: Decimal,
    pub acquisition_date: NaiveDate,
    #[serde(default)]
    pub valuation_policy: ValuationPolicy,
    #[serde(default)]
    pub valuation_method: ValuationMethod,
    pub next_valuation_date: Option<NaiveDate>,
    pub valuation_cadence_days: Option<i64>,
}

impl NewAsset {
    /// Validates the new asset data.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Asset name cannot be empty".to_string(),
            )));
        }
        if self.currency.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Currency cannot be empty".to_string(),
            )));
        }
        if self.initial_value < Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Initial value cannot be negative".to_string(),
            )));
        }
        self.valuation_policy.validate()?;

        // Scheduled assets must know when to fire next.
        if self.valuation_method == ValuationMethod::Scheduled && self.next_valuation_date.is_none()
        {
            return Err(Error::Validation(ValidationError::MissingField(
                "nextValuationDate".to_string(),
            )));
        }
        if let Some(cadence) = self.valuation_cadence_days {
            if cadence <= 0 {
                return Err(Error::Validation(ValidationError::InvalidInput(
                    "Valuation cadence must be positive".to_string(),
                )));
            }
        }
        Ok(())
    }
}

/// Input model for updating an asset's descriptive fields.
///
/// Valuation state is deliberately absent: `current_value` moves only through
/// the reconciliation coordinator, and the policy moves through
/// `set_valuation_policy`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetUpdate {
    pub id: String,
    pub name: String,
    pub symbol: Option<String>,
    pub location: Option<String>,
    pub quantity: Option<Decimal>,
    pub valuation_method: ValuationMethod,
    pub next_valuation_date: Option<NaiveDate>,
    pub valuation_cadence_days: Option<i64>,
}

impl AssetUpdate {
    /// Validates the asset update data.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "id".to_string(),
            )));
        }
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Asset name cannot be empty".to_string(),
            )));
        }
        if self.valuation_method == ValuationMethod::Scheduled && self.next_valuation_date.is_none()
        {
            return Err(Error::Validation(ValidationError::MissingField(
                "nextValuationDate".to_string(),
            )));
        }
        Ok(())
    }
}
