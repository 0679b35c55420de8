//! Ledger entry domain models.
//!
//! A ledger entry is an immutable, append-only fact: one value-affecting
//! event for one asset. The ordered entry sequence is the source of truth
//! from which the asset projection is derived.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, LedgerError, Result, ValidationError};

/// Kind of value-affecting event.
///
/// Sign conventions are per type: positive amounts increase value, negative
/// amounts decrease it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// Re-valuation to a new absolute value; the signed delta may go either way.
    #[default]
    ValuationUpdate,
    Purchase,
    Sale,
    Dividend,
    Interest,
    Contribution,
    Withdrawal,
    /// Quantity adjustment without value change; amount is usually zero.
    Split,
    Fee,
}

impl TransactionType {
    /// Returns the database string representation (SCREAMING_SNAKE_CASE).
    pub const fn as_db_str(&self) -> &'static str {
        match self {
            TransactionType::ValuationUpdate => "VALUATION_UPDATE",
            TransactionType::Purchase => "PURCHASE",
            TransactionType::Sale => "SALE",
            TransactionType::Dividend => "DIVIDEND",
            TransactionType::Interest => "INTEREST",
            TransactionType::Contribution => "CONTRIBUTION",
            TransactionType::Withdrawal => "WITHDRAWAL",
            TransactionType::Split => "SPLIT",
            TransactionType::Fee => "FEE",
        }
    }

    /// Parses the database string representation.
    pub fn from_db_str(s: &str) -> Result<Self> {
        match s {
            "VALUATION_UPDATE" => Ok(TransactionType::ValuationUpdate),
            "PURCHASE" => Ok(TransactionType::Purchase),
            "SALE" => Ok(TransactionType::Sale),
            "DIVIDEND" => Ok(TransactionType::Dividend),
            "INTEREST" => Ok(TransactionType::Interest),
            "CONTRIBUTION" => Ok(TransactionType::Contribution),
            "WITHDRAWAL" => Ok(TransactionType::Withdrawal),
            "SPLIT" => Ok(TransactionType::Split),
            "FEE" => Ok(TransactionType::Fee),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown transaction type: {}",
                other
            )))),
        }
    }

    /// Checks the amount sign against this type's convention.
    ///
    /// Sale/withdrawal/fee must not increase value; purchase/contribution/
    /// dividend/interest must not decrease it. Valuation updates and splits
    /// may carry either sign.
    pub fn validate_amount_sign(&self, amount: Decimal) -> Result<()> {
        let violation = match self {
            TransactionType::Sale | TransactionType::Withdrawal | TransactionType::Fee => {
                amount > Decimal::ZERO
            }
            TransactionType::Purchase
            | TransactionType::Contribution
            | TransactionType::Dividend
            | TransactionType::Interest => amount < Decimal::ZERO,
            TransactionType::ValuationUpdate | TransactionType::Split => false,
        };
        if violation {
            return Err(Error::Ledger(LedgerError::SignConventionViolation(format!(
                "Amount {} is not allowed for transaction type {}",
                amount,
                self.as_db_str()
            ))));
        }
        Ok(())
    }
}

/// Domain model representing one immutable ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub id: String,
    pub asset_id: String,
    pub owner_id: String,
    pub date: NaiveDate,
    pub transaction_type: TransactionType,
    /// Signed delta: positive is value-increasing, negative value-decreasing.
    pub amount: Decimal,
    pub quantity: Option<Decimal>,
    pub price_per_unit: Option<Decimal>,
    /// Authoritative post-event total value of the asset.
    pub value_after_transaction: Decimal,
    pub currency: String,
    pub notes: Option<String>,
    /// Set for synthesized scheduled re-valuations; used for dedupe.
    pub idempotency_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Chronological ordering key: by date, then insertion order for
    /// same-date ties. Used to find the authoritative last entry.
    pub fn ordering_key(&self) -> (NaiveDate, DateTime<Utc>, &str) {
        (self.date, self.created_at, self.id.as_str())
    }
}

/// Returns the chronologically last entry, resolving same-date ties by
/// insertion order.
pub fn last_entry(entries: &[LedgerEntry]) -> Option<&LedgerEntry> {
    entries.iter().max_by_key(|e| e.ordering_key())
}

/// Input model for recording a new ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLedgerEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub asset_id: String,
    pub date: NaiveDate,
    pub transaction_type: TransactionType,
    /// Signed delta for most types; for a valuation update submitted without
    /// `value_after_transaction`, this carries the new absolute value and the
    /// coordinator rewrites it to the signed delta before persisting.
    pub amount: Decimal,
    pub quantity: Option<Decimal>,
    pub price_per_unit: Option<Decimal>,
    /// Authoritative post-event value; computed by the coordinator when absent.
    pub value_after_transaction: Option<Decimal>,
    pub currency: Option<String>,
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
}

impl NewLedgerEntry {
    /// Validates structural fields and the amount sign convention.
    pub fn validate(&self) -> Result<()> {
        if self.asset_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "assetId".to_string(),
            )));
        }
        self.transaction_type.validate_amount_sign(self.amount)?;
        if let Some(qty) = self.quantity {
            if qty < Decimal::ZERO {
                return Err(Error::Validation(ValidationError::InvalidInput(
                    "Quantity cannot be negative".to_string(),
                )));
            }
        }
        Ok(())
    }
}

/// Input model for editing an existing ledger entry.
///
/// Edits are allowed but must re-trigger reconciliation of the owning
/// asset's projection; the coordinator handles that.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntryUpdate {
    pub id: String,
    pub asset_id: String,
    pub date: NaiveDate,
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub quantity: Option<Decimal>,
    pub price_per_unit: Option<Decimal>,
    pub value_after_transaction: Option<Decimal>,
    pub notes: Option<String>,
}

impl LedgerEntryUpdate {
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "id".to_string(),
            )));
        }
        self.transaction_type.validate_amount_sign(self.amount)?;
        Ok(())
    }
}

/// Projection write accompanying a ledger mutation.
///
/// The storage layer applies this together with the ledger write under one
/// transaction, after checking `expected_version` against the asset row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionUpdate {
    pub asset_id: String,
    pub owner_id: String,
    pub current_value: Decimal,
    pub last_value_update_date: NaiveDate,
    /// When set, also advances the scheduled re-valuation cursor.
    pub next_valuation_date: Option<NaiveDate>,
    /// Asset version observed when the update was computed.
    pub expected_version: i64,
}
