//! Database models for ledger entries.

use chrono::Utc;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use assetledger_core::ledger::{LedgerEntry, NewLedgerEntry, TransactionType};

use crate::utils::{parse_date_tolerant, parse_datetime_tolerant, parse_decimal_tolerant, DATE_FORMAT};

/// Database model for ledger entries.
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
#[diesel(table_name = crate::schema::ledger_entries)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct LedgerEntryDB {
    pub id: String,
    pub asset_id: String,
    pub owner_id: String,
    pub date: String,
    pub transaction_type: String,
    pub amount: String,
    pub quantity: Option<String>,
    pub price_per_unit: Option<String>,
    pub value_after_transaction: String,
    pub currency: String,
    pub notes: Option<String>,
    pub idempotency_key: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl LedgerEntryDB {
    /// Builds the row for a new entry. The coordinator has already resolved
    /// `amount` and `value_after_transaction`; a missing post-value here is a
    /// caller bug and is stored as zero by the tolerant read path.
    pub fn from_new(owner_id: &str, new: NewLedgerEntry) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            id: new.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            asset_id: new.asset_id,
            owner_id: owner_id.to_string(),
            date: new.date.format(DATE_FORMAT).to_string(),
            transaction_type: new.transaction_type.as_db_str().to_string(),
            amount: new.amount.to_string(),
            quantity: new.quantity.map(|q| q.to_string()),
            price_per_unit: new.price_per_unit.map(|p| p.to_string()),
            value_after_transaction: new
                .value_after_transaction
                .unwrap_or_default()
                .to_string(),
            currency: new.currency.unwrap_or_default(),
            notes: new.notes,
            idempotency_key: new.idempotency_key,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

impl From<LedgerEntryDB> for LedgerEntry {
    fn from(db: LedgerEntryDB) -> Self {
        Self {
            transaction_type: TransactionType::from_db_str(&db.transaction_type)
                .unwrap_or_else(|e| {
                    log::error!("Ledger entry {}: {}", db.id, e);
                    TransactionType::ValuationUpdate
                }),
            date: parse_date_tolerant(&db.date, "date"),
            amount: parse_decimal_tolerant(&db.amount, "amount"),
            quantity: db.quantity.as_deref().map(|s| parse_decimal_tolerant(s, "quantity")),
            price_per_unit: db
                .price_per_unit
                .as_deref()
                .map(|s| parse_decimal_tolerant(s, "price_per_unit")),
            value_after_transaction: parse_decimal_tolerant(
                &db.value_after_transaction,
                "value_after_transaction",
            ),
            currency: db.currency,
            notes: db.notes,
            idempotency_key: db.idempotency_key,
            created_at: parse_datetime_tolerant(&db.created_at, "created_at"),
            updated_at: parse_datetime_tolerant(&db.updated_at, "updated_at"),
            asset_id: db.asset_id,
            owner_id: db.owner_id,
            id: db.id,
        }
    }
}
