//! Parsing helpers for TEXT-backed columns.
//!
//! Decimals, dates, and timestamps are stored as TEXT in SQLite. Reads are
//! tolerant: a malformed value is logged and replaced with a sensible
//! fallback instead of failing the whole row.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Storage format for `NaiveDate` columns. Lexicographic order matches
/// chronological order, so date columns can be compared in SQL directly.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a TEXT decimal, falling back through f64 for scientific notation.
pub fn parse_decimal_tolerant(value_str: &str, field_name: &str) -> Decimal {
    match Decimal::from_str(value_str) {
        Ok(d) => d,
        Err(e_decimal) => match f64::from_str(value_str).ok().and_then(Decimal::from_f64) {
            Some(dec_val) => dec_val,
            None => {
                log::error!(
                    "Failed to parse {} '{}' as Decimal ({}); falling back to ZERO",
                    field_name,
                    value_str,
                    e_decimal
                );
                Decimal::ZERO
            }
        },
    }
}

/// Parses a TEXT date column in `%Y-%m-%d` format.
pub fn parse_date_tolerant(value_str: &str, field_name: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value_str, DATE_FORMAT).unwrap_or_else(|e| {
        log::error!("Failed to parse {} '{}': {}", field_name, value_str, e);
        NaiveDate::default()
    })
}

/// Parses an RFC 3339 timestamp column.
pub fn parse_datetime_tolerant(value_str: &str, field_name: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|e| {
            log::error!("Failed to parse {} '{}': {}", field_name, value_str, e);
            Utc::now()
        })
}
