//! Metrics domain models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Display-ready performance figures for one asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetMetrics {
    pub asset_id: String,
    pub currency: String,
    pub initial_value: Decimal,
    pub current_value: Decimal,
    pub absolute_change: Decimal,
    pub percentage_change: Decimal,
    pub asset_age_years: Decimal,
    /// None (omitted, not zero) while the asset is younger than one year —
    /// the figure is statistically unstable below one holding year.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annualized_return: Option<Decimal>,
}

/// One point of the value history used for charting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPoint {
    pub date: NaiveDate,
    pub value: Decimal,
}

/// Rolling window applied to the history series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HistoryRange {
    OneMonth,
    ThreeMonths,
    SixMonths,
    TwelveMonths,
    #[default]
    All,
}

impl HistoryRange {
    /// Window size in months; `None` means the full history.
    pub const fn months(&self) -> Option<u32> {
        match self {
            HistoryRange::OneMonth => Some(1),
            HistoryRange::ThreeMonths => Some(3),
            HistoryRange::SixMonths => Some(6),
            HistoryRange::TwelveMonths => Some(12),
            HistoryRange::All => None,
        }
    }
}
