//! Metrics engine: derives comparison/performance figures from an asset
//! projection plus its ledger, on read. Never mutates state.

use std::sync::Arc;

use chrono::{Months, NaiveDate};
use log::debug;
use rust_decimal::Decimal;

use super::metrics_model::{AssetMetrics, HistoryPoint, HistoryRange};
use crate::assets::{Asset, AssetRepositoryTrait};
use crate::errors::{Result, ValuationError};
use crate::ledger::{LedgerEntry, LedgerRepositoryTrait};
use crate::valuation::{annualized_return, policy_value, years_between};

const HUNDRED: Decimal = rust_decimal_macros::dec!(100);

/// Computes display metrics for an asset as of the given date.
///
/// The annualized return is surfaced only once the asset is at least one
/// year old; below that it is omitted entirely.
pub fn compute_metrics(asset: &Asset, as_of: NaiveDate) -> Result<AssetMetrics> {
    let absolute_change = asset.current_value - asset.initial_value;
    let percentage_change = if asset.initial_value.is_zero() {
        Decimal::ZERO
    } else {
        absolute_change / asset.initial_value * HUNDRED
    };

    let asset_age_years = years_between(asset.acquisition_date, as_of)?;
    let annualized = if asset_age_years >= Decimal::ONE {
        Some(annualized_return(
            asset.initial_value,
            asset.current_value,
            asset_age_years,
        ))
    } else {
        None
    };

    Ok(AssetMetrics {
        asset_id: asset.id.clone(),
        currency: asset.currency.clone(),
        initial_value: asset.initial_value,
        current_value: asset.current_value,
        absolute_change,
        percentage_change,
        asset_age_years,
        annualized_return: annualized,
    })
}

/// Builds the `(date, value)` series for charting from the ordered ledger,
/// inclusive of the acquisition point, filtered by the rolling window.
pub fn build_history(
    asset: &Asset,
    entries: &[LedgerEntry],
    range: HistoryRange,
    as_of: NaiveDate,
) -> Vec<HistoryPoint> {
    let mut points: Vec<HistoryPoint> = Vec::with_capacity(entries.len() + 1);

    // The acquisition point anchors the series unless an entry already
    // covers that date.
    if !entries.iter().any(|e| e.date == asset.acquisition_date) {
        points.push(HistoryPoint {
            date: asset.acquisition_date,
            value: asset.initial_value,
        });
    }

    let mut ordered: Vec<&LedgerEntry> = entries.iter().collect();
    ordered.sort_by_key(|e| e.ordering_key());
    points.extend(ordered.iter().map(|e| HistoryPoint {
        date: e.date,
        value: e.value_after_transaction,
    }));

    if let Some(months) = range.months() {
        let cutoff = as_of
            .checked_sub_months(Months::new(months))
            .unwrap_or(NaiveDate::MIN);
        points.retain(|p| p.date >= cutoff);
    }

    points
}

/// Computes the value the calculator would produce for a hypothetical future
/// date under the asset's current policy. Pure preview: no state is touched.
pub fn preview_value(asset: &Asset, future_date: NaiveDate) -> Result<Decimal> {
    if future_date < asset.acquisition_date {
        return Err(ValuationError::InvalidParameter(format!(
            "Preview date {} precedes acquisition date {}",
            future_date, asset.acquisition_date
        ))
        .into());
    }
    if asset.valuation_policy.is_none() {
        // No policy: the value only moves on explicit ledger entries.
        return Ok(asset.current_value);
    }
    let years_held = years_between(asset.acquisition_date, future_date)?;
    policy_value(&asset.valuation_policy, asset.initial_value, years_held)
}

/// Trait defining the contract for metrics operations.
pub trait MetricsServiceTrait: Send + Sync {
    fn get_metrics(&self, owner_id: &str, asset_id: &str, as_of: NaiveDate)
        -> Result<AssetMetrics>;
    fn get_history(
        &self,
        owner_id: &str,
        asset_id: &str,
        range: HistoryRange,
        as_of: NaiveDate,
    ) -> Result<Vec<HistoryPoint>>;
    fn preview_valuation(
        &self,
        owner_id: &str,
        asset_id: &str,
        future_date: NaiveDate,
    ) -> Result<Decimal>;
}

/// Service materializing display-ready metrics from the repositories.
pub struct MetricsService {
    asset_repository: Arc<dyn AssetRepositoryTrait>,
    ledger_repository: Arc<dyn LedgerRepositoryTrait>,
}

impl MetricsService {
    /// Creates a new MetricsService instance with injected dependencies.
    pub fn new(
        asset_repository: Arc<dyn AssetRepositoryTrait>,
        ledger_repository: Arc<dyn LedgerRepositoryTrait>,
    ) -> Self {
        Self {
            asset_repository,
            ledger_repository,
        }
    }
}

impl MetricsServiceTrait for MetricsService {
    fn get_metrics(
        &self,
        owner_id: &str,
        asset_id: &str,
        as_of: NaiveDate,
    ) -> Result<AssetMetrics> {
        let asset = self.asset_repository.get_by_id(owner_id, asset_id)?;
        compute_metrics(&asset, as_of)
    }

    fn get_history(
        &self,
        owner_id: &str,
        asset_id: &str,
        range: HistoryRange,
        as_of: NaiveDate,
    ) -> Result<Vec<HistoryPoint>> {
        let asset = self.asset_repository.get_by_id(owner_id, asset_id)?;
        let entries = self.ledger_repository.list_for_asset(owner_id, asset_id)?;
        debug!(
            "Building history for asset {} over {:?} ({} entries)",
            asset_id,
            range,
            entries.len()
        );
        Ok(build_history(&asset, &entries, range, as_of))
    }

    fn preview_valuation(
        &self,
        owner_id: &str,
        asset_id: &str,
        future_date: NaiveDate,
    ) -> Result<Decimal> {
        let asset = self.asset_repository.get_by_id(owner_id, asset_id)?;
        preview_value(&asset, future_date)
    }
}
