//! Reconciliation coordinator: the write path of the ledger.
//!
//! Accepts new/edited/deleted ledger entries and keeps the asset projection
//! consistent with the chronologically last surviving entry. The ledger
//! write and the projection write are handed to the repository as one atomic
//! commit; a failed commit rolls back to the prior committed value.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use log::{debug, warn};
use rust_decimal::Decimal;

use super::reconciliation_model::{ReconcileReceipt, ReconcileState};
use super::reconciliation_traits::ReconciliationServiceTrait;
use crate::assets::{Asset, AssetRepositoryTrait, ValuationMethod};
use crate::errors::{Error, LedgerError, Result};
use crate::ledger::{
    last_entry, revaluation_idempotency_key, LedgerEntry, LedgerEntryUpdate,
    LedgerRepositoryTrait, NewLedgerEntry, ProjectionUpdate, TransactionType,
};
use crate::valuation::{policy_value, years_between};

/// Service coordinating ledger writes with projection updates.
pub struct ReconciliationService {
    asset_repository: Arc<dyn AssetRepositoryTrait>,
    ledger_repository: Arc<dyn LedgerRepositoryTrait>,
}

impl ReconciliationService {
    /// Creates a new ReconciliationService instance with injected dependencies.
    pub fn new(
        asset_repository: Arc<dyn AssetRepositoryTrait>,
        ledger_repository: Arc<dyn LedgerRepositoryTrait>,
    ) -> Self {
        Self {
            asset_repository,
            ledger_repository,
        }
    }

    /// Resolves the amount/value pair for a new entry.
    ///
    /// A valuation update submitted without `value_after_transaction` carries
    /// the new absolute value in `amount`; it is rewritten to the signed
    /// delta so the ledger keeps a uniform sign convention.
    fn resolve_entry_values(
        asset: &Asset,
        entry: &NewLedgerEntry,
    ) -> Result<(Decimal, Decimal)> {
        match (entry.transaction_type, entry.value_after_transaction) {
            (TransactionType::ValuationUpdate, None) => {
                let new_value = entry.amount;
                if new_value < Decimal::ZERO {
                    return Err(Error::Ledger(LedgerError::InvalidData(
                        "Valuation update value cannot be negative".to_string(),
                    )));
                }
                Ok((new_value - asset.current_value, new_value))
            }
            (_, Some(value_after)) => Ok((entry.amount, value_after)),
            (_, None) => Ok((entry.amount, asset.current_value + entry.amount)),
        }
    }

    /// Builds the projection update that keeps the asset consistent with the
    /// chronologically last entry once `candidate` joins the ledger.
    ///
    /// A backdated entry must not clobber a later one: the projection then
    /// stays on the existing last entry (version still advances).
    fn projection_for_append(
        asset: &Asset,
        existing: &[LedgerEntry],
        candidate_date: NaiveDate,
        candidate_value: Decimal,
        next_valuation_date: Option<NaiveDate>,
    ) -> ProjectionUpdate {
        let (current_value, last_date) = match last_entry(existing) {
            // Same-date ties resolve by insertion order, so the new entry
            // wins unless a strictly later one exists.
            Some(last) if last.date > candidate_date => {
                warn!(
                    "Backdated entry for asset {}: {} precedes last entry {}",
                    asset.id, candidate_date, last.date
                );
                (last.value_after_transaction, last.date)
            }
            _ => (candidate_value, candidate_date),
        };

        ProjectionUpdate {
            asset_id: asset.id.clone(),
            owner_id: asset.owner_id.clone(),
            current_value,
            last_value_update_date: last_date,
            next_valuation_date,
            expected_version: asset.version,
        }
    }

    /// Projection derived from the surviving ledger after an edit or delete.
    /// Falls back to the acquisition point when no entries remain.
    fn projection_from_survivors(asset: &Asset, survivors: &[LedgerEntry]) -> ProjectionUpdate {
        let (current_value, last_date) = match last_entry(survivors) {
            Some(last) => (last.value_after_transaction, last.date),
            None => (asset.initial_value, asset.acquisition_date),
        };
        ProjectionUpdate {
            asset_id: asset.id.clone(),
            owner_id: asset.owner_id.clone(),
            current_value,
            last_value_update_date: last_date,
            next_valuation_date: None,
            expected_version: asset.version,
        }
    }

    async fn commit_receipt(
        &self,
        owner_id: &str,
        asset_id: &str,
        entry: LedgerEntry,
    ) -> Result<ReconcileReceipt> {
        let asset = self.asset_repository.get_by_id(owner_id, asset_id)?;
        Ok(ReconcileReceipt {
            state: ReconcileState::Committed,
            entry,
            asset,
        })
    }
}

#[async_trait]
impl ReconciliationServiceTrait for ReconciliationService {
    async fn record_transaction(
        &self,
        owner_id: &str,
        entry: NewLedgerEntry,
    ) -> Result<ReconcileReceipt> {
        entry.validate()?;
        let asset = self.asset_repository.get_by_id(owner_id, &entry.asset_id)?;
        let (amount, value_after) = Self::resolve_entry_values(&asset, &entry)?;

        let existing = self
            .ledger_repository
            .list_for_asset(owner_id, &asset.id)?;
        let projection =
            Self::projection_for_append(&asset, &existing, entry.date, value_after, None);

        let finalized = NewLedgerEntry {
            amount,
            value_after_transaction: Some(value_after),
            currency: entry.currency.clone().or(Some(asset.currency.clone())),
            ..entry
        };

        debug!(
            "Recording {} for asset {}: amount {}, value after {}",
            finalized.transaction_type.as_db_str(),
            asset.id,
            amount,
            value_after
        );

        match self
            .ledger_repository
            .append_with_projection(owner_id, finalized, projection)
            .await
        {
            Ok(persisted) => self.commit_receipt(owner_id, &asset.id, persisted).await,
            Err(err) => {
                warn!(
                    "Reconciliation {:?} for asset {}: {}; prior committed state retained",
                    ReconcileState::Failed,
                    asset.id,
                    err
                );
                Err(err)
            }
        }
    }

    async fn edit_transaction(
        &self,
        owner_id: &str,
        update: LedgerEntryUpdate,
    ) -> Result<ReconcileReceipt> {
        update.validate()?;
        let existing = self.ledger_repository.get_entry(owner_id, &update.id)?;
        if existing.asset_id != update.asset_id {
            return Err(Error::Ledger(LedgerError::InvalidData(
                "Ledger entries cannot move between assets".to_string(),
            )));
        }
        let asset = self.asset_repository.get_by_id(owner_id, &existing.asset_id)?;

        // Simulate the edit to find the chronologically last survivor; the
        // projection is re-derived from the ledger, never decremented.
        let entries = self
            .ledger_repository
            .list_for_asset(owner_id, &asset.id)?;
        let mut simulated = entries.clone();
        let value_after = match update.value_after_transaction {
            Some(v) => v,
            None => {
                // Derive from the value preceding the edited entry in its
                // new chronological position.
                let edited_key = (update.date, existing.created_at, existing.id.as_str());
                let prev_value = simulated
                    .iter()
                    .filter(|e| e.id != existing.id && e.ordering_key() < edited_key)
                    .max_by_key(|e| e.ordering_key())
                    .map(|e| e.value_after_transaction)
                    .unwrap_or(asset.initial_value);
                prev_value + update.amount
            }
        };
        for entry in simulated.iter_mut() {
            if entry.id == update.id {
                entry.date = update.date;
                entry.transaction_type = update.transaction_type;
                entry.amount = update.amount;
                entry.value_after_transaction = value_after;
            }
        }
        let projection = Self::projection_from_survivors(&asset, &simulated);

        let finalized = LedgerEntryUpdate {
            value_after_transaction: Some(value_after),
            ..update
        };

        debug!(
            "Editing ledger entry {} on asset {}; projection -> {}",
            finalized.id, asset.id, projection.current_value
        );

        let persisted = self
            .ledger_repository
            .replace_with_projection(owner_id, finalized, projection)
            .await?;
        self.commit_receipt(owner_id, &asset.id, persisted).await
    }

    async fn delete_transaction(
        &self,
        owner_id: &str,
        entry_id: &str,
    ) -> Result<ReconcileReceipt> {
        let existing = self.ledger_repository.get_entry(owner_id, entry_id)?;
        let asset = self.asset_repository.get_by_id(owner_id, &existing.asset_id)?;

        let entries = self
            .ledger_repository
            .list_for_asset(owner_id, &asset.id)?;
        let survivors: Vec<LedgerEntry> = entries
            .into_iter()
            .filter(|e| e.id != entry_id)
            .collect();
        let projection = Self::projection_from_survivors(&asset, &survivors);

        debug!(
            "Deleting ledger entry {} on asset {}; projection -> {}",
            entry_id, asset.id, projection.current_value
        );

        let deleted = self
            .ledger_repository
            .delete_with_projection(owner_id, entry_id, projection)
            .await?;
        self.commit_receipt(owner_id, &asset.id, deleted).await
    }

    async fn run_scheduled_revaluation(
        &self,
        owner_id: &str,
        asset_id: &str,
        as_of: NaiveDate,
    ) -> Result<ReconcileReceipt> {
        let asset = self.asset_repository.get_by_id(owner_id, asset_id)?;
        if asset.valuation_method != ValuationMethod::Scheduled {
            return Err(Error::Ledger(LedgerError::InvalidData(format!(
                "Asset {} is not on a scheduled valuation method",
                asset_id
            ))));
        }

        let key = revaluation_idempotency_key(asset_id, as_of);
        if let Some(existing) = self
            .ledger_repository
            .find_by_idempotency_key(owner_id, &key)?
        {
            debug!(
                "Scheduled re-valuation for asset {} on {} already applied",
                asset_id, as_of
            );
            return self.commit_receipt(owner_id, asset_id, existing).await;
        }

        let years_held = years_between(asset.acquisition_date, as_of)?;
        let new_value = policy_value(&asset.valuation_policy, asset.initial_value, years_held)?
            .round_dp(2);

        let entry = NewLedgerEntry {
            id: None,
            asset_id: asset_id.to_string(),
            date: as_of,
            transaction_type: TransactionType::ValuationUpdate,
            amount: new_value - asset.current_value,
            quantity: None,
            price_per_unit: None,
            value_after_transaction: Some(new_value),
            currency: Some(asset.currency.clone()),
            notes: Some("Scheduled re-valuation".to_string()),
            idempotency_key: Some(key),
        };

        let next_due = as_of + Duration::days(asset.valuation_cadence_days);
        let existing_entries = self
            .ledger_repository
            .list_for_asset(owner_id, asset_id)?;
        let projection = Self::projection_for_append(
            &asset,
            &existing_entries,
            as_of,
            new_value,
            Some(next_due),
        );

        debug!(
            "Scheduled re-valuation for asset {} on {}: {} -> {}, next due {}",
            asset_id, as_of, asset.current_value, new_value, next_due
        );

        let persisted = self
            .ledger_repository
            .append_with_projection(owner_id, entry, projection)
            .await?;
        self.commit_receipt(owner_id, asset_id, persisted).await
    }

    async fn run_due_revaluations(
        &self,
        owner_id: &str,
        as_of: NaiveDate,
    ) -> Result<Vec<ReconcileReceipt>> {
        let due = self.asset_repository.list_scheduled_due(owner_id, as_of)?;
        let mut receipts = Vec::with_capacity(due.len());
        for asset in due {
            match self
                .run_scheduled_revaluation(owner_id, &asset.id, as_of)
                .await
            {
                Ok(receipt) => receipts.push(receipt),
                // One failing asset must not block the rest of the sweep;
                // the failure surfaces on its own next due date.
                Err(err) => warn!(
                    "Scheduled re-valuation failed for asset {}: {}",
                    asset.id, err
                ),
            }
        }
        Ok(receipts)
    }
}
