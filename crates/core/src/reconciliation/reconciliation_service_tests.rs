use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use super::reconciliation_model::ReconcileState;
use super::reconciliation_service::ReconciliationService;
use super::reconciliation_traits::ReconciliationServiceTrait;
use crate::assets::{
    AppreciationType, Asset, AssetRepositoryTrait, AssetUpdate, NewAsset, ValuationMethod,
    ValuationPolicy,
};
use crate::errors::{Error, LedgerError, Result};
use crate::ledger::{
    LedgerEntry, LedgerEntryUpdate, LedgerRepositoryTrait, NewLedgerEntry, ProjectionUpdate,
    TransactionType,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// --- Shared in-memory store backing both mock repositories ---

struct MockStore {
    assets: Mutex<Vec<Asset>>,
    entries: Mutex<Vec<LedgerEntry>>,
    seq: AtomicI64,
    // When set, bumps the asset version right before the next projection
    // check, simulating a concurrent writer landing first.
    race_next_write: AtomicBool,
}

impl MockStore {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            assets: Mutex::new(Vec::new()),
            entries: Mutex::new(Vec::new()),
            seq: AtomicI64::new(1),
            race_next_write: AtomicBool::new(false),
        })
    }

    fn add_asset(&self, asset: Asset) {
        self.assets.lock().unwrap().push(asset);
    }

    fn add_entry(&self, entry: LedgerEntry) {
        self.entries.lock().unwrap().push(entry);
    }

    fn asset(&self, asset_id: &str) -> Asset {
        self.assets
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == asset_id)
            .cloned()
            .unwrap()
    }

    fn entry_count(&self, asset_id: &str) -> usize {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.asset_id == asset_id)
            .count()
    }

    fn next_timestamp(&self) -> chrono::DateTime<Utc> {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        Utc.timestamp_opt(1_700_000_000 + seq, 0).unwrap()
    }

    fn apply_projection(&self, projection: &ProjectionUpdate) -> Result<()> {
        let mut assets = self.assets.lock().unwrap();
        let asset = assets
            .iter_mut()
            .find(|a| a.id == projection.asset_id && a.owner_id == projection.owner_id)
            .ok_or_else(|| {
                Error::Ledger(LedgerError::NotFound(projection.asset_id.clone()))
            })?;
        if self.race_next_write.swap(false, Ordering::SeqCst) {
            asset.version += 1;
        }
        if asset.version != projection.expected_version {
            return Err(Error::Ledger(LedgerError::StaleProjection {
                asset_id: asset.id.clone(),
                expected: projection.expected_version,
                found: asset.version,
            }));
        }
        asset.current_value = projection.current_value;
        asset.last_value_update_date = projection.last_value_update_date;
        if let Some(next) = projection.next_valuation_date {
            asset.next_valuation_date = Some(next);
        }
        asset.version += 1;
        Ok(())
    }
}

// --- Mock AssetRepository ---

#[derive(Clone)]
struct MockAssetRepository {
    store: Arc<MockStore>,
}

#[async_trait]
impl AssetRepositoryTrait for MockAssetRepository {
    fn get_by_id(&self, owner_id: &str, asset_id: &str) -> Result<Asset> {
        self.store
            .assets
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == asset_id && a.owner_id == owner_id)
            .cloned()
            .ok_or_else(|| Error::Ledger(LedgerError::NotFound(asset_id.to_string())))
    }

    fn list(&self, owner_id: &str) -> Result<Vec<Asset>> {
        Ok(self
            .store
            .assets
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.owner_id == owner_id)
            .cloned()
            .collect())
    }

    fn list_scheduled_due(&self, owner_id: &str, as_of: NaiveDate) -> Result<Vec<Asset>> {
        Ok(self
            .store
            .assets
            .lock()
            .unwrap()
            .iter()
            .filter(|a| {
                a.owner_id == owner_id
                    && a.is_active
                    && a.valuation_method == ValuationMethod::Scheduled
                    && a.next_valuation_date.map_or(false, |d| d <= as_of)
            })
            .cloned()
            .collect())
    }

    async fn create(&self, _owner_id: &str, _new_asset: NewAsset) -> Result<Asset> {
        unimplemented!()
    }

    async fn update_details(&self, _owner_id: &str, _update: AssetUpdate) -> Result<Asset> {
        unimplemented!()
    }

    async fn set_valuation_policy(
        &self,
        _owner_id: &str,
        _asset_id: &str,
        _policy: ValuationPolicy,
    ) -> Result<Asset> {
        unimplemented!()
    }

    async fn retire(
        &self,
        _owner_id: &str,
        _asset_id: &str,
        _sold_date: NaiveDate,
        _sale_value: Option<Decimal>,
    ) -> Result<Asset> {
        unimplemented!()
    }
}

// --- Mock LedgerRepository ---

#[derive(Clone)]
struct MockLedgerRepository {
    store: Arc<MockStore>,
}

#[async_trait]
impl LedgerRepositoryTrait for MockLedgerRepository {
    fn get_entry(&self, owner_id: &str, entry_id: &str) -> Result<LedgerEntry> {
        self.store
            .entries
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.id == entry_id && e.owner_id == owner_id)
            .cloned()
            .ok_or_else(|| Error::Ledger(LedgerError::NotFound(entry_id.to_string())))
    }

    fn list_for_asset(&self, owner_id: &str, asset_id: &str) -> Result<Vec<LedgerEntry>> {
        let mut entries: Vec<LedgerEntry> = self
            .store
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.asset_id == asset_id && e.owner_id == owner_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| a.ordering_key().cmp(&b.ordering_key()));
        Ok(entries)
    }

    fn list_for_owner(&self, _owner_id: &str) -> Result<Vec<LedgerEntry>> {
        unimplemented!()
    }

    fn find_by_idempotency_key(&self, owner_id: &str, key: &str) -> Result<Option<LedgerEntry>> {
        Ok(self
            .store
            .entries
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.owner_id == owner_id && e.idempotency_key.as_deref() == Some(key))
            .cloned())
    }

    async fn append_with_projection(
        &self,
        owner_id: &str,
        entry: NewLedgerEntry,
        projection: ProjectionUpdate,
    ) -> Result<LedgerEntry> {
        self.store.apply_projection(&projection)?;
        let now = self.store.next_timestamp();
        let persisted = LedgerEntry {
            id: entry.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            asset_id: entry.asset_id,
            owner_id: owner_id.to_string(),
            date: entry.date,
            transaction_type: entry.transaction_type,
            amount: entry.amount,
            quantity: entry.quantity,
            price_per_unit: entry.price_per_unit,
            value_after_transaction: entry.value_after_transaction.unwrap_or_default(),
            currency: entry.currency.unwrap_or_else(|| "USD".to_string()),
            notes: entry.notes,
            idempotency_key: entry.idempotency_key,
            created_at: now,
            updated_at: now,
        };
        self.store.add_entry(persisted.clone());
        Ok(persisted)
    }

    async fn replace_with_projection(
        &self,
        owner_id: &str,
        update: LedgerEntryUpdate,
        projection: ProjectionUpdate,
    ) -> Result<LedgerEntry> {
        self.store.apply_projection(&projection)?;
        let mut entries = self.store.entries.lock().unwrap();
        let entry = entries
            .iter_mut()
            .find(|e| e.id == update.id && e.owner_id == owner_id)
            .ok_or_else(|| Error::Ledger(LedgerError::NotFound(update.id.clone())))?;
        entry.date = update.date;
        entry.transaction_type = update.transaction_type;
        entry.amount = update.amount;
        if let Some(value) = update.value_after_transaction {
            entry.value_after_transaction = value;
        }
        entry.quantity = update.quantity;
        entry.price_per_unit = update.price_per_unit;
        entry.notes = update.notes;
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    async fn delete_with_projection(
        &self,
        owner_id: &str,
        entry_id: &str,
        projection: ProjectionUpdate,
    ) -> Result<LedgerEntry> {
        self.store.apply_projection(&projection)?;
        let mut entries = self.store.entries.lock().unwrap();
        let pos = entries
            .iter()
            .position(|e| e.id == entry_id && e.owner_id == owner_id)
            .ok_or_else(|| Error::Ledger(LedgerError::NotFound(entry_id.to_string())))?;
        Ok(entries.remove(pos))
    }
}

// --- Fixtures ---

const OWNER: &str = "owner-1";

fn manual_asset(id: &str, initial: Decimal) -> Asset {
    Asset {
        id: id.to_string(),
        owner_id: OWNER.to_string(),
        name: "Test asset".to_string(),
        currency: "USD".to_string(),
        initial_value: initial,
        current_value: initial,
        acquisition_date: date(2023, 1, 1),
        last_value_update_date: date(2023, 1, 1),
        valuation_method: ValuationMethod::Manual,
        is_active: true,
        version: 1,
        ..Default::default()
    }
}

fn scheduled_asset(id: &str, initial: Decimal) -> Asset {
    Asset {
        valuation_method: ValuationMethod::Scheduled,
        valuation_policy: ValuationPolicy::appreciating(AppreciationType::Compound, dec!(8)),
        next_valuation_date: Some(date(2024, 1, 1)),
        valuation_cadence_days: 30,
        ..manual_asset(id, initial)
    }
}

fn new_entry(asset_id: &str, d: NaiveDate, tx: TransactionType, amount: Decimal) -> NewLedgerEntry {
    NewLedgerEntry {
        id: None,
        asset_id: asset_id.to_string(),
        date: d,
        transaction_type: tx,
        amount,
        quantity: None,
        price_per_unit: None,
        value_after_transaction: None,
        currency: None,
        notes: None,
        idempotency_key: None,
    }
}

fn setup() -> (Arc<MockStore>, ReconciliationService) {
    let store = MockStore::new();
    let service = ReconciliationService::new(
        Arc::new(MockAssetRepository {
            store: store.clone(),
        }),
        Arc::new(MockLedgerRepository {
            store: store.clone(),
        }),
    );
    (store, service)
}

// --- Tests ---

#[tokio::test]
async fn test_valuation_update_rewrites_amount_to_delta() {
    let (store, service) = setup();
    store.add_asset(manual_asset("a1", dec!(10000)));

    // User submits the new absolute value; the ledger stores the delta.
    let receipt = service
        .record_transaction(
            OWNER,
            new_entry("a1", date(2023, 6, 1), TransactionType::ValuationUpdate, dec!(10500)),
        )
        .await
        .unwrap();

    assert_eq!(receipt.state, ReconcileState::Committed);
    assert_eq!(receipt.entry.amount, dec!(500));
    assert_eq!(receipt.entry.value_after_transaction, dec!(10500));
    assert_eq!(receipt.asset.current_value, dec!(10500));
    assert_eq!(receipt.asset.last_value_update_date, date(2023, 6, 1));
    assert_eq!(receipt.asset.version, 2);
}

#[tokio::test]
async fn test_delta_entry_derives_value_after() {
    let (store, service) = setup();
    store.add_asset(manual_asset("a1", dec!(10000)));

    let receipt = service
        .record_transaction(
            OWNER,
            new_entry("a1", date(2023, 3, 1), TransactionType::Contribution, dec!(250)),
        )
        .await
        .unwrap();

    assert_eq!(receipt.entry.value_after_transaction, dec!(10250));
    assert_eq!(receipt.asset.current_value, dec!(10250));
    // Currency defaults from the asset when the caller omits it.
    assert_eq!(receipt.entry.currency, "USD");
}

#[tokio::test]
async fn test_sign_convention_rejected_before_any_write() {
    let (store, service) = setup();
    store.add_asset(manual_asset("a1", dec!(10000)));

    let result = service
        .record_transaction(
            OWNER,
            new_entry("a1", date(2023, 3, 1), TransactionType::Sale, dec!(500)),
        )
        .await;

    assert!(matches!(
        result,
        Err(Error::Ledger(LedgerError::SignConventionViolation(_)))
    ));
    assert_eq!(store.entry_count("a1"), 0);
    assert_eq!(store.asset("a1").current_value, dec!(10000));
    assert_eq!(store.asset("a1").version, 1);
}

#[tokio::test]
async fn test_negative_valuation_update_rejected() {
    let (store, service) = setup();
    store.add_asset(manual_asset("a1", dec!(10000)));

    let result = service
        .record_transaction(
            OWNER,
            new_entry("a1", date(2023, 3, 1), TransactionType::ValuationUpdate, dec!(-1)),
        )
        .await;

    assert!(matches!(
        result,
        Err(Error::Ledger(LedgerError::InvalidData(_)))
    ));
    assert_eq!(store.entry_count("a1"), 0);
}

#[tokio::test]
async fn test_backdated_entry_does_not_clobber_projection() {
    let (store, service) = setup();
    store.add_asset(manual_asset("a1", dec!(10000)));

    service
        .record_transaction(
            OWNER,
            new_entry("a1", date(2023, 9, 1), TransactionType::ValuationUpdate, dec!(12000)),
        )
        .await
        .unwrap();

    // Backdated dividend: recorded, but the projection stays on the later
    // valuation update.
    let receipt = service
        .record_transaction(
            OWNER,
            new_entry("a1", date(2023, 2, 1), TransactionType::Dividend, dec!(100)),
        )
        .await
        .unwrap();

    assert_eq!(store.entry_count("a1"), 2);
    assert_eq!(receipt.asset.current_value, dec!(12000));
    assert_eq!(receipt.asset.last_value_update_date, date(2023, 9, 1));
}

#[tokio::test]
async fn test_same_date_tie_resolved_by_insertion_order() {
    let (store, service) = setup();
    store.add_asset(manual_asset("a1", dec!(10000)));

    service
        .record_transaction(
            OWNER,
            new_entry("a1", date(2023, 6, 1), TransactionType::ValuationUpdate, dec!(11000)),
        )
        .await
        .unwrap();
    let receipt = service
        .record_transaction(
            OWNER,
            new_entry("a1", date(2023, 6, 1), TransactionType::ValuationUpdate, dec!(11500)),
        )
        .await
        .unwrap();

    // Same date: the later insertion wins.
    assert_eq!(receipt.asset.current_value, dec!(11500));
}

#[tokio::test]
async fn test_edit_rederives_projection_from_survivors() {
    let (store, service) = setup();
    store.add_asset(manual_asset("a1", dec!(10000)));

    let first = service
        .record_transaction(
            OWNER,
            new_entry("a1", date(2023, 6, 1), TransactionType::ValuationUpdate, dec!(11000)),
        )
        .await
        .unwrap();

    let receipt = service
        .edit_transaction(
            OWNER,
            LedgerEntryUpdate {
                id: first.entry.id.clone(),
                asset_id: "a1".to_string(),
                date: date(2023, 6, 1),
                transaction_type: TransactionType::ValuationUpdate,
                amount: dec!(1800),
                quantity: None,
                price_per_unit: None,
                value_after_transaction: Some(dec!(11800)),
                notes: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(receipt.entry.value_after_transaction, dec!(11800));
    assert_eq!(receipt.asset.current_value, dec!(11800));
}

#[tokio::test]
async fn test_edit_derives_value_from_predecessor_when_omitted() {
    let (store, service) = setup();
    store.add_asset(manual_asset("a1", dec!(10000)));

    service
        .record_transaction(
            OWNER,
            new_entry("a1", date(2023, 3, 1), TransactionType::ValuationUpdate, dec!(10400)),
        )
        .await
        .unwrap();
    let second = service
        .record_transaction(
            OWNER,
            new_entry("a1", date(2023, 6, 1), TransactionType::Contribution, dec!(100)),
        )
        .await
        .unwrap();

    // Change the contribution amount without supplying the post-value; it is
    // re-derived from the preceding entry's value.
    let receipt = service
        .edit_transaction(
            OWNER,
            LedgerEntryUpdate {
                id: second.entry.id.clone(),
                asset_id: "a1".to_string(),
                date: date(2023, 6, 1),
                transaction_type: TransactionType::Contribution,
                amount: dec!(300),
                quantity: None,
                price_per_unit: None,
                value_after_transaction: None,
                notes: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(receipt.entry.value_after_transaction, dec!(10700));
    assert_eq!(receipt.asset.current_value, dec!(10700));
}

#[tokio::test]
async fn test_edit_cannot_move_entry_between_assets() {
    let (store, service) = setup();
    store.add_asset(manual_asset("a1", dec!(10000)));
    store.add_asset(manual_asset("a2", dec!(5000)));

    let first = service
        .record_transaction(
            OWNER,
            new_entry("a1", date(2023, 6, 1), TransactionType::ValuationUpdate, dec!(11000)),
        )
        .await
        .unwrap();

    let result = service
        .edit_transaction(
            OWNER,
            LedgerEntryUpdate {
                id: first.entry.id.clone(),
                asset_id: "a2".to_string(),
                date: date(2023, 6, 1),
                transaction_type: TransactionType::ValuationUpdate,
                amount: dec!(1000),
                quantity: None,
                price_per_unit: None,
                value_after_transaction: Some(dec!(11000)),
                notes: None,
            },
        )
        .await;

    assert!(matches!(
        result,
        Err(Error::Ledger(LedgerError::InvalidData(_)))
    ));
}

#[tokio::test]
async fn test_delete_last_entry_resets_to_acquisition_point() {
    let (store, service) = setup();
    store.add_asset(manual_asset("a1", dec!(10000)));

    let receipt = service
        .record_transaction(
            OWNER,
            new_entry("a1", date(2023, 6, 1), TransactionType::ValuationUpdate, dec!(12000)),
        )
        .await
        .unwrap();
    assert_eq!(store.asset("a1").current_value, dec!(12000));

    let receipt = service
        .delete_transaction(OWNER, &receipt.entry.id)
        .await
        .unwrap();

    assert_eq!(store.entry_count("a1"), 0);
    assert_eq!(receipt.asset.current_value, dec!(10000));
    assert_eq!(receipt.asset.last_value_update_date, date(2023, 1, 1));
}

#[tokio::test]
async fn test_delete_intermediate_entry_keeps_last_survivor() {
    let (store, service) = setup();
    store.add_asset(manual_asset("a1", dec!(10000)));

    let first = service
        .record_transaction(
            OWNER,
            new_entry("a1", date(2023, 3, 1), TransactionType::ValuationUpdate, dec!(10400)),
        )
        .await
        .unwrap();
    service
        .record_transaction(
            OWNER,
            new_entry("a1", date(2023, 9, 1), TransactionType::ValuationUpdate, dec!(11200)),
        )
        .await
        .unwrap();

    let receipt = service
        .delete_transaction(OWNER, &first.entry.id)
        .await
        .unwrap();

    assert_eq!(store.entry_count("a1"), 1);
    assert_eq!(receipt.asset.current_value, dec!(11200));
    assert_eq!(receipt.asset.last_value_update_date, date(2023, 9, 1));
}

#[tokio::test]
async fn test_stale_projection_applies_neither_write() {
    let (store, service) = setup();
    store.add_asset(manual_asset("a1", dec!(10000)));
    store.race_next_write.store(true, Ordering::SeqCst);

    let result = service
        .record_transaction(
            OWNER,
            new_entry("a1", date(2023, 6, 1), TransactionType::ValuationUpdate, dec!(12000)),
        )
        .await;

    assert!(matches!(
        result,
        Err(Error::Ledger(LedgerError::StaleProjection { .. }))
    ));
    assert_eq!(store.entry_count("a1"), 0);
    assert_eq!(store.asset("a1").current_value, dec!(10000));

    // A retry against the refreshed projection succeeds.
    let receipt = service
        .record_transaction(
            OWNER,
            new_entry("a1", date(2023, 6, 1), TransactionType::ValuationUpdate, dec!(12000)),
        )
        .await
        .unwrap();
    assert_eq!(receipt.asset.current_value, dec!(12000));
}

#[tokio::test]
async fn test_scheduled_revaluation_applies_policy_value() {
    let (store, service) = setup();
    store.add_asset(scheduled_asset("a1", dec!(10000)));

    // 1461 days after acquisition: exactly four 365.25-day years.
    let receipt = service
        .run_scheduled_revaluation(OWNER, "a1", date(2027, 1, 1))
        .await
        .unwrap();

    // Four years of 8% compound growth, rounded to cents.
    assert_eq!(receipt.entry.value_after_transaction, dec!(13604.89));
    assert_eq!(receipt.entry.transaction_type, TransactionType::ValuationUpdate);
    assert!(receipt.entry.idempotency_key.is_some());
    assert_eq!(receipt.asset.current_value, dec!(13604.89));
    assert_eq!(
        receipt.asset.next_valuation_date,
        Some(date(2027, 1, 31))
    );
}

#[tokio::test]
async fn test_scheduled_revaluation_is_idempotent() {
    let (store, service) = setup();
    store.add_asset(scheduled_asset("a1", dec!(10000)));

    let first = service
        .run_scheduled_revaluation(OWNER, "a1", date(2024, 1, 1))
        .await
        .unwrap();
    let second = service
        .run_scheduled_revaluation(OWNER, "a1", date(2024, 1, 1))
        .await
        .unwrap();

    assert_eq!(store.entry_count("a1"), 1);
    assert_eq!(first.entry.id, second.entry.id);
}

#[tokio::test]
async fn test_scheduled_revaluation_requires_scheduled_method() {
    let (store, service) = setup();
    store.add_asset(manual_asset("a1", dec!(10000)));

    let result = service
        .run_scheduled_revaluation(OWNER, "a1", date(2024, 1, 1))
        .await;

    assert!(matches!(
        result,
        Err(Error::Ledger(LedgerError::InvalidData(_)))
    ));
    assert_eq!(store.entry_count("a1"), 0);
}

#[tokio::test]
async fn test_due_sweep_continues_past_failing_asset() {
    let (store, service) = setup();
    // First due asset has an acquisition date after the sweep date, so its
    // re-valuation fails; the second must still be processed.
    let mut broken = scheduled_asset("broken", dec!(10000));
    broken.acquisition_date = date(2025, 1, 1);
    store.add_asset(broken);
    store.add_asset(scheduled_asset("healthy", dec!(10000)));

    let receipts = service
        .run_due_revaluations(OWNER, date(2024, 1, 1))
        .await
        .unwrap();

    assert_eq!(receipts.len(), 1);
    assert_eq!(receipts[0].asset.id, "healthy");
    assert_eq!(store.entry_count("broken"), 0);
    assert_eq!(store.entry_count("healthy"), 1);
}

#[tokio::test]
async fn test_due_sweep_skips_assets_not_yet_due() {
    let (store, service) = setup();
    let mut not_due = scheduled_asset("a1", dec!(10000));
    not_due.next_valuation_date = Some(date(2024, 6, 1));
    store.add_asset(not_due);

    let receipts = service
        .run_due_revaluations(OWNER, date(2024, 1, 1))
        .await
        .unwrap();
    assert!(receipts.is_empty());
}

#[test]
fn test_reconcile_state_serializes_terminal_outcomes() {
    assert_eq!(
        serde_json::to_value(ReconcileState::Committed).unwrap(),
        "COMMITTED"
    );
    assert_eq!(
        serde_json::to_value(ReconcileState::Failed).unwrap(),
        "FAILED"
    );
}

#[tokio::test]
async fn test_owner_scope_is_enforced() {
    let (store, service) = setup();
    store.add_asset(manual_asset("a1", dec!(10000)));

    let result = service
        .record_transaction(
            "other-owner",
            new_entry("a1", date(2023, 6, 1), TransactionType::ValuationUpdate, dec!(12000)),
        )
        .await;

    assert!(matches!(result, Err(Error::Ledger(LedgerError::NotFound(_)))));
}
