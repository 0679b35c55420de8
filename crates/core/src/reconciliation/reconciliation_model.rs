//! Reconciliation domain models.

use serde::{Deserialize, Serialize};

use crate::assets::Asset;
use crate::ledger::LedgerEntry;

/// Terminal outcome of a reconciliation operation. Both writes landed
/// (`Committed`) or neither did (`Failed`) and the prior committed
/// projection is intact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReconcileState {
    Committed,
    Failed,
}

/// Outcome of a successful reconciliation operation: the persisted ledger
/// entry and the refreshed asset projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReceipt {
    pub state: ReconcileState,
    pub entry: LedgerEntry,
    pub asset: Asset,
}
