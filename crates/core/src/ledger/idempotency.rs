//! Idempotency key computation for scheduled re-valuations.
//!
//! Re-running the scheduler for the same due date must not create duplicate
//! ledger entries. The key is a stable fingerprint of the (asset, as-of date)
//! pair, checked before a synthesized valuation update is appended.

use chrono::NaiveDate;
use sha2::{Digest, Sha256};

/// Computes a stable idempotency key for a scheduled re-valuation.
///
/// The key is a SHA-256 hash over `asset_id | as_of_date`, hex encoded.
pub fn revaluation_idempotency_key(asset_id: &str, as_of: NaiveDate) -> String {
    let mut hasher = Sha256::new();
    hasher.update(asset_id.as_bytes());
    hasher.update(b"|");
    hasher.update(as_of.format("%Y-%m-%d").to_string().as_bytes());
    hex::encode(hasher.finalize())
}
