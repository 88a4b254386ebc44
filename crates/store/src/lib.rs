//! Persistence layer for activity records.
//!
//! One logical store per user: every operation takes the owning
//! `user_id` and touches only that user's partition (a flat JSON file or
//! a SQLite database, one per user, under the configured data
//! directory). Records are append-only; reads are snapshot-at-call-time.

pub mod json;
pub mod sqlite;
pub mod stats;

use std::sync::Arc;

use fh_domain::config::{StoreBackend, StoreConfig};
use fh_domain::error::{Error, Result};
use fh_domain::record::{Action, ActivityRecord, AggregateStats, ItemBreakdownRow};

pub use json::JsonStore;
pub use sqlite::SqliteStore;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Capability trait
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Store operations available to the workflows.
///
/// Implementations partition data by `user_id`; no record is ever visible
/// across users. The choice of backing technology is an implementation
/// detail behind this trait.
pub trait ActivityStore: Send + Sync {
    /// Append one record to the user's partition.
    fn append(&self, user_id: &str, record: &ActivityRecord) -> Result<()>;

    /// Up to `limit` records, most recent first, optionally filtered by
    /// action.
    fn list(
        &self,
        user_id: &str,
        limit: usize,
        action: Option<Action>,
    ) -> Result<Vec<ActivityRecord>>;

    /// Totals and per-action counts over the user's full record set.
    fn aggregate(&self, user_id: &str) -> Result<AggregateStats>;

    /// Per-(item, action) rows sorted by total value descending,
    /// optionally filtered by a case-insensitive item-name substring.
    fn item_breakdown(
        &self,
        user_id: &str,
        item_filter: Option<&str>,
    ) -> Result<Vec<ItemBreakdownRow>>;
}

/// Open the backend selected by the configuration.
pub fn open_store(config: &StoreConfig) -> Arc<dyn ActivityStore> {
    match config.backend {
        StoreBackend::Json => Arc::new(JsonStore::new(config.data_dir.clone())),
        StoreBackend::Sqlite => Arc::new(SqliteStore::new(config.data_dir.clone())),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Partition naming
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Derive a safe file stem from a user id.
///
/// Takes the local part of an email-style id and replaces anything that
/// is not alphanumeric, `-`, or `_` with `_`, so ids never escape the
/// data directory. Example: `"testuser@gmail.com"` → `"testuser"`.
pub fn safe_file_stem(user_id: &str) -> Result<String> {
    let local = user_id.split('@').next().unwrap_or(user_id);
    let stem: String = local
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if stem.is_empty() {
        return Err(Error::Store("empty user_id".into()));
    }
    Ok(stem)
}
