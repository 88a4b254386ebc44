//! Flat-file JSON backend.
//!
//! One `<user>_data.json` file per user holding the full record array.
//! Writes are read-modify-write under a store-wide lock; aggregation
//! happens in memory via [`crate::stats`].

use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use fh_domain::error::{Error, Result};
use fh_domain::record::{Action, ActivityRecord, AggregateStats, ItemBreakdownRow};

use crate::{safe_file_stem, stats, ActivityStore};

/// Activity store backed by one JSON file per user.
pub struct JsonStore {
    data_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            write_lock: Mutex::new(()),
        }
    }

    fn data_path(&self, user_id: &str) -> Result<PathBuf> {
        let stem = safe_file_stem(user_id)?;
        Ok(self.data_dir.join(format!("{stem}_data.json")))
    }

    /// Load the full record array for a user. A missing file is an empty
    /// set; an unreadable file is treated as empty with a warning, same
    /// as a fresh partition.
    fn load(&self, path: &Path) -> Vec<ActivityRecord> {
        if !path.exists() {
            return Vec::new();
        }
        match std::fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(records) => records,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "unparseable data file, treating as empty"
                    );
                    Vec::new()
                }
            },
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "unreadable data file, treating as empty"
                );
                Vec::new()
            }
        }
    }

    fn flush(&self, path: &Path, records: &[ActivityRecord]) -> Result<()> {
        let json = serde_json::to_string_pretty(records)
            .map_err(|e| Error::Store(format!("serializing records: {e}")))?;
        std::fs::write(path, json).map_err(Error::Io)?;
        Ok(())
    }
}

impl ActivityStore for JsonStore {
    fn append(&self, user_id: &str, record: &ActivityRecord) -> Result<()> {
        let path = self.data_path(user_id)?;
        std::fs::create_dir_all(&self.data_dir).map_err(Error::Io)?;

        let _guard = self.write_lock.lock();
        let mut records = self.load(&path);
        records.push(record.clone());
        self.flush(&path, &records)
    }

    fn list(
        &self,
        user_id: &str,
        limit: usize,
        action: Option<Action>,
    ) -> Result<Vec<ActivityRecord>> {
        let path = self.data_path(user_id)?;
        let mut records = self.load(&path);

        if let Some(action) = action {
            records.retain(|r| r.action == action);
        }

        // Most recent first.
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        records.truncate(limit);
        Ok(records)
    }

    fn aggregate(&self, user_id: &str) -> Result<AggregateStats> {
        let path = self.data_path(user_id)?;
        Ok(stats::compute_aggregate(&self.load(&path)))
    }

    fn item_breakdown(
        &self,
        user_id: &str,
        item_filter: Option<&str>,
    ) -> Result<Vec<ItemBreakdownRow>> {
        let path = self.data_path(user_id)?;
        Ok(stats::compute_breakdown(&self.load(&path), item_filter))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
