//! SQLite backend.
//!
//! One database file per user, schema bootstrapped on open. Aggregation
//! runs in SQL so the full record set never needs to be materialized in
//! memory.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

use fh_domain::error::{Error, Result};
use fh_domain::record::{Action, ActivityRecord, ActionStats, AggregateStats, ItemBreakdownRow};

use crate::{safe_file_stem, ActivityStore};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS farm_logs (
    id        TEXT PRIMARY KEY,
    user_id   TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    action    TEXT NOT NULL,
    item      TEXT NOT NULL,
    quantity  REAL,
    unit      TEXT,
    value_usd REAL,
    note      TEXT
);
CREATE INDEX IF NOT EXISTS idx_user_timestamp ON farm_logs(user_id, timestamp);
";

/// Activity store backed by one SQLite database per user.
pub struct SqliteStore {
    data_dir: PathBuf,
}

impl SqliteStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Open the user's database, creating the file and schema if needed.
    fn conn(&self, user_id: &str) -> Result<Connection> {
        let stem = safe_file_stem(user_id)?;
        std::fs::create_dir_all(&self.data_dir).map_err(Error::Io)?;

        let path = self.data_dir.join(format!("{stem}_data.db"));
        let conn = Connection::open(&path).map_err(sql_err)?;
        conn.execute_batch(SCHEMA).map_err(sql_err)?;
        Ok(conn)
    }
}

fn sql_err(e: rusqlite::Error) -> Error {
    Error::Store(e.to_string())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Row mappers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Untyped row as stored; converted to an [`ActivityRecord`] outside the
/// rusqlite closure so parse failures surface as store errors.
struct RawRow {
    id: String,
    action: String,
    item: String,
    quantity: Option<f64>,
    unit: Option<String>,
    value_usd: Option<f64>,
    note: Option<String>,
    timestamp: String,
}

fn row_to_raw(row: &Row) -> rusqlite::Result<RawRow> {
    Ok(RawRow {
        id: row.get("id")?,
        action: row.get("action")?,
        item: row.get("item")?,
        quantity: row.get("quantity")?,
        unit: row.get("unit")?,
        value_usd: row.get("value_usd")?,
        note: row.get("note")?,
        timestamp: row.get("timestamp")?,
    })
}

fn raw_to_record(raw: RawRow) -> Result<ActivityRecord> {
    let action: Action = raw
        .action
        .parse()
        .map_err(|_| Error::Store(format!("invalid action '{}' in store", raw.action)))?;
    let timestamp = DateTime::parse_from_rfc3339(&raw.timestamp)
        .map_err(|e| Error::Store(format!("invalid timestamp '{}': {e}", raw.timestamp)))?
        .with_timezone(&Utc);

    Ok(ActivityRecord {
        id: raw.id,
        action,
        item: raw.item,
        quantity: raw.quantity,
        unit: raw.unit,
        value_usd: raw.value_usd,
        note: raw.note,
        timestamp,
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Store implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

impl ActivityStore for SqliteStore {
    fn append(&self, user_id: &str, record: &ActivityRecord) -> Result<()> {
        let conn = self.conn(user_id)?;
        conn.execute(
            "INSERT INTO farm_logs
                 (id, user_id, timestamp, action, item, quantity, unit, value_usd, note)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                record.id,
                user_id,
                record.timestamp.to_rfc3339(),
                record.action.as_str(),
                record.item,
                record.quantity,
                record.unit,
                record.value_usd,
                record.note,
            ],
        )
        .map_err(sql_err)?;
        Ok(())
    }

    fn list(
        &self,
        user_id: &str,
        limit: usize,
        action: Option<Action>,
    ) -> Result<Vec<ActivityRecord>> {
        let conn = self.conn(user_id)?;

        let raw_rows: Vec<rusqlite::Result<RawRow>> = if let Some(action) = action {
            let mut stmt = conn
                .prepare(
                    "SELECT id, action, item, quantity, unit, value_usd, note, timestamp
                     FROM farm_logs
                     WHERE user_id = ?1 AND action = ?2
                     ORDER BY timestamp DESC
                     LIMIT ?3",
                )
                .map_err(sql_err)?;
            let collected = stmt
                .query_map(params![user_id, action.as_str(), limit as i64], row_to_raw)
                .map_err(sql_err)?
                .collect();
            collected
        } else {
            let mut stmt = conn
                .prepare(
                    "SELECT id, action, item, quantity, unit, value_usd, note, timestamp
                     FROM farm_logs
                     WHERE user_id = ?1
                     ORDER BY timestamp DESC
                     LIMIT ?2",
                )
                .map_err(sql_err)?;
            let collected = stmt
                .query_map(params![user_id, limit as i64], row_to_raw)
                .map_err(sql_err)?
                .collect();
            collected
        };

        raw_rows
            .into_iter()
            .map(|raw| raw.map_err(sql_err).and_then(raw_to_record))
            .collect()
    }

    fn aggregate(&self, user_id: &str) -> Result<AggregateStats> {
        let conn = self.conn(user_id)?;

        let total_sales: f64 = conn
            .query_row(
                "SELECT COALESCE(SUM(value_usd), 0)
                 FROM farm_logs
                 WHERE user_id = ?1 AND action = 'sale'",
                params![user_id],
                |row| row.get(0),
            )
            .map_err(sql_err)?;

        let total_expenses: f64 = conn
            .query_row(
                "SELECT COALESCE(SUM(value_usd), 0)
                 FROM farm_logs
                 WHERE user_id = ?1 AND action IN ('expense', 'purchase')",
                params![user_id],
                |row| row.get(0),
            )
            .map_err(sql_err)?;

        let mut stats = AggregateStats {
            total_sales,
            total_expenses,
            ..Default::default()
        };

        let mut stmt = conn
            .prepare(
                "SELECT action, COUNT(*), COALESCE(SUM(value_usd), 0)
                 FROM farm_logs
                 WHERE user_id = ?1
                 GROUP BY action",
            )
            .map_err(sql_err)?;
        let rows: Vec<rusqlite::Result<(String, i64, f64)>> = stmt
            .query_map(params![user_id], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?))
            })
            .map_err(sql_err)?
            .collect();

        for row in rows {
            let (action, count, total_value) = row.map_err(sql_err)?;
            let action: Action = action
                .parse()
                .map_err(|_| Error::Store(format!("invalid action '{action}' in store")))?;
            let count = count as u64;
            stats
                .by_action
                .insert(action, ActionStats { count, total_value });
            stats.total_entries += count;
        }

        Ok(stats)
    }

    fn item_breakdown(
        &self,
        user_id: &str,
        item_filter: Option<&str>,
    ) -> Result<Vec<ItemBreakdownRow>> {
        let conn = self.conn(user_id)?;

        let sql_base = "SELECT item, action, COUNT(*) AS count,
                        COALESCE(SUM(quantity), 0) AS total_quantity,
                        COALESCE(SUM(value_usd), 0) AS total_value
                 FROM farm_logs
                 WHERE user_id = ?1";
        let sql_tail = " GROUP BY item, action
                 ORDER BY total_value DESC, item ASC, action ASC";

        type BreakdownTuple = (String, String, i64, f64, f64);
        let map_row = |row: &Row| -> rusqlite::Result<BreakdownTuple> {
            Ok((
                row.get("item")?,
                row.get("action")?,
                row.get("count")?,
                row.get("total_quantity")?,
                row.get("total_value")?,
            ))
        };

        let rows: Vec<rusqlite::Result<BreakdownTuple>> = if let Some(filter) = item_filter {
            let sql = format!("{sql_base} AND LOWER(item) LIKE ?2{sql_tail}");
            let pattern = format!("%{}%", filter.to_lowercase());
            let mut stmt = conn.prepare(&sql).map_err(sql_err)?;
            let collected = stmt
                .query_map(params![user_id, pattern], map_row)
                .map_err(sql_err)?
                .collect();
            collected
        } else {
            let sql = format!("{sql_base}{sql_tail}");
            let mut stmt = conn.prepare(&sql).map_err(sql_err)?;
            let collected = stmt
                .query_map(params![user_id], map_row)
                .map_err(sql_err)?
                .collect();
            collected
        };

        rows.into_iter()
            .map(|row| {
                let (item, action, count, total_quantity, total_value) =
                    row.map_err(sql_err)?;
                let action: Action = action
                    .parse()
                    .map_err(|_| Error::Store(format!("invalid action '{action}' in store")))?;
                Ok(ItemBreakdownRow {
                    item,
                    action,
                    count: count as u64,
                    total_quantity,
                    total_value,
                })
            })
            .collect()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn store() -> (tempfile::TempDir, SqliteStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::new(dir.path().to_path_buf());
        (dir, store)
    }

    #[test]
    fn append_then_list_round_trips_optional_fields_absent() {
        let (_dir, store) = store();
        let record = ActivityRecord::new(Action::Harvest, "squash");
        store.append("farmer@example.com", &record).unwrap();

        let listed = store.list("farmer@example.com", 10, None).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, record.id);
        assert_eq!(listed[0].action, Action::Harvest);
        assert!(listed[0].quantity.is_none());
        assert!(listed[0].unit.is_none());
        assert!(listed[0].value_usd.is_none());
        assert!(listed[0].note.is_none());
    }

    #[test]
    fn list_orders_most_recent_first() {
        let (_dir, store) = store();
        let now = Utc::now();
        for i in 0..4 {
            let mut r = ActivityRecord::new(Action::Sale, format!("item-{i}"));
            r.timestamp = now - Duration::days(i);
            store.append("u@example.com", &r).unwrap();
        }

        let listed = store.list("u@example.com", 2, None).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].item, "item-0");
        assert_eq!(listed[1].item, "item-1");
    }

    #[test]
    fn list_filters_by_action() {
        let (_dir, store) = store();
        store
            .append("u@example.com", &ActivityRecord::new(Action::Sale, "eggs"))
            .unwrap();
        store
            .append("u@example.com", &ActivityRecord::new(Action::Expense, "feed"))
            .unwrap();

        let expenses = store
            .list("u@example.com", 10, Some(Action::Expense))
            .unwrap();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].item, "feed");
    }

    #[test]
    fn aggregate_sums_sales_and_expenses() {
        let (_dir, store) = store();
        let mut s1 = ActivityRecord::new(Action::Sale, "tomatoes");
        s1.value_usd = Some(75.0);
        let mut s2 = ActivityRecord::new(Action::Sale, "carrots");
        s2.value_usd = Some(45.0);
        let mut e1 = ActivityRecord::new(Action::Expense, "fuel");
        e1.value_usd = Some(50.0);
        for r in [&s1, &s2, &e1] {
            store.append("u@example.com", r).unwrap();
        }

        let stats = store.aggregate("u@example.com").unwrap();
        assert!((stats.total_sales - 120.0).abs() < 1e-9);
        assert!((stats.total_expenses - 50.0).abs() < 1e-9);
        assert_eq!(stats.total_entries, 3);
        assert_eq!(stats.by_action[&Action::Sale].count, 2);
    }

    #[test]
    fn breakdown_sorted_and_filtered() {
        let (_dir, store) = store();
        let mut tomatoes = ActivityRecord::new(Action::Sale, "tomatoes");
        tomatoes.quantity = Some(50.0);
        tomatoes.value_usd = Some(75.0);
        let mut potatoes = ActivityRecord::new(Action::Sale, "potatoes");
        potatoes.quantity = Some(100.0);
        potatoes.value_usd = Some(120.0);
        store.append("u@example.com", &tomatoes).unwrap();
        store.append("u@example.com", &potatoes).unwrap();

        let rows = store.item_breakdown("u@example.com", None).unwrap();
        assert_eq!(rows[0].item, "potatoes");
        assert_eq!(rows[1].item, "tomatoes");

        let filtered = store.item_breakdown("u@example.com", Some("TOMA")).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].item, "tomatoes");
        assert!((filtered[0].total_quantity - 50.0).abs() < 1e-9);
    }

    #[test]
    fn users_are_partitioned() {
        let (dir, store) = store();
        store
            .append("alice@example.com", &ActivityRecord::new(Action::Sale, "eggs"))
            .unwrap();

        assert!(dir.path().join("alice_data.db").exists());
        let bob = store.list("bob@example.com", 10, None).unwrap();
        assert!(bob.is_empty());
    }
}
