//! Pure aggregation over record sets.
//!
//! Statistics are functions of the records, never stored. The JSON
//! backend computes them here; the SQLite backend computes the same
//! shapes in SQL, and the parity test holds the two to identical
//! results.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use fh_domain::record::{
    Action, ActivityRecord, AggregateStats, ItemBreakdownRow,
};

/// Compute totals and per-action counts over a record set.
pub fn compute_aggregate(records: &[ActivityRecord]) -> AggregateStats {
    let mut stats = AggregateStats::default();

    for record in records {
        let value = record.value_usd.unwrap_or(0.0);

        if record.action == Action::Sale {
            stats.total_sales += value;
        }
        if record.action.is_expense() {
            stats.total_expenses += value;
        }

        let entry = stats.by_action.entry(record.action).or_default();
        entry.count += 1;
        entry.total_value += value;
    }

    stats.total_entries = records.len() as u64;
    stats
}

/// Group records by (item, action) and sum counts, quantities, and values.
///
/// Rows are sorted by total value descending; ties break by item name,
/// then action, so the ordering is deterministic. `item_filter` is a
/// case-insensitive substring match on the item name.
pub fn compute_breakdown(
    records: &[ActivityRecord],
    item_filter: Option<&str>,
) -> Vec<ItemBreakdownRow> {
    let filter = item_filter.map(|f| f.to_lowercase());

    let mut groups: BTreeMap<(String, Action), (u64, f64, f64)> = BTreeMap::new();
    for record in records {
        if let Some(ref f) = filter {
            if !record.item.to_lowercase().contains(f.as_str()) {
                continue;
            }
        }

        let key = (record.item.clone(), record.action);
        let entry = groups.entry(key).or_insert((0, 0.0, 0.0));
        entry.0 += 1;
        entry.1 += record.quantity.unwrap_or(0.0);
        entry.2 += record.value_usd.unwrap_or(0.0);
    }

    let mut rows: Vec<ItemBreakdownRow> = groups
        .into_iter()
        .map(|((item, action), (count, total_quantity, total_value))| ItemBreakdownRow {
            item,
            action,
            count,
            total_quantity,
            total_value,
        })
        .collect();

    rows.sort_by(|a, b| {
        b.total_value
            .partial_cmp(&a.total_value)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.item.cmp(&b.item))
            .then_with(|| a.action.cmp(&b.action))
    });

    rows
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
