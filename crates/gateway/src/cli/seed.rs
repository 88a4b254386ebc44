//! `farmhand seed` — demo data seeding.
//!
//! Populates a user's store with a realistic week of farm activity so
//! QUERY and REPORT have something to chew on. Writes go through the
//! normal `append` path, so whichever backend is configured gets the
//! data.

use std::sync::Arc;

use chrono::{Duration, Utc};

use fh_domain::config::Config;
use fh_domain::record::{Action, ActivityRecord};

use crate::bootstrap;

/// Seed demo activities for one user.
///
/// With `clear`, the user's existing data files (both backends) are
/// removed first.
pub fn seed(config: Arc<Config>, user: Option<String>, clear: bool) -> anyhow::Result<()> {
    let user_id = user.unwrap_or_else(|| config.chat.default_user.clone());

    if clear {
        clear_user_data(&config, &user_id)?;
    }

    let state = bootstrap::build_state(config)?;

    let activities = demo_activities();
    let total = activities.len();
    for record in &activities {
        state.store.append(&user_id, record)?;
        eprintln!("  ✓ {} of {}", record.action, record.item);
    }

    eprintln!("✅ Seeded {total} activities for {user_id}");
    Ok(())
}

/// Remove the user's data files for both backends.
fn clear_user_data(config: &Config, user_id: &str) -> anyhow::Result<()> {
    let stem = fh_store::safe_file_stem(user_id)?;
    for suffix in ["_data.json", "_data.db"] {
        let path = config.store.data_dir.join(format!("{stem}{suffix}"));
        if path.exists() {
            std::fs::remove_file(&path)?;
            eprintln!("  ✓ Cleared {}", path.display());
        }
    }
    Ok(())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Demo data
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

struct Seed {
    action: Action,
    item: &'static str,
    quantity: Option<f64>,
    unit: Option<&'static str>,
    value_usd: Option<f64>,
    note: &'static str,
    days_ago: i64,
}

fn demo_activities() -> Vec<ActivityRecord> {
    let seeds = [
        // Sales
        Seed {
            action: Action::Sale,
            item: "tomatoes",
            quantity: Some(50.0),
            unit: Some("pounds"),
            value_usd: Some(75.0),
            note: "Sold at farmers market",
            days_ago: 2,
        },
        Seed {
            action: Action::Sale,
            item: "carrots",
            quantity: Some(30.0),
            unit: Some("pounds"),
            value_usd: Some(45.0),
            note: "Sold to local restaurant",
            days_ago: 3,
        },
        Seed {
            action: Action::Sale,
            item: "eggs",
            quantity: Some(24.0),
            unit: Some("dozen"),
            value_usd: Some(96.0),
            note: "Regular customer order",
            days_ago: 1,
        },
        Seed {
            action: Action::Sale,
            item: "potatoes",
            quantity: Some(100.0),
            unit: Some("pounds"),
            value_usd: Some(120.0),
            note: "Bulk sale to grocery store",
            days_ago: 5,
        },
        // Harvests
        Seed {
            action: Action::Harvest,
            item: "tomatoes",
            quantity: Some(150.0),
            unit: Some("pounds"),
            value_usd: None,
            note: "West field, heirloom variety",
            days_ago: 3,
        },
        Seed {
            action: Action::Harvest,
            item: "potatoes",
            quantity: Some(200.0),
            unit: Some("pounds"),
            value_usd: None,
            note: "North field, Yukon gold",
            days_ago: 6,
        },
        Seed {
            action: Action::Harvest,
            item: "squash",
            quantity: Some(45.0),
            unit: Some("pounds"),
            value_usd: None,
            note: "Butternut and acorn varieties",
            days_ago: 7,
        },
        // Expenses & purchases
        Seed {
            action: Action::Expense,
            item: "tractor fuel",
            quantity: Some(15.0),
            unit: Some("gallons"),
            value_usd: Some(52.5),
            note: "Monthly refill",
            days_ago: 4,
        },
        Seed {
            action: Action::Expense,
            item: "irrigation repair",
            quantity: None,
            unit: None,
            value_usd: Some(85.0),
            note: "Fixed broken sprinkler line",
            days_ago: 8,
        },
        Seed {
            action: Action::Purchase,
            item: "seed potatoes",
            quantity: Some(40.0),
            unit: Some("pounds"),
            value_usd: Some(60.0),
            note: "Next season's planting stock",
            days_ago: 9,
        },
    ];

    let now = Utc::now();
    seeds
        .into_iter()
        .map(|seed| {
            let mut record = ActivityRecord::new(seed.action, seed.item);
            record.quantity = seed.quantity;
            record.unit = seed.unit.map(str::to_string);
            record.value_usd = seed.value_usd;
            record.note = Some(seed.note.to_string());
            record.timestamp = now - Duration::days(seed.days_ago);
            record
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_set_covers_every_action() {
        let activities = demo_activities();
        for action in [Action::Sale, Action::Harvest, Action::Purchase, Action::Expense] {
            assert!(
                activities.iter().any(|r| r.action == action),
                "missing {action} in demo data"
            );
        }
    }

    #[test]
    fn demo_timestamps_are_in_the_past() {
        let now = Utc::now();
        for record in demo_activities() {
            assert!(record.timestamp < now);
        }
    }

    #[test]
    fn demo_sales_total_matches_expected() {
        let activities = demo_activities();
        let stats = fh_store::stats::compute_aggregate(&activities);
        assert!((stats.total_sales - 336.0).abs() < 1e-9);
        assert!((stats.total_expenses - 197.5).abs() < 1e-9);
    }
}
