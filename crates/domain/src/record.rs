//! Core data model: activity records, intents, and derived statistics.
//!
//! An [`ActivityRecord`] is one logged farm event, extracted from a single
//! user utterance. Records are immutable once written and are partitioned
//! per user by the store layer. Statistics types are derived on demand and
//! never persisted.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Action
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// What the user did. Stored lower-case; parsed case-insensitively.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Sale,
    Harvest,
    Purchase,
    Expense,
}

impl Action {
    /// The canonical lower-case label used in storage and prompts.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Sale => "sale",
            Action::Harvest => "harvest",
            Action::Purchase => "purchase",
            Action::Expense => "expense",
        }
    }

    /// Money going out rather than in. Purchases count as expenses for
    /// the aggregate totals.
    pub fn is_expense(&self) -> bool {
        matches!(self, Action::Purchase | Action::Expense)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sale" => Ok(Action::Sale),
            "harvest" => Ok(Action::Harvest),
            "purchase" => Ok(Action::Purchase),
            "expense" => Ok(Action::Expense),
            _ => Err(Error::Validation { field: "action" }),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Intent
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The classifier's single-label decision about what the user wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    Log,
    Query,
    Report,
    General,
}

impl Intent {
    /// Map a raw classifier label to an intent.
    ///
    /// The label comes from a free-form text model, so anything outside
    /// the known set falls back to [`Intent::General`] — the router never
    /// rejects a turn on an unrecognized label.
    pub fn from_label(label: &str) -> Intent {
        match label.trim() {
            "LOG" => Intent::Log,
            "QUERY" => Intent::Query,
            "REPORT" => Intent::Report,
            _ => Intent::General,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Intent::Log => "LOG",
            Intent::Query => "QUERY",
            Intent::Report => "REPORT",
            Intent::General => "GENERAL",
        };
        f.write_str(s)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Activity record
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One logged farm event.
///
/// Optional fields are skipped on serialization so a record written
/// without them reads back absent, never defaulted to zero. The
/// timestamp is always stamped by the system clock in UTC — timestamps
/// emitted by the extraction model are distrusted and overwritten.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: String,
    pub action: Action,
    pub item: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_usd: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ActivityRecord {
    /// Create a record with a fresh ID, stamped now.
    pub fn new(action: Action, item: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            action,
            item: item.into(),
            quantity: None,
            unit: None,
            value_usd: None,
            note: None,
            timestamp: Utc::now(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Derived statistics
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Per-action count and value sum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ActionStats {
    pub count: u64,
    pub total_value: f64,
}

/// Pre-aggregated totals over one user's record set.
///
/// `total_expenses` sums both `expense` and `purchase` actions.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AggregateStats {
    pub total_sales: f64,
    pub total_expenses: f64,
    pub total_entries: u64,
    pub by_action: BTreeMap<Action, ActionStats>,
}

impl AggregateStats {
    /// `total_sales - total_expenses`.
    pub fn net_income(&self) -> f64 {
        self.total_sales - self.total_expenses
    }
}

/// One row of the per-item aggregation, grouped by (item, action).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemBreakdownRow {
    pub item: String,
    pub action: Action,
    pub count: u64,
    pub total_quantity: f64,
    pub total_value: f64,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_parses_case_insensitively() {
        assert_eq!("Sale".parse::<Action>().unwrap(), Action::Sale);
        assert_eq!("HARVEST".parse::<Action>().unwrap(), Action::Harvest);
        assert_eq!(" expense ".parse::<Action>().unwrap(), Action::Expense);
    }

    #[test]
    fn action_rejects_unknown_labels() {
        let err = "trade".parse::<Action>().unwrap_err();
        assert!(matches!(err, Error::Validation { field: "action" }));
    }

    #[test]
    fn action_serializes_lowercase() {
        let json = serde_json::to_string(&Action::Sale).unwrap();
        assert_eq!(json, r#""sale""#);
    }

    #[test]
    fn intent_from_label_known_values() {
        assert_eq!(Intent::from_label("LOG"), Intent::Log);
        assert_eq!(Intent::from_label(" QUERY\n"), Intent::Query);
        assert_eq!(Intent::from_label("REPORT"), Intent::Report);
        assert_eq!(Intent::from_label("GENERAL"), Intent::General);
    }

    #[test]
    fn intent_unknown_label_falls_back_to_general() {
        assert_eq!(Intent::from_label("FOO"), Intent::General);
        assert_eq!(Intent::from_label(""), Intent::General);
        assert_eq!(Intent::from_label("log"), Intent::General);
    }

    #[test]
    fn record_omitted_optionals_stay_absent_in_json() {
        let record = ActivityRecord::new(Action::Harvest, "tomatoes");
        let json = serde_json::to_value(&record).unwrap();

        assert!(json.get("quantity").is_none());
        assert!(json.get("unit").is_none());
        assert!(json.get("value_usd").is_none());
        assert!(json.get("note").is_none());
    }

    #[test]
    fn record_round_trips_through_json() {
        let mut record = ActivityRecord::new(Action::Sale, "eggs");
        record.quantity = Some(24.0);
        record.unit = Some("dozen".into());
        record.value_usd = Some(96.0);

        let json = serde_json::to_string(&record).unwrap();
        let back: ActivityRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(back.action, Action::Sale);
        assert_eq!(back.item, "eggs");
        assert_eq!(back.quantity, Some(24.0));
        assert_eq!(back.unit.as_deref(), Some("dozen"));
        assert_eq!(back.value_usd, Some(96.0));
        assert!(back.note.is_none());
    }

    #[test]
    fn net_income_is_sales_minus_expenses() {
        let stats = AggregateStats {
            total_sales: 120.0,
            total_expenses: 50.0,
            ..Default::default()
        };
        assert!((stats.net_income() - 70.0).abs() < 1e-9);
    }
}
