//! LOG workflow: structured extraction from natural language.
//!
//! One fast-profile gateway call turns the user's statement into a JSON
//! object, which is then recovered defensively, validated, normalized,
//! timestamped, and persisted. The model's output is untrusted text
//! end to end; nothing reaches the store without passing validation.

use serde_json::{Map, Value};

use fh_domain::config::Profile;
use fh_domain::error::{Error, Result};
use fh_domain::record::{Action, ActivityRecord};
use fh_providers::CompletionGateway;
use fh_store::ActivityStore;

use crate::prompts;
use crate::recovery::recover_json;

/// Extract a structured activity record from `text` and persist it.
///
/// Returns a confirmation message on success. Extraction, validation,
/// and persistence failures propagate as their respective error kinds;
/// the caller maps them to user-facing guidance.
pub async fn log_flow(
    gateway: &dyn CompletionGateway,
    store: &dyn ActivityStore,
    text: &str,
    user_id: &str,
) -> Result<String> {
    let prompt = prompts::extraction(text);
    let raw = gateway.complete(Profile::Fast, &prompt).await?;

    let map = recover_json(&raw)?;
    let record = record_from_map(&map)?;

    store.append(user_id, &record)?;

    tracing::info!(
        user_id,
        action = %record.action,
        item = %record.item,
        "activity logged"
    );

    Ok(confirmation(&record))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Validation & normalization
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Build a validated record from the recovered JSON object.
///
/// `action` and `item` must be present and non-empty; `action` must be
/// one of the known labels (parsed case-insensitively, stored
/// lower-case). The timestamp is stamped here with the system clock;
/// any timestamp in the model output is ignored.
fn record_from_map(map: &Map<String, Value>) -> Result<ActivityRecord> {
    let action_raw =
        non_empty_str(map, "action").ok_or(Error::Validation { field: "action" })?;
    let action: Action = action_raw.parse()?;

    let item = non_empty_str(map, "item").ok_or(Error::Validation { field: "item" })?;

    let mut record = ActivityRecord::new(action, item);
    record.quantity = numeric(map, "quantity");
    record.unit = non_empty_str(map, "unit").map(str::to_string);
    record.value_usd = numeric(map, "value_usd");
    record.note = non_empty_str(map, "note").map(str::to_string);

    Ok(record)
}

fn non_empty_str<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Accept numbers and numeric strings; the model is not consistent
/// about which it emits.
fn numeric(map: &Map<String, Value>, key: &str) -> Option<f64> {
    let value = map.get(key)?;
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Confirmation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn confirmation(record: &ActivityRecord) -> String {
    let mut msg = format!("✅ Logged: {} of {}", record.action, record.item);

    if let Some(quantity) = record.quantity {
        match &record.unit {
            Some(unit) => msg.push_str(&format!(" ({quantity} {unit})")),
            None => msg.push_str(&format!(" ({quantity})")),
        }
    }
    if let Some(value) = record.value_usd {
        msg.push_str(&format!(" for ${value:.2}"));
    }

    msg.push('.');
    msg
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
