//! REPORT workflow: longer-form, sectioned summaries.
//!
//! Same retrieval-and-ground pattern as QUERY, but with a larger record
//! window, the entire window rendered into the prompt, the full
//! per-action breakdown plus net income, and the detailed generation
//! profile for a narrative answer.

use fh_domain::config::Profile;
use fh_domain::error::Result;
use fh_providers::CompletionGateway;
use fh_store::ActivityStore;

use crate::prompts;
use crate::NO_DATA_GUIDANCE;

/// Records read from the store per report turn.
const RECORD_WINDOW: usize = 200;
/// Item-breakdown rows included in the prompt.
const BREAKDOWN_ROWS: usize = 15;

/// Produce a formatted report over the user's logged data.
pub async fn report_flow(
    gateway: &dyn CompletionGateway,
    store: &dyn ActivityStore,
    text: &str,
    user_id: &str,
) -> Result<String> {
    let records = store.list(user_id, RECORD_WINDOW, None)?;
    if records.is_empty() {
        return Ok(NO_DATA_GUIDANCE.to_string());
    }

    let stats = store.aggregate(user_id)?;
    let mut breakdown = store.item_breakdown(user_id, None)?;
    breakdown.truncate(BREAKDOWN_ROWS);

    // Unlike QUERY, the whole record window goes into the prompt.
    let prompt = prompts::report(&records, &stats, &breakdown, text);

    tracing::debug!(
        user_id,
        records = records.len(),
        "report flow prompt assembled"
    );

    gateway.complete(Profile::Detailed, &prompt).await
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use fh_domain::error::Error;
    use fh_domain::record::{Action, ActivityRecord, AggregateStats, ItemBreakdownRow};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingGateway {
        calls: AtomicUsize,
        last_profile: Mutex<Option<Profile>>,
        last_prompt: Mutex<String>,
    }

    impl CountingGateway {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                last_profile: Mutex::new(None),
                last_prompt: Mutex::new(String::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl CompletionGateway for CountingGateway {
        async fn complete(&self, profile: Profile, prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_profile.lock() = Some(profile);
            *self.last_prompt.lock() = prompt.to_string();
            Ok("# Farm Report\n...".into())
        }
    }

    #[derive(Default)]
    struct MemStore {
        records: Vec<ActivityRecord>,
    }

    impl ActivityStore for MemStore {
        fn append(&self, _user_id: &str, _record: &ActivityRecord) -> Result<()> {
            Err(Error::Store("read-only test store".into()))
        }

        fn list(
            &self,
            _user_id: &str,
            limit: usize,
            _action: Option<Action>,
        ) -> Result<Vec<ActivityRecord>> {
            let mut records = self.records.clone();
            records.truncate(limit);
            Ok(records)
        }

        fn aggregate(&self, _user_id: &str) -> Result<AggregateStats> {
            Ok(fh_store::stats::compute_aggregate(&self.records))
        }

        fn item_breakdown(
            &self,
            _user_id: &str,
            filter: Option<&str>,
        ) -> Result<Vec<ItemBreakdownRow>> {
            Ok(fh_store::stats::compute_breakdown(&self.records, filter))
        }
    }

    #[tokio::test]
    async fn empty_store_returns_guidance_with_zero_gateway_calls() {
        let gateway = CountingGateway::new();
        let store = MemStore::default();

        let msg = report_flow(&gateway, &store, "sales report", "u@x.com")
            .await
            .unwrap();

        assert!(msg.contains("No activity logged yet"));
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn report_uses_detailed_profile_and_includes_net_income() {
        let gateway = CountingGateway::new();
        let mut sale = ActivityRecord::new(Action::Sale, "tomatoes");
        sale.value_usd = Some(120.0);
        let mut expense = ActivityRecord::new(Action::Expense, "fuel");
        expense.value_usd = Some(50.0);
        let store = MemStore {
            records: vec![sale, expense],
        };

        report_flow(&gateway, &store, "monthly summary", "u@x.com")
            .await
            .unwrap();

        assert_eq!(*gateway.last_profile.lock(), Some(Profile::Detailed));
        let prompt = gateway.last_prompt.lock();
        assert!(prompt.contains("- net income: $70.00"));
        assert!(prompt.contains("monthly summary"));
    }

    #[tokio::test]
    async fn whole_record_window_lands_in_the_prompt() {
        let gateway = CountingGateway::new();
        let records = (0..50)
            .map(|i| ActivityRecord::new(Action::Harvest, format!("crop-{i:02}")))
            .collect();
        let store = MemStore { records };

        report_flow(&gateway, &store, "harvest report", "u@x.com")
            .await
            .unwrap();

        let prompt = gateway.last_prompt.lock();
        // No 20-record cap here; the last of the 50 is present.
        assert!(prompt.contains("crop-49"));
    }
}
