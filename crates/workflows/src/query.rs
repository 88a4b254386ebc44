//! QUERY workflow: retrieval-augmented question answering.
//!
//! Reads the user's recent records plus pre-aggregated statistics, embeds
//! both in the prompt, and asks the fast model to answer grounded in that
//! data. An empty record set short-circuits to a guidance message before
//! any gateway call is made.

use fh_domain::config::Profile;
use fh_domain::error::Result;
use fh_providers::CompletionGateway;
use fh_store::ActivityStore;

use crate::prompts;
use crate::NO_DATA_GUIDANCE;

/// Records read from the store per query turn.
const RECORD_WINDOW: usize = 100;
/// Most recent records rendered verbatim into the prompt.
const PROMPT_RECORDS: usize = 20;
/// Item-breakdown rows included in the prompt.
const BREAKDOWN_ROWS: usize = 10;

/// Answer a question about the user's logged data.
pub async fn query_flow(
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

    let window = &records[..records.len().min(PROMPT_RECORDS)];
    let prompt = prompts::query(window, &stats, &breakdown, text);

    tracing::debug!(
        user_id,
        records = records.len(),
        prompt_records = window.len(),
        "query flow prompt assembled"
    );

    gateway.complete(Profile::Fast, &prompt).await
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
        last_prompt: Mutex<String>,
    }

    impl CountingGateway {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(String::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl CompletionGateway for CountingGateway {
        async fn complete(&self, _profile: Profile, prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock() = prompt.to_string();
            Ok("You sold $120.00 of produce.".into())
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

        let msg = query_flow(&gateway, &store, "how much did I sell?", "u@x.com")
            .await
            .unwrap();

        assert!(msg.contains("No activity logged yet"));
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn populated_store_grounds_one_gateway_call() {
        let gateway = CountingGateway::new();
        let mut sale = ActivityRecord::new(Action::Sale, "tomatoes");
        sale.value_usd = Some(75.0);
        let store = MemStore {
            records: vec![sale],
        };

        let answer = query_flow(&gateway, &store, "how much did I sell?", "u@x.com")
            .await
            .unwrap();

        assert_eq!(answer, "You sold $120.00 of produce.");
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);

        let prompt = gateway.last_prompt.lock();
        assert!(prompt.contains("tomatoes"));
        assert!(prompt.contains("- total sales: $75.00"));
        assert!(prompt.contains("how much did I sell?"));
    }

    #[tokio::test]
    async fn prompt_record_window_is_capped_at_twenty() {
        let gateway = CountingGateway::new();
        let records = (0..40)
            .map(|i| ActivityRecord::new(Action::Harvest, format!("crop-{i:02}")))
            .collect();
        let store = MemStore { records };

        query_flow(&gateway, &store, "what did I harvest?", "u@x.com")
            .await
            .unwrap();

        let prompt = gateway.last_prompt.lock();
        assert!(prompt.contains("crop-19"));
        assert!(!prompt.contains("crop-20"));
    }
}
