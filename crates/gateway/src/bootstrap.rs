//! Builds the shared [`AppState`] from a loaded configuration.

use std::sync::Arc;

use fh_domain::config::Config;
use fh_providers::{CompletionGateway, ProviderRegistry};
use fh_workflows::Assistant;

use crate::state::AppState;

/// Construct providers, store, and assistant once.
///
/// Auth env vars are resolved eagerly here; a provider that fails to
/// initialize is skipped (logged by the registry) and surfaces as an
/// error on first use instead of blocking startup.
pub fn build_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    let registry = ProviderRegistry::from_config(&config.llm)?;
    let gateway: Arc<dyn CompletionGateway> = Arc::new(registry);

    let store = fh_store::open_store(&config.store);

    let assistant = Arc::new(Assistant::new(gateway, store.clone()));

    tracing::debug!(
        backend = ?config.store.backend,
        data_dir = %config.store.data_dir.display(),
        "application state built"
    );

    Ok(AppState {
        config,
        store,
        assistant,
    })
}
