use std::sync::Arc;

use fh_domain::config::Config;
use fh_store::ActivityStore;
use fh_workflows::Assistant;

/// Shared application state passed to all CLI commands.
///
/// Built once at bootstrap: the provider registry and store are
/// constructed and injected into the [`Assistant`], never reached
/// through ambient globals.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn ActivityStore>,
    pub assistant: Arc<Assistant>,
}
