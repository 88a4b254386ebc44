use fh_domain::config::Profile;
use fh_domain::error::Result;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Generation parameters
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Generation parameters resolved from a named profile.
#[derive(Debug, Clone, Default)]
pub struct GenParams {
    /// Model identifier override. When `None`, the provider uses its default.
    pub model: Option<String>,
    /// Maximum tokens generated for the response.
    pub max_new_tokens: u32,
    /// Sampling temperature. `0.0` selects deterministic decoding.
    pub temperature: f32,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Provider traits
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Trait that every text-completion adapter must implement.
///
/// Implementations are provider-specific adapters (watsonx.ai,
/// OpenAI-compatible) that translate between our internal request shape
/// and the wire format of each provider's HTTP API.
#[async_trait::async_trait]
pub trait TextCompletion: Send + Sync {
    /// Send a prompt and wait for the full completion text.
    async fn complete(&self, prompt: &str, params: &GenParams) -> Result<String>;

    /// A unique identifier for this provider instance.
    fn provider_id(&self) -> &str;
}

impl std::fmt::Debug for dyn TextCompletion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextCompletion")
            .field("provider_id", &self.provider_id())
            .finish()
    }
}

/// The workflow-facing gateway boundary.
///
/// Workflows name a [`Profile`] rather than a concrete provider or model,
/// so they can be exercised against a mock gateway in tests.
#[async_trait::async_trait]
pub trait CompletionGateway: Send + Sync {
    async fn complete(&self, profile: Profile, prompt: &str) -> Result<String>;
}
