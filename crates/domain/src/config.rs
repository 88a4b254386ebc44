use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LLM providers & generation profiles
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Configured provider adapters. The first entry is the default when
    /// a profile names no provider explicitly.
    #[serde(default = "d_providers")]
    pub providers: Vec<ProviderConfig>,
    /// Short, deterministic generation: classification, extraction, QUERY.
    #[serde(default = "d_fast_profile")]
    pub fast: ProfileConfig,
    /// Long-form generation for REPORT narratives.
    #[serde(default = "d_detailed_profile")]
    pub detailed: ProfileConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            providers: d_providers(),
            fast: d_fast_profile(),
            detailed: d_detailed_profile(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub id: String,
    pub kind: ProviderKind,
    pub base_url: String,
    /// watsonx.ai project scope; unused by other kinds.
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub default_model: Option<String>,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default = "d_120")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Watsonx,
    OpenaiCompat,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    /// Plaintext API key. Works, but prefer `env`.
    #[serde(default)]
    pub key: Option<String>,
    /// Name of an environment variable holding the API key.
    #[serde(default)]
    pub env: Option<String>,
}

/// Named generation profile resolved by the provider registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    Fast,
    Detailed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Provider id from `llm.providers`; defaults to the first entry.
    #[serde(default)]
    pub provider: Option<String>,
    /// Model override; defaults to the provider's `default_model`.
    #[serde(default)]
    pub model: Option<String>,
    pub max_new_tokens: u32,
    pub temperature: f32,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Store
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "d_backend")]
    pub backend: StoreBackend,
    /// Directory holding one data file per user.
    #[serde(default = "d_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: d_backend(),
            data_dir: d_data_dir(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Json,
    Sqlite,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Chat
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// User identifier when none is given on the command line.
    #[serde(default = "d_user")]
    pub default_user: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            default_user: d_user(),
        }
    }
}

// ── Serde default helpers ─────────────────────────────────────────────

fn d_providers() -> Vec<ProviderConfig> {
    vec![ProviderConfig {
        id: "watsonx".into(),
        kind: ProviderKind::Watsonx,
        base_url: "https://us-south.ml.cloud.ibm.com".into(),
        project_id: None,
        default_model: Some("ibm/granite-13b-instruct-v2".into()),
        auth: AuthConfig {
            key: None,
            env: Some("WATSONX_APIKEY".into()),
        },
        timeout_secs: d_120(),
    }]
}

fn d_fast_profile() -> ProfileConfig {
    ProfileConfig {
        provider: None,
        model: None,
        max_new_tokens: 256,
        temperature: 0.0,
    }
}

fn d_detailed_profile() -> ProfileConfig {
    ProfileConfig {
        provider: None,
        model: None,
        max_new_tokens: 1024,
        temperature: 0.7,
    }
}

fn d_backend() -> StoreBackend {
    StoreBackend::Sqlite
}

fn d_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn d_user() -> String {
    "testuser@gmail.com".into()
}

fn d_120() -> u64 {
    120
}
