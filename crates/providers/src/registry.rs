//! Provider registry.
//!
//! Constructs and holds all configured completion adapters. At startup the
//! registry reads the [`LlmConfig`], resolves authentication (env vars,
//! direct keys), instantiates the appropriate adapter for each configured
//! provider, and binds the two named generation profiles to concrete
//! (provider, parameters) pairs.

use crate::openai_compat::OpenAiCompatProvider;
use crate::traits::{CompletionGateway, GenParams, TextCompletion};
use crate::watsonx::WatsonxProvider;
use fh_domain::config::{LlmConfig, Profile, ProfileConfig, ProviderKind};
use fh_domain::error::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Resolved profile
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A generation profile bound to a provider id and concrete parameters.
#[derive(Debug, Clone)]
struct ResolvedProfile {
    provider_id: String,
    params: GenParams,
}

fn resolve_profile(cfg: &ProfileConfig, default_provider: &str) -> ResolvedProfile {
    ResolvedProfile {
        provider_id: cfg
            .provider
            .clone()
            .unwrap_or_else(|| default_provider.to_string()),
        params: GenParams {
            model: cfg.model.clone(),
            max_new_tokens: cfg.max_new_tokens,
            temperature: cfg.temperature,
        },
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ProviderRegistry
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Holds all instantiated completion providers and profile bindings.
///
/// Built once at bootstrap and injected into the workflows as an
/// `Arc<dyn CompletionGateway>` — the process-wide model handles live
/// here, not in ambient globals.
#[derive(Debug)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn TextCompletion>>,
    fast: ResolvedProfile,
    detailed: ResolvedProfile,
}

impl ProviderRegistry {
    /// Build the registry from the application's [`LlmConfig`].
    ///
    /// Each entry in `config.providers` is instantiated using the
    /// appropriate adapter based on its `kind`. Auth keys are resolved
    /// eagerly (env vars are read at this point).
    ///
    /// Providers that fail to initialize are logged and skipped rather
    /// than aborting startup; a profile bound to a missing provider
    /// fails at call time instead.
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let mut providers: HashMap<String, Arc<dyn TextCompletion>> = HashMap::new();

        for pc in &config.providers {
            let result: Result<Arc<dyn TextCompletion>> = match pc.kind {
                ProviderKind::Watsonx => {
                    WatsonxProvider::from_config(pc).map(|p| Arc::new(p) as Arc<dyn TextCompletion>)
                }
                ProviderKind::OpenaiCompat => OpenAiCompatProvider::from_config(pc)
                    .map(|p| Arc::new(p) as Arc<dyn TextCompletion>),
            };

            match result {
                Ok(provider) => {
                    tracing::info!(
                        provider_id = %pc.id,
                        kind = ?pc.kind,
                        "registered completion provider"
                    );
                    providers.insert(pc.id.clone(), provider);
                }
                Err(e) => {
                    tracing::warn!(
                        provider_id = %pc.id,
                        kind = ?pc.kind,
                        error = %e,
                        "failed to initialize completion provider, skipping"
                    );
                }
            }
        }

        let default_provider = config
            .providers
            .first()
            .map(|pc| pc.id.as_str())
            .ok_or_else(|| Error::Config("no providers configured under [llm]".into()))?;

        Ok(Self {
            providers,
            fast: resolve_profile(&config.fast, default_provider),
            detailed: resolve_profile(&config.detailed, default_provider),
        })
    }

    fn profile(&self, profile: Profile) -> &ResolvedProfile {
        match profile {
            Profile::Fast => &self.fast,
            Profile::Detailed => &self.detailed,
        }
    }

    /// Look up the provider bound to a profile.
    fn provider_for(&self, profile: Profile) -> Result<&Arc<dyn TextCompletion>> {
        let resolved = self.profile(profile);
        self.providers.get(&resolved.provider_id).ok_or_else(|| {
            Error::Config(format!(
                "profile references provider '{}' which did not initialize",
                resolved.provider_id
            ))
        })
    }
}

#[async_trait::async_trait]
impl CompletionGateway for ProviderRegistry {
    async fn complete(&self, profile: Profile, prompt: &str) -> Result<String> {
        let provider = self.provider_for(profile)?;
        let params = &self.profile(profile).params;

        tracing::debug!(
            provider_id = %provider.provider_id(),
            profile = ?profile,
            prompt_chars = prompt.len(),
            "gateway completion"
        );

        provider.complete(prompt, params).await
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use fh_domain::config::{AuthConfig, ProviderConfig};

    fn config_with_key() -> LlmConfig {
        LlmConfig {
            providers: vec![ProviderConfig {
                id: "watsonx".into(),
                kind: ProviderKind::Watsonx,
                base_url: "https://us-south.ml.cloud.ibm.com".into(),
                project_id: None,
                default_model: Some("ibm/granite-13b-instruct-v2".into()),
                auth: AuthConfig {
                    key: Some("test-token".into()),
                    env: None,
                },
                timeout_secs: 30,
            }],
            ..LlmConfig::default()
        }
    }

    #[test]
    fn registry_binds_profiles_to_first_provider() {
        let registry = ProviderRegistry::from_config(&config_with_key()).unwrap();
        assert_eq!(registry.fast.provider_id, "watsonx");
        assert_eq!(registry.detailed.provider_id, "watsonx");
        assert_eq!(registry.fast.params.max_new_tokens, 256);
        assert_eq!(registry.detailed.params.max_new_tokens, 1024);
    }

    #[test]
    fn unresolvable_auth_skips_provider_but_registry_builds() {
        let mut config = config_with_key();
        config.providers[0].auth = AuthConfig {
            key: None,
            env: Some("FH_TEST_DEFINITELY_UNSET_4321".into()),
        };

        let registry = ProviderRegistry::from_config(&config).unwrap();
        let err = registry.provider_for(Profile::Fast).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn empty_provider_list_is_config_error() {
        let config = LlmConfig {
            providers: vec![],
            ..LlmConfig::default()
        };
        let err = ProviderRegistry::from_config(&config).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn profile_provider_override_is_respected() {
        let mut config = config_with_key();
        config.fast.provider = Some("other".into());

        let registry = ProviderRegistry::from_config(&config).unwrap();
        assert_eq!(registry.fast.provider_id, "other");
        // "other" is not registered, so resolution fails at call time.
        assert!(registry.provider_for(Profile::Fast).is_err());
        // The detailed profile still resolves.
        assert!(registry.provider_for(Profile::Detailed).is_ok());
    }
}
