//! OpenAI-compatible completions adapter.
//!
//! Talks to any endpoint exposing the `/completions` wire format
//! (OpenAI, vLLM, llama.cpp server, Ollama's compat layer). Useful for
//! running the assistant against a local model instead of watsonx.

use crate::traits::{GenParams, TextCompletion};
use crate::util::{from_reqwest, resolve_api_key};
use fh_domain::config::ProviderConfig;
use fh_domain::error::{Error, Result};
use serde_json::Value;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Adapter struct
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A text-completion adapter for OpenAI-compatible endpoints.
pub struct OpenAiCompatProvider {
    id: String,
    base_url: String,
    api_key: String,
    default_model: String,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    /// Create a new provider from the deserialized provider config.
    pub fn from_config(cfg: &ProviderConfig) -> Result<Self> {
        let api_key = resolve_api_key(&cfg.auth)?;
        let default_model = cfg
            .default_model
            .clone()
            .unwrap_or_else(|| "gpt-4o-mini".into());

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(from_reqwest)?;

        Ok(Self {
            id: cfg.id.clone(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key,
            default_model,
            client,
        })
    }

    // ── Internal helpers ───────────────────────────────────────────

    fn authed_post(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .post(url)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
    }

    fn build_completion_body(&self, prompt: &str, params: &GenParams) -> Value {
        let model = params
            .model
            .clone()
            .unwrap_or_else(|| self.default_model.clone());

        serde_json::json!({
            "model": model,
            "prompt": prompt,
            "max_tokens": params.max_new_tokens,
            "temperature": params.temperature,
        })
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Response deserialization
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn parse_completion_response(provider: &str, json: &Value) -> Result<String> {
    json.get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(|c| c.get("text"))
        .and_then(|t| t.as_str())
        .map(|t| t.to_string())
        .ok_or_else(|| Error::Provider {
            provider: provider.to_string(),
            message: "response missing choices[0].text".into(),
        })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait::async_trait]
impl TextCompletion for OpenAiCompatProvider {
    async fn complete(&self, prompt: &str, params: &GenParams) -> Result<String> {
        let url = format!("{}/completions", self.base_url);
        let body = self.build_completion_body(prompt, params);

        tracing::debug!(provider = %self.id, url = %url, "openai_compat completion request");

        let resp = self
            .authed_post(&url)
            .json(&body)
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = resp.status();
        let resp_text = resp.text().await.map_err(from_reqwest)?;

        if !status.is_success() {
            return Err(Error::Provider {
                provider: self.id.clone(),
                message: format!("HTTP {} - {}", status.as_u16(), resp_text),
            });
        }

        let resp_json: Value = serde_json::from_str(&resp_text)?;
        parse_completion_response(&self.id, &resp_json)
    }

    fn provider_id(&self) -> &str {
        &self.id
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use fh_domain::config::{AuthConfig, ProviderKind};

    fn test_provider() -> OpenAiCompatProvider {
        OpenAiCompatProvider::from_config(&ProviderConfig {
            id: "local".into(),
            kind: ProviderKind::OpenaiCompat,
            base_url: "http://localhost:11434/v1/".into(),
            project_id: None,
            default_model: Some("llama3".into()),
            auth: AuthConfig {
                key: Some("unused".into()),
                env: None,
            },
            timeout_secs: 30,
        })
        .unwrap()
    }

    #[test]
    fn body_uses_default_model_when_unset() {
        let provider = test_provider();
        let params = GenParams {
            model: None,
            max_new_tokens: 128,
            temperature: 0.0,
        };
        let body = provider.build_completion_body("hello", &params);

        assert_eq!(body["model"], "llama3");
        assert_eq!(body["prompt"], "hello");
        assert_eq!(body["max_tokens"], 128);
    }

    #[test]
    fn body_model_override_wins() {
        let provider = test_provider();
        let params = GenParams {
            model: Some("mistral".into()),
            max_new_tokens: 64,
            temperature: 0.5,
        };
        let body = provider.build_completion_body("hi", &params);
        assert_eq!(body["model"], "mistral");
    }

    #[test]
    fn parse_response_extracts_choice_text() {
        let json = serde_json::json!({
            "choices": [{"text": "QUERY", "index": 0}]
        });
        let text = parse_completion_response("local", &json).unwrap();
        assert_eq!(text, "QUERY");
    }

    #[test]
    fn parse_response_empty_choices_is_provider_error() {
        let json = serde_json::json!({"choices": []});
        let err = parse_completion_response("local", &json).unwrap_err();
        assert!(matches!(err, Error::Provider { .. }));
    }
}
