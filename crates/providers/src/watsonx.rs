//! IBM watsonx.ai adapter.
//!
//! Implements the watsonx.ai text-generation API. Deterministic requests
//! (temperature 0) use greedy decoding; anything else switches to
//! sampling with the requested temperature, matching how the service
//! interprets the two decoding methods.

use crate::traits::{GenParams, TextCompletion};
use crate::util::{from_reqwest, resolve_api_key};
use fh_domain::config::ProviderConfig;
use fh_domain::error::{Error, Result};
use serde_json::Value;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Constants
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

const WATSONX_API_VERSION: &str = "2023-05-29";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Adapter struct
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A text-completion adapter for the watsonx.ai generation API.
///
/// The configured key is sent as a bearer token; for IBM Cloud this is
/// an IAM access token.
pub struct WatsonxProvider {
    id: String,
    base_url: String,
    api_key: String,
    project_id: Option<String>,
    default_model: String,
    client: reqwest::Client,
}

impl WatsonxProvider {
    /// Create a new provider from the deserialized provider config.
    pub fn from_config(cfg: &ProviderConfig) -> Result<Self> {
        let api_key = resolve_api_key(&cfg.auth)?;
        let default_model = cfg
            .default_model
            .clone()
            .unwrap_or_else(|| "ibm/granite-13b-instruct-v2".into());

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(from_reqwest)?;

        Ok(Self {
            id: cfg.id.clone(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key,
            project_id: cfg.project_id.clone(),
            default_model,
            client,
        })
    }

    // ── Internal helpers ───────────────────────────────────────────

    fn generation_url(&self) -> String {
        format!(
            "{}/ml/v1/text/generation?version={}",
            self.base_url, WATSONX_API_VERSION
        )
    }

    fn authed_post(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .post(url)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
    }

    fn build_generation_body(&self, prompt: &str, params: &GenParams) -> Value {
        let model = params
            .model
            .clone()
            .unwrap_or_else(|| self.default_model.clone());

        // watsonx distinguishes decoding methods rather than treating
        // temperature 0 as a sampling special case.
        let parameters = if params.temperature == 0.0 {
            serde_json::json!({
                "decoding_method": "greedy",
                "max_new_tokens": params.max_new_tokens,
            })
        } else {
            serde_json::json!({
                "decoding_method": "sample",
                "max_new_tokens": params.max_new_tokens,
                "temperature": params.temperature,
            })
        };

        let mut body = serde_json::json!({
            "model_id": model,
            "input": prompt,
            "parameters": parameters,
        });

        if let Some(ref project_id) = self.project_id {
            body["project_id"] = Value::String(project_id.clone());
        }

        body
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Response deserialization
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn parse_generation_response(provider: &str, json: &Value) -> Result<String> {
    json.get("results")
        .and_then(|r| r.as_array())
        .and_then(|r| r.first())
        .and_then(|r| r.get("generated_text"))
        .and_then(|t| t.as_str())
        .map(|t| t.to_string())
        .ok_or_else(|| Error::Provider {
            provider: provider.to_string(),
            message: "response missing results[0].generated_text".into(),
        })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait::async_trait]
impl TextCompletion for WatsonxProvider {
    async fn complete(&self, prompt: &str, params: &GenParams) -> Result<String> {
        let url = self.generation_url();
        let body = self.build_generation_body(prompt, params);

        tracing::debug!(provider = %self.id, url = %url, "watsonx generation request");

        let resp = self
            .authed_post(&url)
            .json(&body)
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = resp.status();
        let resp_text = resp.text().await.map_err(from_reqwest)?;

        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(Error::Auth(format!(
                "watsonx rejected credentials: HTTP {} - {}",
                status.as_u16(),
                resp_text
            )));
        }
        if !status.is_success() {
            return Err(Error::Provider {
                provider: self.id.clone(),
                message: format!("HTTP {} - {}", status.as_u16(), resp_text),
            });
        }

        let resp_json: Value = serde_json::from_str(&resp_text)?;
        parse_generation_response(&self.id, &resp_json)
    }

    fn provider_id(&self) -> &str {
        &self.id
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
