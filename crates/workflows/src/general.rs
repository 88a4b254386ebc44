//! GENERAL workflow: stateless pass-through advice.
//!
//! No persistence, no retrieval. The question is wrapped in a fixed
//! farm-assistant instruction and the gateway's response is returned
//! verbatim.

use fh_domain::config::Profile;
use fh_domain::error::Result;
use fh_providers::CompletionGateway;

use crate::prompts;

/// Answer a general question from the model's base knowledge.
pub async fn general_flow(gateway: &dyn CompletionGateway, text: &str) -> Result<String> {
    let prompt = prompts::general(text);
    gateway.complete(Profile::Fast, &prompt).await
}
