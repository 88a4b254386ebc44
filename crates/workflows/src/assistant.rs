//! The conversational entry point: classify, route, respond.
//!
//! [`Assistant`] holds the injected gateway and store handles and owns
//! the single flat dispatch decision of the system. Every error kind is
//! mapped to a user-facing message here, so callers (the REPL, the
//! one-shot command) always receive a printable string.

use std::sync::Arc;

use fh_domain::config::Profile;
use fh_domain::error::{Error, Result};
use fh_domain::record::Intent;
use fh_providers::CompletionGateway;
use fh_store::ActivityStore;

use crate::general::general_flow;
use crate::log::log_flow;
use crate::prompts;
use crate::query::query_flow;
use crate::report::report_flow;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Turn outcome
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The result of one user turn: the dispatched intent plus the response
/// text shown to the user.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub intent: Intent,
    pub message: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Assistant
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Wires the classifier, router, and workflows to their dependencies.
pub struct Assistant {
    gateway: Arc<dyn CompletionGateway>,
    store: Arc<dyn ActivityStore>,
}

impl Assistant {
    pub fn new(gateway: Arc<dyn CompletionGateway>, store: Arc<dyn ActivityStore>) -> Self {
        Self { gateway, store }
    }

    /// Classify the user's text into a raw intent label.
    ///
    /// Returns the trimmed model output verbatim. No validation happens
    /// here; unrecognized labels are the router's problem.
    pub async fn classify(&self, text: &str) -> Result<String> {
        let prompt = prompts::classification(text);
        let label = self.gateway.complete(Profile::Fast, &prompt).await?;
        Ok(label.trim().to_string())
    }

    /// Classify and dispatch one turn to the matching workflow.
    ///
    /// Unrecognized labels and classifier transport failures both fall
    /// back to the general workflow; failures inside the chosen workflow
    /// propagate to [`respond`](Self::respond) for message mapping.
    pub async fn route(&self, text: &str, user_id: &str) -> Result<TurnOutcome> {
        let intent = match self.classify(text).await {
            Ok(label) => {
                let intent = Intent::from_label(&label);
                tracing::debug!(label = %label, %intent, "intent classified");
                intent
            }
            Err(e) => {
                tracing::warn!(error = %e, "classification failed, falling back to GENERAL");
                Intent::General
            }
        };

        let message = match intent {
            Intent::Log => log_flow(&*self.gateway, &*self.store, text, user_id).await?,
            Intent::Query => query_flow(&*self.gateway, &*self.store, text, user_id).await?,
            Intent::Report => report_flow(&*self.gateway, &*self.store, text, user_id).await?,
            Intent::General => general_flow(&*self.gateway, text).await?,
        };

        Ok(TurnOutcome { intent, message })
    }

    /// Run one full turn, mapping every failure to user-facing text.
    pub async fn respond(&self, text: &str, user_id: &str) -> TurnOutcome {
        match self.route(text, user_id).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(error = %e, "turn failed");
                TurnOutcome {
                    intent: Intent::General,
                    message: user_message(&e),
                }
            }
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Error-to-message mapping
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

const EXAMPLE: &str = "\"I sold 50 pounds of tomatoes for $75\"";

/// Map an error kind to the message the user sees.
fn user_message(e: &Error) -> String {
    match e {
        Error::Validation { field: "action" } => format!(
            "⚠️ I couldn't tell what kind of activity that was \
             (sale, harvest, purchase, or expense). Try something like: {EXAMPLE}."
        ),
        Error::Validation { field: "item" } => format!(
            "⚠️ I couldn't tell what item that was about. Try something like: {EXAMPLE}."
        ),
        Error::Validation { field } => format!(
            "⚠️ I couldn't make out the {field} in that statement. \
             Try something like: {EXAMPLE}."
        ),
        Error::Extraction(_) => format!(
            "⚠️ I couldn't pull structured details out of that statement. \
             Try something like: {EXAMPLE}."
        ),
        Error::Store(_) | Error::Io(_) => {
            "⚠️ Something went wrong saving to your records. Please try again.".into()
        }
        _ => {
            "⚠️ Sorry, I'm having trouble reaching the language model right now. \
             Please try again in a moment."
                .into()
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
