//! `farmhand run` — one-shot execution command.
//!
//! Sends a single message to the assistant, prints the response, and
//! exits.  Useful for scripting, piping, and quick CLI interactions.

use std::sync::Arc;

use fh_domain::config::Config;

use crate::bootstrap;

/// Execute a single assistant turn and print the response.
///
/// This is the entry point for `farmhand run "message"`.
pub async fn run(
    config: Arc<Config>,
    message: String,
    user: Option<String>,
) -> anyhow::Result<()> {
    let user_id = user.unwrap_or_else(|| config.chat.default_user.clone());

    let state = bootstrap::build_state(config)?;

    let outcome = state.assistant.respond(&message, &user_id).await;

    // Intent goes to stderr so stdout stays pipeable.
    eprintln!("\x1B[2m[{}]\x1B[0m", outcome.intent);
    println!("{}", outcome.message);

    Ok(())
}
