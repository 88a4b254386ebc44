//! `farmhand chat` — interactive REPL command.
//!
//! Opens a readline-based loop that classifies each line, runs the
//! matching workflow, and prints the response. Supports slash-commands
//! for switching users and other REPL conveniences.

use std::sync::Arc;

use fh_domain::config::Config;

use crate::bootstrap;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Public entry point
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Run the interactive chat REPL.
///
/// Boots the shared state, then enters a readline loop that accepts
/// user input and prints assistant responses to stdout.
pub async fn chat(config: Arc<Config>, user: Option<String>) -> anyhow::Result<()> {
    let mut user_id = user.unwrap_or_else(|| config.chat.default_user.clone());

    // 1. Boot the shared state.
    let state = bootstrap::build_state(config)?;

    // 2. Initialize rustyline editor with persistent history.
    let history_path = dirs::home_dir()
        .unwrap_or_default()
        .join(".farmhand")
        .join("chat_history.txt");
    if let Some(parent) = history_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let mut rl = rustyline::DefaultEditor::new()?;
    let _ = rl.load_history(&history_path);

    // 3. Print welcome message to stderr (keep stdout clean for output).
    eprintln!("FarmHand interactive chat");
    eprintln!("Logged in as: {user_id}  |  Type /help for commands, Ctrl+D to exit");
    eprintln!();

    // 4. REPL loop.
    loop {
        let readline = rl.readline("you> ");

        match readline {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                rl.add_history_entry(&line).ok();

                // ── Slash commands ────────────────────────────────
                if trimmed.starts_with('/') {
                    if handle_slash_command(trimmed, &mut user_id) {
                        break;
                    }
                    continue;
                }

                // ── User message → one assistant turn ────────────
                let outcome = state.assistant.respond(trimmed, &user_id).await;
                eprintln!("\x1B[2m[{}]\x1B[0m", outcome.intent);
                println!("{}", outcome.message);
                println!();
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                eprintln!("(Use Ctrl+D or /exit to quit)");
                continue;
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                break;
            }
            Err(e) => {
                eprintln!("\x1B[31mreadline error: {e}\x1B[0m");
                break;
            }
        }
    }

    // 5. Save history.
    rl.save_history(&history_path).ok();

    eprintln!("Goodbye!");
    Ok(())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Slash command handling
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Process a slash command.  Returns `true` if the REPL should exit.
fn handle_slash_command(input: &str, user_id: &mut String) -> bool {
    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0];
    let arg = parts.get(1).map(|s| s.trim());

    match cmd {
        "/exit" | "/quit" => return true,

        "/user" => {
            if let Some(name) = arg.filter(|s| !s.is_empty()) {
                *user_id = name.to_string();
                eprintln!("Switched to user: {user_id}");
            } else {
                eprintln!("Current user: {user_id}");
                eprintln!("Usage: /user <id>");
            }
        }

        "/clear" => {
            // ANSI escape: clear screen and move cursor to top-left.
            eprint!("\x1B[2J\x1B[1;1H");
        }

        "/help" => {
            eprintln!("Commands:");
            eprintln!("  /user <id>   Switch to another user's records");
            eprintln!("  /clear       Clear the screen");
            eprintln!("  /exit, /quit Exit the chat");
            eprintln!("  /help        Show this help");
            eprintln!();
            eprintln!("Anything else is sent to the assistant. Examples:");
            eprintln!("  I sold 50 pounds of tomatoes for $75");
            eprintln!("  How much did I make from sales this week?");
            eprintln!("  Give me a monthly report");
        }

        other => {
            eprintln!("Unknown command: {other}  (type /help for a list)");
        }
    }

    false
}
