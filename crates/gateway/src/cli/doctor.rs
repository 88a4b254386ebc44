//! `farmhand doctor` — diagnostic checks.
//!
//! Verifies the pieces a working installation needs: a parseable config,
//! a writable data directory, and resolvable provider credentials.
//! Checks are local; no gateway calls are made.

use fh_domain::config::Config;

/// Run all checks and report to stdout. Returns `true` when everything
/// passed.
pub fn run(config: &Config, config_path: &str) -> bool {
    let mut passed = true;

    println!("farmhand doctor");
    println!();

    // ── Config ──────────────────────────────────────────────────────
    if std::path::Path::new(config_path).exists() {
        check(true, &format!("config file found at {config_path}"));
    } else {
        check(
            true,
            &format!("no config file at {config_path}, using defaults"),
        );
    }
    passed &= check(
        !config.llm.providers.is_empty(),
        "at least one provider configured",
    );

    // ── Data directory ──────────────────────────────────────────────
    passed &= check(data_dir_writable(config), "data directory is writable");

    // ── Provider auth ───────────────────────────────────────────────
    for provider in &config.llm.providers {
        let resolvable = provider.auth.key.is_some()
            || provider
                .auth
                .env
                .as_deref()
                .map(|var| std::env::var(var).is_ok())
                .unwrap_or(false);
        passed &= check(
            resolvable,
            &format!("provider '{}' credentials resolvable", provider.id),
        );
    }

    println!();
    if passed {
        println!("All checks passed.");
    } else {
        println!("Some checks failed.");
    }
    passed
}

fn check(ok: bool, label: &str) -> bool {
    let mark = if ok { "✓" } else { "✗" };
    println!("  {mark} {label}");
    ok
}

fn data_dir_writable(config: &Config) -> bool {
    let dir = &config.store.data_dir;
    if std::fs::create_dir_all(dir).is_err() {
        return false;
    }
    let probe = dir.join(".doctor_probe");
    let ok = std::fs::write(&probe, b"ok").is_ok();
    let _ = std::fs::remove_file(&probe);
    ok
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doctor_passes_with_key_auth_and_temp_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.store.data_dir = dir.path().to_path_buf();
        config.llm.providers[0].auth.key = Some("test".into());
        config.llm.providers[0].auth.env = None;

        assert!(run(&config, "nonexistent.toml"));
    }

    #[test]
    fn doctor_fails_when_credentials_unresolvable() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.store.data_dir = dir.path().to_path_buf();
        config.llm.providers[0].auth.key = None;
        config.llm.providers[0].auth.env = Some("FH_DOCTOR_UNSET_VAR_999".into());

        assert!(!run(&config, "nonexistent.toml"));
    }
}
