//! `farmhand config` — configuration utilities.

use fh_domain::config::Config;

/// Validate the loaded configuration beyond what serde enforces.
///
/// Returns `true` when the configuration is usable.
pub fn validate(config: &Config, config_path: &str) -> bool {
    let mut ok = true;

    if config.llm.providers.is_empty() {
        eprintln!("error: no providers configured under [llm]");
        ok = false;
    }

    let provider_ids: Vec<&str> = config
        .llm
        .providers
        .iter()
        .map(|p| p.id.as_str())
        .collect();

    for (name, profile) in [("fast", &config.llm.fast), ("detailed", &config.llm.detailed)] {
        if let Some(ref provider) = profile.provider {
            if !provider_ids.contains(&provider.as_str()) {
                eprintln!(
                    "error: [llm.{name}] references unknown provider '{provider}' \
                     (known: {provider_ids:?})"
                );
                ok = false;
            }
        }
        if profile.max_new_tokens == 0 {
            eprintln!("error: [llm.{name}] max_new_tokens must be > 0");
            ok = false;
        }
    }

    for provider in &config.llm.providers {
        if provider.auth.key.is_none() && provider.auth.env.is_none() {
            eprintln!(
                "warning: provider '{}' has no auth configured (set 'key' or 'env')",
                provider.id
            );
        }
    }

    if ok {
        println!("{config_path}: OK");
    }
    ok
}

/// Dump the resolved configuration (defaults applied) as TOML.
pub fn show(config: &Config) {
    match toml::to_string_pretty(config) {
        Ok(rendered) => println!("{rendered}"),
        Err(e) => eprintln!("error rendering config: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = Config::default();
        assert!(validate(&config, "farmhand.toml"));
    }

    #[test]
    fn unknown_profile_provider_fails_validation() {
        let mut config = Config::default();
        config.llm.fast.provider = Some("nope".into());
        assert!(!validate(&config, "farmhand.toml"));
    }

    #[test]
    fn empty_provider_list_fails_validation() {
        let mut config = Config::default();
        config.llm.providers.clear();
        assert!(!validate(&config, "farmhand.toml"));
    }
}
