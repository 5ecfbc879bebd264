use pf_domain::config::{Config, ConfigSeverity};

/// Parse and validate the config, printing any issues.
///
/// Returns `false` when at least one issue is an error.
pub fn validate(config: &Config, config_path: &str) -> bool {
    let issues = config.validate();

    if issues.is_empty() {
        println!("Config OK ({config_path})");
        return true;
    }

    let error_count = issues
        .iter()
        .filter(|e| e.severity == ConfigSeverity::Error)
        .count();
    let warning_count = issues.len() - error_count;

    for issue in &issues {
        println!("{issue}");
    }

    println!("\n{error_count} error(s), {warning_count} warning(s) in {config_path}");

    error_count == 0
}

const REDACTED: &str = "[redacted]";

/// Dump the resolved config (with all defaults filled in) as TOML.
/// Plaintext provider keys are redacted.
pub fn show(config: &Config) -> anyhow::Result<()> {
    print!("{}", render(config)?);
    Ok(())
}

fn render(config: &Config) -> anyhow::Result<String> {
    let mut shown = config.clone();
    for provider in &mut shown.llm.providers {
        if provider.auth.key.is_some() {
            provider.auth.key = Some(REDACTED.into());
        }
    }
    Ok(toml::to_string_pretty(&shown)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_redacts_plaintext_keys_but_keeps_env_names() {
        let config: Config = toml::from_str(
            r#"
[[llm.providers]]
id = "openai"
base_url = "https://api.openai.com/v1"
auth = { key = "sk-live-abc123" }

[[llm.providers]]
id = "groq"
base_url = "https://api.groq.com/openai/v1"
auth = { env = "GROQ_API_KEY" }
"#,
        )
        .unwrap();

        let out = render(&config).unwrap();
        assert!(!out.contains("sk-live-abc123"));
        assert!(out.contains(REDACTED));
        assert!(out.contains("GROQ_API_KEY"));
    }
}
