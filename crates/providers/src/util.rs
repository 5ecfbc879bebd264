//! Shared utility functions for provider adapters.

use pf_domain::config::AuthConfig;
use pf_domain::error::{Error, Result};

/// Convert a [`reqwest::Error`] into the domain [`Error`] type.
///
/// Timeout errors map to [`Error::Timeout`]; everything else maps to
/// [`Error::Http`].
pub(crate) fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}

/// Resolve the API key from an [`AuthConfig`].
///
/// Precedence:
/// 1. `key` field (plaintext, logs a warning)
/// 2. `env` field (reads environment variable)
/// 3. Error
pub fn resolve_api_key(auth: &AuthConfig) -> Result<String> {
    if let Some(ref key) = auth.key {
        tracing::warn!(
            "API key loaded from plaintext config field 'key'; prefer 'env' instead"
        );
        return Ok(key.clone());
    }

    if let Some(ref env_var) = auth.env {
        return std::env::var(env_var).map_err(|_| {
            Error::Auth(format!(
                "environment variable '{}' not set or not valid UTF-8",
                env_var
            ))
        });
    }

    Err(Error::Auth(
        "no API key configured: set 'key' or 'env' in the provider auth block".into(),
    ))
}

/// Truncate upstream error bodies before they land in logs and attempt records.
pub(crate) fn truncate_error_body(body: &str, max_chars: usize) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_api_key_plaintext() {
        let auth = AuthConfig {
            key: Some("sk-test-123".into()),
            ..Default::default()
        };
        assert_eq!(resolve_api_key(&auth).unwrap(), "sk-test-123");
    }

    #[test]
    fn resolve_api_key_env_var() {
        let var_name = "PF_TEST_RESOLVE_ENV_KEY_1234";
        std::env::set_var(var_name, "env-secret-value");
        let auth = AuthConfig {
            env: Some(var_name.into()),
            ..Default::default()
        };
        assert_eq!(resolve_api_key(&auth).unwrap(), "env-secret-value");
        std::env::remove_var(var_name);
    }

    #[test]
    fn resolve_api_key_env_var_missing() {
        let auth = AuthConfig {
            env: Some("PF_TEST_NONEXISTENT_VAR_8888".into()),
            ..Default::default()
        };
        let err = resolve_api_key(&auth).unwrap_err();
        assert!(err.to_string().contains("PF_TEST_NONEXISTENT_VAR_8888"));
    }

    #[test]
    fn resolve_api_key_plaintext_takes_precedence_over_env() {
        let auth = AuthConfig {
            key: Some("plaintext-wins".into()),
            env: Some("PF_TEST_SHOULD_NOT_BE_READ".into()),
            ..Default::default()
        };
        assert_eq!(resolve_api_key(&auth).unwrap(), "plaintext-wins");
    }

    #[test]
    fn resolve_api_key_no_config() {
        let err = resolve_api_key(&AuthConfig::default()).unwrap_err();
        assert!(err.to_string().contains("no API key configured"));
    }

    #[test]
    fn truncate_keeps_short_bodies() {
        assert_eq!(truncate_error_body("  rate limited  ", 50), "rate limited");
    }

    #[test]
    fn truncate_cuts_on_char_boundary() {
        let body = "é".repeat(10);
        assert_eq!(truncate_error_body(&body, 3), "ééé…");
    }
}
