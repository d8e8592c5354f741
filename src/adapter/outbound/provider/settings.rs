//! Provider API configuration.

use serde::Deserialize;

/// HTTP settings for one provider API.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the provider API.
    pub api_url: String,
    /// Request timeout in milliseconds.
    #[serde(default = "default_http_timeout_ms")]
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds.
    #[serde(default = "default_http_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Maximum number of attempts for transient failures.
    #[serde(default = "default_http_retry_max_attempts")]
    pub retry_max_attempts: u32,
    /// Backoff between retries in milliseconds.
    #[serde(default = "default_http_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    /// API key, read from the environment rather than the config file.
    #[serde(skip)]
    pub api_key: Option<String>,
}

const fn default_http_timeout_ms() -> u64 {
    10_000
}

const fn default_http_connect_timeout_ms() -> u64 {
    3000
}

const fn default_http_retry_max_attempts() -> u32 {
    3
}

const fn default_http_retry_backoff_ms() -> u64 {
    500
}

impl ProviderConfig {
    /// Settings for `api_url` with default timeouts and retries.
    #[must_use]
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            timeout_ms: default_http_timeout_ms(),
            connect_timeout_ms: default_http_connect_timeout_ms(),
            retry_max_attempts: default_http_retry_max_attempts(),
            retry_backoff_ms: default_http_retry_backoff_ms(),
            api_key: None,
        }
    }
}

/// Per-provider sections. A provider without a section is disabled.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub alpha: Option<ProviderConfig>,
    #[serde(default)]
    pub beta: Option<ProviderConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_defaults_fill_http_settings() {
        let config: ProvidersConfig = toml::from_str(
            r#"
            [alpha]
            api_url = "https://alpha.test/api"
            retry_max_attempts = 1
            "#,
        )
        .unwrap();

        let alpha = config.alpha.unwrap();
        assert_eq!(alpha.api_url, "https://alpha.test/api");
        assert_eq!(alpha.retry_max_attempts, 1);
        assert_eq!(alpha.timeout_ms, 10_000);
        assert!(alpha.api_key.is_none());
        assert!(config.beta.is_none());
    }
}
