//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Configuration is loaded from a TOML file; provider API keys and Telegram
//! credentials come from the environment (or `.env`) only.
//!
//! # Example
//!
//! ```no_run
//! use farewatch::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use serde::Deserialize;

use super::logging::LoggingConfig;
use super::scheduler::SchedulerAppConfig;
use super::telegram::TelegramAppConfig;
use crate::adapter::outbound::provider::settings::{ProviderConfig, ProvidersConfig};
use crate::domain::Provider;
use crate::error::{ConfigError, Result};

/// Main application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Path to SQLite database file.
    ///
    /// Defaults to "farewatch.db" in the current directory.
    #[serde(default = "default_database_path")]
    pub database: String,

    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Scheduler timing and notification policy.
    #[serde(default)]
    pub scheduler: SchedulerAppConfig,

    /// Provider API endpoints. A provider without a section is disabled.
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Telegram notification configuration.
    #[serde(default)]
    pub telegram: TelegramAppConfig,
}

fn default_database_path() -> String {
    "farewatch.db".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database_path(),
            logging: LoggingConfig::default(),
            scheduler: SchedulerAppConfig::default(),
            providers: ProvidersConfig::default(),
            telegram: TelegramAppConfig::default(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// Reads `ALPHA_API_KEY` and `BETA_API_KEY` from the environment into
    /// the matching provider sections.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;

        // API keys are never read from the config file.
        if let Some(alpha) = config.providers.alpha.as_mut() {
            alpha.api_key = env_secret("ALPHA_API_KEY");
        }
        if let Some(beta) = config.providers.beta.as_mut() {
            beta.api_key = env_secret("BETA_API_KEY");
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<()> {
        if self.database.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "database" }.into());
        }
        if !self.logging.has_known_format() {
            return Err(ConfigError::InvalidValue {
                field: "logging.format",
                reason: format!("expected \"pretty\" or \"json\", got \"{}\"", self.logging.format),
            }
            .into());
        }

        let scheduler = &self.scheduler;
        if scheduler.refresh_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scheduler.refresh_interval_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if scheduler.idle_sleep_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scheduler.idle_sleep_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if scheduler.check_lease_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scheduler.check_lease_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        for (_, provider) in self.provider_sections() {
            validate_provider(provider)?;
        }
        Ok(())
    }

    /// Configured provider sections, in provider order.
    #[must_use]
    pub fn provider_sections(&self) -> Vec<(Provider, &ProviderConfig)> {
        let mut sections = Vec::new();
        if let Some(alpha) = &self.providers.alpha {
            sections.push((Provider::Alpha, alpha));
        }
        if let Some(beta) = &self.providers.beta {
            sections.push((Provider::Beta, beta));
        }
        sections
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}

fn validate_provider(provider: &ProviderConfig) -> Result<()> {
    if provider.api_url.trim().is_empty() {
        return Err(ConfigError::MissingField { field: "api_url" }.into());
    }
    if provider.timeout_ms == 0 {
        return Err(ConfigError::InvalidValue {
            field: "timeout_ms",
            reason: "must be greater than 0".to_string(),
        }
        .into());
    }
    if provider.connect_timeout_ms == 0 {
        return Err(ConfigError::InvalidValue {
            field: "connect_timeout_ms",
            reason: "must be greater than 0".to_string(),
        }
        .into());
    }
    if provider.retry_max_attempts == 0 {
        return Err(ConfigError::InvalidValue {
            field: "retry_max_attempts",
            reason: "must be at least 1".to_string(),
        }
        .into());
    }
    Ok(())
}

fn env_secret(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
