//! Runtime control projection types for operator-facing adapters.
//!
//! Defines request and response types for starting the watch scheduler.

use async_trait::async_trait;

use crate::error::Result;

/// Runtime configuration overrides from CLI flags.
///
/// Values here take precedence over the configuration file.
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    /// Raw TOML configuration content.
    pub config_toml: String,

    /// Override for log level (e.g., "debug", "info", "warn").
    pub log_level: Option<String>,

    /// Whether to output logs as JSON.
    pub json_logs: bool,

    /// Override for database file path.
    pub database_path: Option<String>,

    /// Force Telegram notifications on.
    pub telegram_enabled: bool,

    /// JSON array of watches to run against an in-memory store instead of
    /// the database. Nothing is persisted.
    pub memory_watches_json: Option<String>,
}

/// Startup information snapshot for display.
#[derive(Debug, Clone)]
pub struct RunStartupSnapshot {
    /// Database file backing the watch store, or `:memory:` for a dry run.
    pub database: String,
    /// Providers with a configured API section.
    pub providers: Vec<String>,
    /// Whether Telegram delivery is enabled.
    pub telegram_enabled: bool,
    /// Seconds between store re-syncs.
    pub refresh_interval_secs: u64,
}

/// Runtime control use-cases for operator-facing adapters.
///
/// # Thread Safety
///
/// Implementations must be thread-safe (`Send + Sync`).
#[async_trait]
pub trait RuntimeOperator: Send + Sync {
    /// Resolve the configuration into a startup snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    fn prepare_run(&self, request: &RunRequest) -> Result<RunStartupSnapshot>;

    /// Run the scheduler until Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns an error if startup fails or the scheduler exits with an error.
    async fn execute_run(&self, request: RunRequest) -> Result<()>;
}
