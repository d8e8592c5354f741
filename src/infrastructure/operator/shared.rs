//! Shared helper routines for operator implementations.

use tracing::error;

use crate::domain::WatchId;
use crate::error::{ConfigError, Error, Result};
use crate::infrastructure::config::settings::Config;

pub(super) fn map_app_result(
    result: std::result::Result<Result<()>, tokio::task::JoinError>,
) -> Result<()> {
    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(error)) => {
            error!(error = %error, "Application exited with error");
            Err(error)
        }
        Err(error) => {
            error!(error = %error, "Application task join failed");
            Err(Error::Connection(error.to_string()))
        }
    }
}

pub(super) fn parse_config(config_toml: &str) -> Result<Config> {
    Config::parse_toml(config_toml)
}

pub(super) fn parse_watch_id(raw: &str) -> Result<WatchId> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::MissingField { field: "watch_id" }.into());
    }
    Ok(WatchId::from(trimmed))
}
