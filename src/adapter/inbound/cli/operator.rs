//! Inbound operator accessor for CLI handlers.

use std::path::Path;
use std::sync::OnceLock;

use crate::error::{Error, Result};
use crate::port::inbound::operator::port::OperatorPort;

static OPERATOR: OnceLock<Box<dyn OperatorPort>> = OnceLock::new();

/// Installs the operator implementation used by CLI handlers.
pub fn install(operator: Box<dyn OperatorPort>) -> std::result::Result<(), Box<dyn OperatorPort>> {
    OPERATOR.set(operator)
}

/// Returns the configured operator capability surface for CLI handlers.
///
/// # Errors
/// Returns an error if `install` was never called.
pub fn operator() -> Result<&'static dyn OperatorPort> {
    OPERATOR
        .get()
        .map(AsRef::as_ref)
        .ok_or_else(|| Error::Connection("CLI operator not installed".to_string()))
}

/// Load config TOML from disk for operator-facing use-cases.
///
/// A missing file yields an empty document, so every setting falls back to
/// its default.
pub fn read_config_toml(path: &Path) -> Result<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(e.into()),
    }
}

/// Read a file named on the command line.
pub fn read_input(path: &Path) -> Result<String> {
    Ok(std::fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let content = read_config_toml(&dir.path().join("absent.toml")).unwrap();
        assert!(content.is_empty());
    }

    #[test]
    fn missing_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_input(&dir.path().join("absent.json")).is_err());
    }
}
