//! Handler for the `run` command.

use std::path::Path;

use crate::adapter::inbound::cli::command::RunArgs;
use crate::adapter::inbound::cli::{operator, output};
use crate::error::Result;
use crate::port::inbound::operator::runtime::{RunRequest, RunStartupSnapshot};

/// Execute the run command.
pub async fn execute(config_path: &Path, args: &RunArgs) -> Result<()> {
    let config_toml = operator::read_config_toml(config_path)?;
    let memory_watches_json = args
        .memory
        .as_deref()
        .map(operator::read_input)
        .transpose()?;
    let machine_output = output::is_json();
    let request = build_run_request(args, config_toml, memory_watches_json, machine_output);
    let service = operator::operator()?;

    if !output::is_quiet() || machine_output {
        let startup = service.prepare_run(&request)?;
        print_startup_config(&startup);
    }

    service.execute_run(request).await
}

fn build_run_request(
    args: &RunArgs,
    config_toml: String,
    memory_watches_json: Option<String>,
    force_json_logs: bool,
) -> RunRequest {
    RunRequest {
        config_toml,
        log_level: args.log_level.clone(),
        json_logs: args.json_logs || force_json_logs,
        database_path: args
            .database
            .as_ref()
            .map(|path| path.to_string_lossy().to_string()),
        telegram_enabled: args.telegram_enabled,
        memory_watches_json,
    }
}

fn print_startup_config(snapshot: &RunStartupSnapshot) {
    let providers_display = if snapshot.providers.is_empty() {
        "none".to_string()
    } else {
        snapshot.providers.join(", ")
    };

    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Database", &snapshot.database);
    output::field("Providers", &providers_display);
    output::field(
        "Telegram",
        if snapshot.telegram_enabled { "on" } else { "off" },
    );
    if output::verbosity() > 0 {
        output::field("Re-sync", format!("{}s", snapshot.refresh_interval_secs));
    }

    if snapshot.providers.is_empty() {
        output::warning("No provider configured - every check will fail");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_output_forces_json_logs() {
        let args = RunArgs {
            log_level: None,
            json_logs: false,
            database: Some("alt.db".into()),
            telegram_enabled: false,
            memory: None,
        };
        let request = build_run_request(&args, String::new(), None, true);
        assert!(request.json_logs);
        assert_eq!(request.database_path.as_deref(), Some("alt.db"));
        assert!(request.memory_watches_json.is_none());
    }
}
