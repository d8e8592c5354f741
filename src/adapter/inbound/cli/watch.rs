//! Handlers for the watch management commands: `list`, `check`, `add`
//! and `remove`.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde_json::json;
use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::{operator, output};
use crate::error::Result;
use crate::port::inbound::operator::watch::{CheckSummary, WatchSummary};

#[derive(Tabled)]
struct WatchRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Provider")]
    provider: String,
    #[tabled(rename = "Itinerary")]
    itinerary: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Last Check")]
    last_checked: String,
    #[tabled(rename = "Progress")]
    progress: String,
    #[tabled(rename = "Hold")]
    auto_hold: &'static str,
}

impl From<&WatchSummary> for WatchRow {
    fn from(watch: &WatchSummary) -> Self {
        Self {
            id: watch.id.clone(),
            provider: watch.provider.clone(),
            itinerary: watch.itinerary.clone(),
            price: watch
                .current_price
                .map_or_else(|| "-".to_string(), |p| p.to_string()),
            last_checked: format_checked(watch.last_checked_at),
            progress: format_progress(watch.progress),
            auto_hold: if watch.auto_hold { "auto" } else { "off" },
        }
    }
}

fn format_checked(at: Option<DateTime<Utc>>) -> String {
    at.map_or_else(
        || "never".to_string(),
        |at| at.format("%Y-%m-%d %H:%M").to_string(),
    )
}

fn format_progress(progress: f64) -> String {
    format!("{:>3.0}%", progress.clamp(0.0, 1.0) * 100.0)
}

/// List active watches.
pub async fn list(config_path: &Path) -> Result<()> {
    let config_toml = operator::read_config_toml(config_path)?;
    let watches = operator::operator()?.list_watches(&config_toml).await?;

    if output::is_json() {
        let rows: Vec<_> = watches
            .iter()
            .map(|w| {
                json!({
                    "id": w.id,
                    "provider": w.provider,
                    "itinerary": w.itinerary,
                    "current_price": w.current_price,
                    "last_checked_at": w.last_checked_at.map(|t| t.to_rfc3339()),
                    "progress": w.progress,
                    "auto_hold": w.auto_hold,
                })
            })
            .collect();
        output::json_output(json!({
            "command": "list",
            "watches": rows,
        }));
        return Ok(());
    }
    if output::is_quiet() {
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    if watches.is_empty() {
        output::note("No active watches");
        output::hint("add one with `farewatch add <file.json>`");
        return Ok(());
    }

    output::section(&format!("Active watches ({})", watches.len()));
    let rows: Vec<WatchRow> = watches.iter().map(WatchRow::from).collect();
    output::lines(&Table::new(rows).to_string());
    Ok(())
}

/// Run one manual check.
pub async fn check(config_path: &Path, id: &str) -> Result<()> {
    let config_toml = operator::read_config_toml(config_path)?;
    let summary = operator::operator()?.check_watch(&config_toml, id).await?;

    if output::is_json() {
        output::json_output(json!({
            "command": "check",
            "watch_id": summary.watch_id,
            "outcome": summary.outcome,
            "detail": summary.detail,
            "current_price": summary.current_price,
            "retired": summary.retired,
        }));
        return Ok(());
    }

    print_check(&summary);
    Ok(())
}

fn print_check(summary: &CheckSummary) {
    let outcome = match summary.outcome.as_str() {
        "decreased" => output::positive(&summary.outcome),
        "increased" | "check_failed" | "store_unavailable" => output::negative(&summary.outcome),
        _ => summary.outcome.clone(),
    };

    output::field("Watch", &summary.watch_id);
    output::field("Outcome", outcome);
    if let Some(price) = summary.current_price {
        output::field("Price", price);
    }
    match summary.outcome.as_str() {
        "check_failed" => output::warning(summary.detail.as_deref().unwrap_or("check failed")),
        "store_unavailable" => {
            output::warning(summary.detail.as_deref().unwrap_or("store unavailable"));
        }
        "already_running" => output::warning("A check for this watch is already running"),
        _ => {
            if let Some(detail) = &summary.detail {
                output::note(detail);
            }
        }
    }
    if summary.retired {
        output::success("Watch retired");
    }
}

/// Import a watch from a JSON file.
pub async fn add(config_path: &Path, file: &Path) -> Result<()> {
    let config_toml = operator::read_config_toml(config_path)?;
    let watch_json = operator::read_input(file)?;
    let id = operator::operator()?
        .add_watch(&config_toml, &watch_json)
        .await?;

    if output::is_json() {
        output::json_output(json!({
            "command": "add",
            "watch_id": id,
        }));
        return Ok(());
    }

    output::success(&format!("Watch {id} added"));
    Ok(())
}

/// Delete a watch.
pub async fn remove(config_path: &Path, id: &str) -> Result<()> {
    let config_toml = operator::read_config_toml(config_path)?;
    operator::operator()?.remove_watch(&config_toml, id).await?;

    if output::is_json() {
        output::json_output(json!({
            "command": "remove",
            "watch_id": id,
        }));
        return Ok(());
    }

    output::success(&format!("Watch {id} removed"));
    Ok(())
}
