//! Command-line interface definitions.
//!
//! Defines the CLI structure for farewatch using `clap`: running the
//! scheduler plus the small set of watch management commands.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Airfare watch scheduler with auto-hold on price drops
#[derive(Parser, Debug)]
#[command(name = "farewatch")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = "config.toml")]
    pub config: PathBuf,

    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Debug, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Top-level subcommands for the farewatch CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the watch scheduler (foreground, until Ctrl+C)
    Run(RunArgs),

    /// List active watches with their check progress
    List,

    /// Check one watch now
    Check(WatchIdArg),

    /// Import a watch from a JSON file
    Add(AddArgs),

    /// Delete a watch
    Remove(WatchIdArg),
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Override log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    /// Override the database file path
    #[arg(long)]
    pub database: Option<PathBuf>,

    /// Enable Telegram notifications regardless of config
    #[arg(long = "telegram")]
    pub telegram_enabled: bool,

    /// Run against an in-memory store seeded from a JSON array of watches
    #[arg(long, value_name = "FILE")]
    pub memory: Option<PathBuf>,
}

/// Shared argument for commands that address one watch.
#[derive(Parser, Debug)]
pub struct WatchIdArg {
    /// Watch identifier
    pub id: String,
}

/// Arguments for the `add` subcommand.
#[derive(Parser, Debug)]
pub struct AddArgs {
    /// JSON file describing the watch
    pub file: PathBuf,
}
