//! CLI module graph.

pub mod command;
pub mod operator;
pub mod output;
pub mod run;
pub mod watch;
