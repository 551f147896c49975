//! CLI Adapter
//!
//! Command-line interface for dexwatch.
//! Uses clap derive macros for argument parsing.

mod commands;
pub mod format;

pub use commands::{
    BoostedCmd, CliApp, Command, DashboardCmd, DetailCmd, PortfolioCmd, SearchCmd, SortArg,
    ThemeAction, ThemeCmd, TokenRef, TokensCmd, WatchCmd,
};

use anyhow::Result;

use crate::config::Config;

/// Execute the CLI command
pub async fn execute(app: CliApp, config: &Config) -> Result<()> {
    commands::execute(app.command, config, app.json).await
}
