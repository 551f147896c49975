//! dexwatch - DexScreener token browser
//!
//! Lists tokens across chains, boosted listings and a local watchlist.

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use dexwatch::adapters::cli::{self, CliApp};
use dexwatch::config::load_config_or_default;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (DEXSCREENER_BASE_URL may live there)
    dotenvy::dotenv().ok();

    let app = CliApp::parse();
    let config = load_config_or_default(&app.config)
        .with_context(|| format!("Failed to load configuration from {}", app.config.display()))?;

    init_logging(log_level(app.verbose, app.debug, &config.logging.level));

    cli::execute(app, &config).await
}

/// `--debug` wins over `--verbose`, which wins over the configured level
fn log_level(verbose: bool, debug: bool, configured: &str) -> String {
    if debug {
        "debug".to_string()
    } else if verbose {
        "info".to_string()
    } else {
        configured.to_lowercase()
    }
}

fn init_logging(level: String) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_precedence() {
        assert_eq!(log_level(true, true, "warn"), "debug");
        assert_eq!(log_level(true, false, "warn"), "info");
        assert_eq!(log_level(false, false, "ERROR"), "error");
    }
}
