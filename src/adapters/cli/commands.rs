//! CLI Command Handlers
//!
//! Implementation of all CLI commands for the dexwatch token browser.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

use super::format::{format_pct, format_price, format_usd, format_usd_compact, truncate_address};
use crate::application::{AppContext, ScreenState, TokenDetail};
use crate::config::{Config, DEFAULT_CONFIG_PATH};
use crate::domain::aggregator::{filter_by_query, SortField, SortState};
use crate::domain::price_history::TimeFrame;
use crate::domain::theme::Theme;
use crate::domain::token::Token;
use crate::domain::watchlist::WatchlistEntry;
use crate::ports::models::{BoostedToken, RawPair, TokenProfile};

/// dexwatch - DexScreener token browser
#[derive(Parser, Debug)]
#[command(
    name = "dexwatch",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = "Browse DexScreener tokens, boosted listings and a local watchlist",
    long_about = "dexwatch searches DexScreener across chains, merges pairs into one row \
                  per token, and keeps a persisted watchlist and portfolio value."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Top tokens across chains plus portfolio summary
    Dashboard(DashboardCmd),

    /// Full token list with filtering and sorting
    Tokens(TokensCmd),

    /// Boosted tokens
    Boosted(BoostedCmd),

    /// Latest token profiles
    Profiles,

    /// Free-text pair search
    Search(SearchCmd),

    /// All pairs for a token
    Pairs(TokenRef),

    /// Token detail with chart data
    Detail(DetailCmd),

    /// Manage the watchlist
    #[command(subcommand)]
    Watch(WatchCmd),

    /// Manage the portfolio value
    #[command(subcommand)]
    Portfolio(PortfolioCmd),

    /// Show or change the theme preference
    Theme(ThemeCmd),
}

#[derive(Parser, Debug)]
pub struct DashboardCmd {
    /// Refresh every SECS seconds until interrupted
    #[arg(long, value_name = "SECS")]
    pub watch: Option<u64>,
}

#[derive(Parser, Debug)]
pub struct TokensCmd {
    /// Case-insensitive match on symbol, name or address
    #[arg(short, long, value_name = "TEXT")]
    pub query: Option<String>,

    /// Sort column
    #[arg(short, long, value_enum, default_value = "volume")]
    pub sort: SortArg,

    /// Sort ascending instead of descending
    #[arg(long)]
    pub asc: bool,

    /// Maximum rows to print
    #[arg(short, long, value_name = "N")]
    pub limit: Option<usize>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    Name,
    Price,
    Change,
    Volume,
    MarketCap,
}

impl From<SortArg> for SortField {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Name => SortField::Name,
            SortArg::Price => SortField::Price,
            SortArg::Change => SortField::Change,
            SortArg::Volume => SortField::Volume,
            SortArg::MarketCap => SortField::MarketCap,
        }
    }
}

#[derive(Parser, Debug)]
pub struct BoostedCmd {
    /// Show the latest boosts instead of the top ones
    #[arg(long)]
    pub latest: bool,
}

#[derive(Parser, Debug)]
pub struct SearchCmd {
    /// Token name, symbol or address
    #[arg(value_name = "QUERY")]
    pub query: String,
}

#[derive(Parser, Debug)]
pub struct TokenRef {
    /// Chain id (e.g. solana, ethereum)
    #[arg(value_name = "CHAIN")]
    pub chain: String,

    /// Token address
    #[arg(value_name = "ADDRESS")]
    pub address: String,
}

#[derive(Parser, Debug)]
pub struct DetailCmd {
    #[command(flatten)]
    pub token: TokenRef,

    /// Chart timeframe: 1D, 1W, 1M or 1Y
    #[arg(short, long, default_value = "1D")]
    pub timeframe: TimeFrame,
}

#[derive(Subcommand, Debug)]
pub enum WatchCmd {
    /// Add a token by chain and address
    Add(TokenRef),
    /// Remove an entry by id
    Remove {
        #[arg(value_name = "ID")]
        id: String,
    },
    /// List tracked tokens
    List,
}

#[derive(Subcommand, Debug)]
pub enum PortfolioCmd {
    /// Set the portfolio value in USD
    Set {
        #[arg(value_name = "VALUE")]
        value: f64,
    },
}

#[derive(Parser, Debug)]
pub struct ThemeCmd {
    #[command(subcommand)]
    pub action: Option<ThemeAction>,
}

#[derive(Subcommand, Debug)]
pub enum ThemeAction {
    /// Print the stored preference
    Get,
    /// Store a preference: light, dark or system
    Set {
        #[arg(value_name = "THEME")]
        theme: Theme,
    },
}

/// Execute the CLI command
pub async fn execute(command: Command, config: &Config, json: bool) -> Result<()> {
    let mut ctx = AppContext::from_config(config).context("Failed to initialise dexwatch")?;

    match command {
        Command::Dashboard(cmd) => dashboard_command(&ctx, cmd, json).await,
        Command::Tokens(cmd) => tokens_command(&ctx, cmd, json).await,
        Command::Boosted(cmd) => boosted_command(&ctx, cmd, json).await,
        Command::Profiles => profiles_command(&ctx, json).await,
        Command::Search(cmd) => search_command(&ctx, cmd, json).await,
        Command::Pairs(cmd) => pairs_command(&ctx, cmd, json).await,
        Command::Detail(cmd) => detail_command(&ctx, cmd, json).await,
        Command::Watch(cmd) => watch_command(&mut ctx, cmd, json).await,
        Command::Portfolio(cmd) => portfolio_command(&mut ctx, cmd),
        Command::Theme(cmd) => theme_command(&ctx, cmd),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Handle dashboard command
async fn dashboard_command(ctx: &AppContext, cmd: DashboardCmd, json: bool) -> Result<()> {
    let Some(secs) = cmd.watch else {
        let tokens = ctx.market.dashboard().await;
        return print_dashboard(ctx, &tokens, json);
    };

    let screen: ScreenState<Vec<Token>> = ScreenState::new();
    let mut ticker = tokio::time::interval(Duration::from_secs(secs.max(1)));

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if ctx.market.refresh_dashboard(&screen).await {
                    if let Some(tokens) = screen.current() {
                        print_dashboard(ctx, &tokens, json)?;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown signal received");
                break;
            }
        }
    }
    Ok(())
}

fn print_dashboard(ctx: &AppContext, tokens: &[Token], json: bool) -> Result<()> {
    if json {
        return print_json(tokens);
    }

    println!("┌─────────────────────────────────────┐");
    println!("│  dexwatch - Dashboard               │");
    println!("├─────────────────────────────────────┤");
    println!("│  Portfolio: {:<24}│", format_usd(ctx.watchlist.portfolio_value()));
    println!("│  Watching:  {:<24}│", ctx.watchlist.len());
    println!("└─────────────────────────────────────┘");
    print_token_table(tokens);
    Ok(())
}

/// Handle tokens command
async fn tokens_command(ctx: &AppContext, cmd: TokensCmd, json: bool) -> Result<()> {
    let tokens = ctx.market.token_list().await;

    let mut rows: Vec<Token> = filter_by_query(&tokens, cmd.query.as_deref().unwrap_or(""))
        .into_iter()
        .cloned()
        .collect();

    sort_state(cmd.sort.into(), cmd.asc).apply(&mut rows);

    if let Some(limit) = cmd.limit {
        rows.truncate(limit);
    }

    if json {
        return print_json(&rows);
    }
    print_token_table(&rows);
    println!("\n{} of {} tokens", rows.len(), tokens.len());
    Ok(())
}

/// Same sequence of column clicks the list view uses: pick the column,
/// then pick it again to flip to ascending.
fn sort_state(field: SortField, ascending: bool) -> SortState {
    let mut sort = SortState::default();
    if sort.field != field {
        sort.select(field);
    }
    if ascending {
        sort.select(field);
    }
    sort
}

fn print_token_table(tokens: &[Token]) {
    if tokens.is_empty() {
        println!("No tokens found");
        return;
    }

    println!(
        "{:<4} {:<10} {:<10} {:>14} {:>10} {:>10} {:>10}",
        "#", "SYMBOL", "CHAIN", "PRICE", "24H", "VOLUME", "LIQUIDITY"
    );
    for (i, token) in tokens.iter().enumerate() {
        println!(
            "{:<4} {:<10} {:<10} {:>14} {:>10} {:>10} {:>10}",
            i + 1,
            truncate_symbol(&token.symbol),
            token.chain_id,
            format_price(token.price_usd.as_deref()),
            format_pct(token.price_change_h24),
            format_usd_compact(token.volume_h24),
            format_usd_compact(token.liquidity_usd),
        );
    }
}

fn truncate_symbol(symbol: &str) -> String {
    if symbol.chars().count() > 10 {
        symbol.chars().take(9).chain(std::iter::once('…')).collect()
    } else {
        symbol.to_string()
    }
}

/// Handle boosted command
async fn boosted_command(ctx: &AppContext, cmd: BoostedCmd, json: bool) -> Result<()> {
    let feeds = ctx
        .market
        .boosted()
        .await
        .context("Failed to fetch boosted tokens")?;
    let (title, tokens) = if cmd.latest {
        ("Latest boosts", &feeds.latest)
    } else {
        ("Top boosts", &feeds.top)
    };

    if json {
        return print_json(tokens);
    }
    println!("{} ({})", title, tokens.len());
    for token in tokens {
        print_boosted(token);
    }
    Ok(())
}

fn print_boosted(token: &BoostedToken) {
    let address = token.token_address.as_deref().unwrap_or("?");
    println!(
        "  {:<10} {:<16} amount {:>8} total {:>8}",
        token.chain_id.as_deref().unwrap_or("?"),
        truncate_address(address, 8, 6),
        token.amount.map_or("-".to_string(), |a| format!("{:.0}", a)),
        token.total_amount.map_or("-".to_string(), |a| format!("{:.0}", a)),
    );
}

/// Handle profiles command
async fn profiles_command(ctx: &AppContext, json: bool) -> Result<()> {
    let profiles = ctx
        .market
        .profiles()
        .await
        .context("Failed to fetch token profiles")?;

    if json {
        return print_json(&profiles);
    }
    println!("Latest profiles ({})", profiles.len());
    for profile in &profiles {
        print_profile(profile);
    }
    Ok(())
}

fn print_profile(profile: &TokenProfile) {
    let address = profile.token_address.as_deref().unwrap_or("?");
    let label = profile
        .symbol
        .as_deref()
        .or(profile.name.as_deref())
        .unwrap_or("");
    println!(
        "  {:<10} {:<16} {}",
        profile.chain_id.as_deref().unwrap_or("?"),
        truncate_address(address, 8, 6),
        label
    );
    if let Some(description) = profile.description.as_deref().filter(|d| !d.is_empty()) {
        let short: String = description.chars().take(80).collect();
        println!("             {}", short);
    }
}

/// Handle search command
async fn search_command(ctx: &AppContext, cmd: SearchCmd, json: bool) -> Result<()> {
    let pairs = ctx
        .market
        .search(&cmd.query)
        .await
        .with_context(|| format!("Search for '{}' failed", cmd.query))?;

    if json {
        return print_json(&pairs);
    }
    print_pair_table(&pairs);
    Ok(())
}

/// Handle pairs command
async fn pairs_command(ctx: &AppContext, cmd: TokenRef, json: bool) -> Result<()> {
    let pairs = ctx
        .market
        .token_pairs(&cmd.chain, &cmd.address)
        .await
        .with_context(|| format!("Failed to fetch pairs for {}", cmd.address))?;

    if json {
        return print_json(&pairs);
    }
    print_pair_table(&pairs);
    Ok(())
}

fn print_pair_table(pairs: &[RawPair]) {
    if pairs.is_empty() {
        println!("No pairs found");
        return;
    }

    println!(
        "{:<14} {:<10} {:<12} {:>14} {:>10} {:>10}",
        "PAIR", "CHAIN", "DEX", "PRICE", "24H", "VOLUME"
    );
    for pair in pairs {
        let base = pair.base_token.as_ref().and_then(|t| t.symbol.as_deref()).unwrap_or("?");
        let quote = pair.quote_token.as_ref().and_then(|t| t.symbol.as_deref()).unwrap_or("?");
        println!(
            "{:<14} {:<10} {:<12} {:>14} {:>10} {:>10}",
            truncate_symbol(&format!("{}/{}", base, quote)),
            pair.chain_id.as_deref().unwrap_or("?"),
            pair.dex_id.as_deref().unwrap_or("?"),
            format_price(pair.price_usd.as_deref()),
            format_pct(pair.price_change_h24().unwrap_or(0.0)),
            format_usd_compact(pair.volume_h24()),
        );
    }
}

/// Handle detail command
async fn detail_command(ctx: &AppContext, cmd: DetailCmd, json: bool) -> Result<()> {
    let detail = ctx
        .market
        .token_detail(&cmd.token.chain, &cmd.token.address, cmd.timeframe)
        .await;

    if json {
        return print_json(&detail);
    }
    print_detail(ctx, &detail);
    Ok(())
}

fn print_detail(ctx: &AppContext, detail: &TokenDetail) {
    let Some(pair) = detail.primary_pair() else {
        println!("No pairs found for {} on {}", detail.token_address, detail.chain_id);
        return;
    };

    let base = pair.base_token.as_ref();
    let symbol = base.and_then(|t| t.symbol.as_deref()).unwrap_or("?");
    let name = base.and_then(|t| t.name.as_deref()).unwrap_or("");
    let watched = pair
        .pair_address
        .as_deref()
        .is_some_and(|id| ctx.watchlist.contains(id));

    println!("{} {}{}", symbol, name, if watched { "  ★ watching" } else { "" });
    println!("  Price:      {}", format_price(pair.price_usd.as_deref()));
    println!("  24h change: {}", format_pct(pair.price_change_h24().unwrap_or(0.0)));
    println!("  Volume 24h: {}", format_usd(pair.volume_h24()));
    println!("  Liquidity:  {}", format_usd(pair.liquidity_usd()));
    if let Some(market_cap) = pair.market_cap {
        println!("  Market cap: {}", format_usd(market_cap));
    }
    if let Some(fdv) = pair.fdv {
        println!("  FDV:        {}", format_usd(fdv));
    }
    if let Some(address) = pair.pair_address.as_deref() {
        println!("  Pair:       {}", truncate_address(address, 6, 4));
    }

    let history = &detail.price_history;
    if let (Some(first), Some(last)) = (history.first(), history.last()) {
        let low = history.iter().copied().fold(f64::INFINITY, f64::min);
        let high = history.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        println!(
            "  Chart {}:   {} points, low {} high {} last {} (first {})",
            detail.timeframe,
            history.len(),
            format_usd(low),
            format_usd(high),
            format_usd(*last),
            format_usd(*first),
        );
    } else {
        println!("  Chart {}:   N/A", detail.timeframe);
    }

    println!("\nTop pairs");
    print_pair_table(&detail.pairs[..detail.pairs.len().min(5)]);
}

/// Handle watch commands
async fn watch_command(ctx: &mut AppContext, cmd: WatchCmd, json: bool) -> Result<()> {
    match cmd {
        WatchCmd::Add(token) => {
            let (id, added) = ctx
                .watch_token(&token.chain, &token.address)
                .await
                .context("Failed to add token to watchlist")?;
            if added {
                println!("✓ Watching {}", id);
            } else {
                println!("Already watching {}", id);
            }
        }
        WatchCmd::Remove { id } => {
            if ctx.watchlist.remove(&id).context("Failed to update watchlist")? {
                println!("✓ Removed {}", id);
            } else {
                println!("Not in watchlist: {}", id);
            }
        }
        WatchCmd::List => {
            if json {
                return print_json(ctx.watchlist.entries());
            }
            println!("Portfolio value: {}", format_usd(ctx.watchlist.portfolio_value()));
            print_entries("Boosted", &ctx.watchlist.boosted());
            print_entries("Watchlist", &ctx.watchlist.regular());
        }
    }
    Ok(())
}

fn print_entries(title: &str, entries: &[&WatchlistEntry]) {
    if entries.is_empty() {
        return;
    }
    println!("\n{} ({})", title, entries.len());
    for entry in entries {
        println!(
            "  {:<10} {:>14} {:>10} {:>10}  {}",
            truncate_symbol(&entry.symbol),
            format_usd(entry.price),
            format_pct(entry.price_change_24h),
            format_usd_compact(entry.volume_24h),
            entry.id,
        );
    }
}

/// Handle portfolio commands
fn portfolio_command(ctx: &mut AppContext, cmd: PortfolioCmd) -> Result<()> {
    match cmd {
        PortfolioCmd::Set { value } => {
            if !value.is_finite() || value < 0.0 {
                anyhow::bail!("Portfolio value must be a non-negative number, got {}", value);
            }
            ctx.watchlist
                .set_portfolio_value(value)
                .context("Failed to save portfolio value")?;
            println!("✓ Portfolio value set to {}", format_usd(value));
        }
    }
    Ok(())
}

/// Handle theme command
fn theme_command(ctx: &AppContext, cmd: ThemeCmd) -> Result<()> {
    match cmd.action.unwrap_or(ThemeAction::Get) {
        ThemeAction::Get => println!("{}", ctx.theme()),
        ThemeAction::Set { theme } => {
            ctx.set_theme(theme).context("Failed to save theme")?;
            println!("✓ Theme set to {}", theme);
        }
    }
    Ok(())
}
