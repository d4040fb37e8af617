//! CLI argument definitions for the stock screener.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `quote` | Fetch records for symbols, with provenance |
//! | `screen` | Fetch a batch (default symbols when none given) |
//! | `search` | Search for symbols by ticker or company name |
//! | `config` | Show the resolved configuration |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--api-key` | env / `demo` | Twelve Data API key |
//! | `--timeout-ms` | `10000` | Per-request timeout in ms |
//!
//! # Examples
//!
//! ```bash
//! screener quote AAPL MSFT --pretty
//! screener screen --format table
//! screener search apple --limit 5
//! TWELVE_DATA_API_KEY=... screener config
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Stock screener backed by the Twelve Data API.
///
/// Without an API key (flag or TWELVE_DATA_API_KEY) every command runs in demo
/// mode and serves built-in sample data.
#[derive(Debug, Parser)]
#[command(name = "screener", author, version, about = "Twelve Data stock screener")]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Twelve Data API key. Takes precedence over the environment.
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Per-request timeout in milliseconds.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format for terminal display.
    Table,
    /// Single JSON object output.
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch records for one or more symbols, reporting live or fallback origin.
    ///
    /// # Examples
    ///
    ///   screener quote AAPL
    ///   screener quote AAPL MSFT GOOGL --pretty
    Quote(QuoteArgs),

    /// Fetch a batch of records for screening.
    ///
    /// Uses the configured default symbols when none are given.
    Screen(ScreenArgs),

    /// Search for symbols by ticker or company name.
    ///
    /// # Examples
    ///
    ///   screener search apple
    ///   screener search micro --limit 3
    Search(SearchArgs),

    /// Show the resolved configuration with the API key masked.
    Config,
}

#[derive(Debug, Args)]
pub struct QuoteArgs {
    /// One or more ticker symbols (e.g., AAPL, BRK.B).
    #[arg(required = true, num_args = 1..)]
    pub symbols: Vec<String>,
}

#[derive(Debug, Args)]
pub struct ScreenArgs {
    /// Symbols to screen; defaults to the configured list.
    pub symbols: Vec<String>,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Free-form search query (symbol or company name).
    pub query: String,

    /// Maximum number of results to return (at most 10).
    #[arg(long, default_value_t = 10)]
    pub limit: usize,
}
