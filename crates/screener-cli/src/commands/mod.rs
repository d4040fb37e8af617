mod config;
mod quote;
mod screen;
mod search;

use screener_core::{ConfigKey, EnvSource, MapSource, ScreenerConfig, ScreenerService};
use serde_json::Value;

use crate::cli::{Cli, Command};
use crate::error::CliError;

/// Rendered command output: JSON for machines, rows for the table format.
pub struct CommandResult {
    pub data: Value,
    pub table: Table,
}

impl CommandResult {
    pub fn new(data: Value, table: Table) -> Self {
        Self { data, table }
    }
}

#[derive(Debug, Default)]
pub struct Table {
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

pub async fn run(cli: &Cli) -> Result<CommandResult, CliError> {
    let config = load_config(cli)?;

    match &cli.command {
        Command::Config => config::run(&config),
        Command::Quote(args) => quote::run(args, &ScreenerService::from_config(config)).await,
        Command::Screen(args) => screen::run(args, &ScreenerService::from_config(config)).await,
        Command::Search(args) => search::run(args, &ScreenerService::from_config(config)).await,
    }
}

/// Flags first, then the environment, then built-in defaults.
fn load_config(cli: &Cli) -> Result<ScreenerConfig, CliError> {
    let mut flags = MapSource::new("flags");
    if let Some(api_key) = &cli.api_key {
        flags.set(ConfigKey::ApiKey, api_key.as_str());
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        flags.set(ConfigKey::RequestTimeoutMs, timeout_ms.to_string());
    }

    Ok(ScreenerConfig::load(&[&flags, &EnvSource])?)
}
