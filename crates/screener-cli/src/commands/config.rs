use serde::Serialize;

use screener_core::{RateLimit, ScreenerConfig};

use crate::error::CliError;

use super::{CommandResult, Table};

#[derive(Debug, Serialize)]
struct ConfigView {
    api_key: String,
    demo_mode: bool,
    base_url: String,
    request_timeout_ms: u128,
    cache_duration_ms: u128,
    max_cache_entries: usize,
    default_symbols: Vec<String>,
    rate_limit: Option<RateLimit>,
}

impl From<&ScreenerConfig> for ConfigView {
    fn from(config: &ScreenerConfig) -> Self {
        Self {
            api_key: config.masked_api_key(),
            demo_mode: config.is_demo(),
            base_url: config.base_url.clone(),
            request_timeout_ms: config.request_timeout.as_millis(),
            cache_duration_ms: config.cache_duration.as_millis(),
            max_cache_entries: config.max_cache_entries,
            default_symbols: config
                .default_symbols
                .iter()
                .map(ToString::to_string)
                .collect(),
            rate_limit: config.rate_limit,
        }
    }
}

pub fn run(config: &ScreenerConfig) -> Result<CommandResult, CliError> {
    let view = ConfigView::from(config);

    let rate_limit = view.rate_limit.map_or_else(
        || String::from("none"),
        |limit| format!("{}/min, {}/day", limit.per_minute, limit.per_day),
    );
    let table = Table {
        headers: vec!["KEY", "VALUE"],
        rows: vec![
            vec![String::from("api_key"), view.api_key.clone()],
            vec![String::from("demo_mode"), view.demo_mode.to_string()],
            vec![String::from("base_url"), view.base_url.clone()],
            vec![
                String::from("request_timeout_ms"),
                view.request_timeout_ms.to_string(),
            ],
            vec![
                String::from("cache_duration_ms"),
                view.cache_duration_ms.to_string(),
            ],
            vec![
                String::from("max_cache_entries"),
                view.max_cache_entries.to_string(),
            ],
            vec![
                String::from("default_symbols"),
                view.default_symbols.join(","),
            ],
            vec![String::from("rate_limit"), rate_limit],
        ],
    };

    Ok(CommandResult::new(serde_json::to_value(&view)?, table))
}
