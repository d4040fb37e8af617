use serde::Serialize;

use screener_core::{ScreenerService, SearchResult, MAX_SEARCH_RESULTS};

use crate::cli::SearchArgs;
use crate::error::CliError;

use super::{CommandResult, Table};

#[derive(Debug, Serialize)]
struct SearchResponseData<'a> {
    query: &'a str,
    results: &'a [SearchResult],
}

pub async fn run(args: &SearchArgs, service: &ScreenerService) -> Result<CommandResult, CliError> {
    if args.limit == 0 || args.limit > MAX_SEARCH_RESULTS {
        return Err(CliError::Command(format!(
            "--limit must be between 1 and {MAX_SEARCH_RESULTS}"
        )));
    }

    let query = args.query.trim();
    if query.is_empty() {
        return Err(CliError::Command(String::from("query must not be empty")));
    }

    let mut results = service.search_symbols(query).await;
    results.truncate(args.limit);

    let data = serde_json::to_value(SearchResponseData {
        query,
        results: &results,
    })?;

    let table = Table {
        headers: vec!["SYMBOL", "NAME", "EXCHANGE", "TYPE"],
        rows: results
            .into_iter()
            .map(|hit| vec![hit.symbol, hit.name, hit.exchange, hit.instrument_type])
            .collect(),
    };

    Ok(CommandResult::new(data, table))
}
