use serde::Serialize;

use screener_core::{MarketCapCategory, ScreenerService, StockRecord, Symbol};

use crate::cli::ScreenArgs;
use crate::error::CliError;
use crate::output::format_large_number;

use super::{CommandResult, Table};

#[derive(Debug, Serialize)]
struct ScreenResponseData<'a> {
    stocks: Vec<ScreenedStock<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScreenedStock<'a> {
    #[serde(flatten)]
    record: &'a StockRecord,
    market_cap_category: MarketCapCategory,
}

pub async fn run(args: &ScreenArgs, service: &ScreenerService) -> Result<CommandResult, CliError> {
    let records = if args.symbols.is_empty() {
        service.fetch_default_stocks().await
    } else {
        let symbols = args
            .symbols
            .iter()
            .map(|raw| Symbol::parse(raw))
            .collect::<Result<Vec<_>, _>>()?;
        service.fetch_multiple_stocks(&symbols).await
    };

    let data = serde_json::to_value(ScreenResponseData {
        stocks: records
            .iter()
            .map(|record| ScreenedStock {
                record,
                market_cap_category: record.market_cap_category(),
            })
            .collect(),
    })?;

    let table = Table {
        headers: vec![
            "SYMBOL", "NAME", "SECTOR", "PRICE", "MKT CAP", "SIZE", "P/E", "P/B", "D/E", "ROE",
            "GROWTH",
        ],
        rows: records.iter().map(row).collect(),
    };

    Ok(CommandResult::new(data, table))
}

fn row(record: &StockRecord) -> Vec<String> {
    vec![
        record.symbol.clone(),
        record.name.clone(),
        record.sector.clone(),
        format!("{:.2}", record.price),
        format_large_number(record.market_cap),
        record.market_cap_category().as_str().to_owned(),
        format!("{:.1}", record.pe_ratio),
        format!("{:.1}", record.pb_ratio),
        format!("{:.2}", record.debt_to_equity),
        format!("{:.1}%", record.roe),
        format!("{:.1}% / {}y", record.revenue_growth, record.revenue_growth_years),
    ]
}
