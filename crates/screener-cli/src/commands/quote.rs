use serde::Serialize;

use screener_core::{RecordOrigin, ScreenerService, StockRecord, StockReport, Symbol};

use crate::cli::QuoteArgs;
use crate::error::CliError;

use super::{CommandResult, Table};

#[derive(Debug, Serialize)]
struct QuoteResponseData<'a> {
    reports: Vec<ReportView<'a>>,
}

#[derive(Debug, Serialize)]
struct ReportView<'a> {
    symbol: &'a str,
    origin: RecordOrigin,
    cache_hit: bool,
    fallback_reason: Option<ReasonView>,
    record: &'a StockRecord,
}

#[derive(Debug, Serialize)]
struct ReasonView {
    code: &'static str,
    message: String,
}

impl<'a> From<&'a StockReport> for ReportView<'a> {
    fn from(report: &'a StockReport) -> Self {
        Self {
            symbol: &report.record.symbol,
            origin: report.origin,
            cache_hit: report.cache_hit,
            fallback_reason: report.fallback_reason.as_ref().map(|reason| ReasonView {
                code: reason.code(),
                message: reason.to_string(),
            }),
            record: &report.record,
        }
    }
}

pub async fn run(args: &QuoteArgs, service: &ScreenerService) -> Result<CommandResult, CliError> {
    let symbols = args
        .symbols
        .iter()
        .map(|raw| Symbol::parse(raw))
        .collect::<Result<Vec<_>, _>>()?;

    let reports = service.fetch_multiple_reports(&symbols).await;

    let data = serde_json::to_value(QuoteResponseData {
        reports: reports.iter().map(ReportView::from).collect(),
    })?;

    let table = Table {
        headers: vec!["SYMBOL", "NAME", "PRICE", "ORIGIN", "REASON"],
        rows: reports
            .iter()
            .map(|report| {
                vec![
                    report.record.symbol.clone(),
                    report.record.name.clone(),
                    format!("{:.2}", report.record.price),
                    origin_label(report),
                    report
                        .fallback_reason
                        .as_ref()
                        .map_or_else(String::new, |reason| reason.code().to_owned()),
                ]
            })
            .collect(),
    };

    Ok(CommandResult::new(data, table))
}

fn origin_label(report: &StockReport) -> String {
    let origin = match report.origin {
        RecordOrigin::Live => "live",
        RecordOrigin::Fallback => "fallback",
        RecordOrigin::Demo => "demo",
    };
    if report.cache_hit {
        format!("{origin} (cached)")
    } else {
        origin.to_owned()
    }
}
