//! Merges the quote, statistics and profile payloads into one [`StockRecord`].
//!
//! Nothing here falls back: a payload without usable fields simply produces a
//! zero-valued record. Deciding whether such a record is trustworthy is the
//! orchestrator's job.

use crate::extract::{extract_count, extract_number, extract_text, FieldPath, RawPayloads};
use crate::StockRecord;

/// Sector reported when neither the profile nor the lookup table knows better.
pub const DEFAULT_SECTOR: &str = "Technology";

const PRICE: &[FieldPath] = &[
    FieldPath::quote(&["close"]),
    FieldPath::quote(&["price"]),
    FieldPath::quote(&["regularMarketPrice"]),
    FieldPath::quote(&["last_price"]),
];

const SHARES_OUTSTANDING: &[FieldPath] = &[
    FieldPath::statistics(&["statistics", "shares_outstanding"]),
    FieldPath::statistics(&["shares_outstanding"]),
    FieldPath::profile(&["shares_outstanding"]),
    FieldPath::quote(&["shares_outstanding"]),
    FieldPath::statistics(&["statistics", "stock_statistics", "shares_outstanding"]),
];

const MARKET_CAP: &[FieldPath] = &[
    FieldPath::statistics(&["market_cap"]),
    FieldPath::statistics(&["statistics", "market_cap"]),
    FieldPath::profile(&["market_cap"]),
    FieldPath::quote(&["market_cap"]),
    FieldPath::statistics(&["statistics", "valuations_metrics", "market_capitalization"]),
];

const PE_RATIO: &[FieldPath] = &[
    FieldPath::statistics(&["valuations_metrics", "pe_ratio"]),
    FieldPath::statistics(&["valuation", "pe_ratio"]),
    FieldPath::statistics(&["pe_ratio"]),
    FieldPath::statistics(&["statistics", "valuation", "trailingPE"]),
    FieldPath::quote(&["pe_ratio"]),
    FieldPath::statistics(&["statistics", "valuations_metrics", "trailing_pe"]),
];

const PB_RATIO: &[FieldPath] = &[
    FieldPath::statistics(&["valuations_metrics", "pb_ratio"]),
    FieldPath::statistics(&["valuation", "pb_ratio"]),
    FieldPath::statistics(&["pb_ratio"]),
    FieldPath::statistics(&["statistics", "valuation", "priceToBook"]),
    FieldPath::statistics(&["statistics", "valuations_metrics", "price_to_book_mrq"]),
];

const DEBT_TO_EQUITY: &[FieldPath] = &[
    FieldPath::statistics(&["balance_sheet", "debt_to_equity"]),
    FieldPath::statistics(&["financials", "balance_sheet", "debt_to_equity"]),
    FieldPath::statistics(&["debt_to_equity"]),
    FieldPath::statistics(&["statistics", "financial_data", "debtToEquity"]),
    FieldPath::statistics(&[
        "statistics",
        "financials",
        "balance_sheet",
        "total_debt_to_equity_mrq",
    ]),
];

const ROE: &[FieldPath] = &[
    FieldPath::statistics(&["income_statement", "roe"]),
    FieldPath::statistics(&["financials", "income_statement", "roe"]),
    FieldPath::statistics(&["roe"]),
    FieldPath::statistics(&["statistics", "financial_data", "returnOnEquity"]),
    FieldPath::statistics(&["statistics", "financials", "return_on_equity_ttm"]),
];

const REVENUE_GROWTH: &[FieldPath] = &[
    FieldPath::statistics(&["income_statement", "revenue_growth"]),
    FieldPath::statistics(&["financials", "income_statement", "revenue_growth"]),
    FieldPath::statistics(&["revenue_growth"]),
    FieldPath::statistics(&["statistics", "earnings", "revenueGrowth"]),
    FieldPath::statistics(&[
        "statistics",
        "financials",
        "income_statement",
        "quarterly_revenue_growth",
    ]),
];

const GROWTH_YEARS: &[FieldPath] = &[
    FieldPath::statistics(&["income_statement", "consistent_growth_years"]),
    FieldPath::statistics(&["consistent_growth_years"]),
];

const NAME: &[FieldPath] = &[
    FieldPath::profile(&["name"]),
    FieldPath::quote(&["name"]),
    FieldPath::profile(&["longName"]),
];

const SECTOR: &[FieldPath] = &[
    FieldPath::profile(&["sector"]),
    FieldPath::profile(&["industry"]),
];

const SECTOR_TABLE: &[(&str, &str)] = &[
    ("AAPL", "Technology"),
    ("GOOGL", "Technology"),
    ("MSFT", "Technology"),
    ("TSLA", "Consumer"),
    ("JNJ", "Healthcare"),
    ("JPM", "Financial"),
    ("V", "Financial"),
    ("PG", "Consumer"),
    ("XOM", "Energy"),
    ("HD", "Consumer"),
    ("NVDA", "Technology"),
];

/// Price from the quote payload, `0.0` when absent.
pub fn resolve_price(payloads: &RawPayloads) -> f64 {
    extract_number(payloads, PRICE)
}

/// `price * shares_outstanding` when both are positive, else the first directly
/// reported market cap across statistics, profile and quote.
pub fn resolve_market_cap(payloads: &RawPayloads) -> f64 {
    let price = resolve_price(payloads);
    let shares_outstanding = extract_number(payloads, SHARES_OUTSTANDING);

    if price > 0.0 && shares_outstanding > 0.0 {
        return price * shares_outstanding;
    }

    extract_number(payloads, MARKET_CAP)
}

/// Profile sector or industry, then the static table, then [`DEFAULT_SECTOR`].
pub fn resolve_sector(payloads: &RawPayloads, symbol: &str) -> String {
    extract_text(payloads, SECTOR).unwrap_or_else(|| sector_for_symbol(symbol).to_owned())
}

/// Static sector lookup for a handful of large caps.
pub fn sector_for_symbol(symbol: &str) -> &'static str {
    SECTOR_TABLE
        .iter()
        .find(|(known, _)| *known == symbol)
        .map_or(DEFAULT_SECTOR, |&(_, sector)| sector)
}

/// Builds the canonical record from the three raw payloads.
pub fn normalize(symbol: &str, payloads: &RawPayloads) -> StockRecord {
    let revenue_growth_years = extract_count(payloads, GROWTH_YEARS)
        .and_then(|years| u32::try_from(years).ok())
        .filter(|years| *years >= 1)
        .unwrap_or(1);

    StockRecord {
        symbol: symbol.to_owned(),
        name: extract_text(payloads, NAME).unwrap_or_else(|| StockRecord::unresolved_name(symbol)),
        price: resolve_price(payloads),
        market_cap: resolve_market_cap(payloads),
        pe_ratio: extract_number(payloads, PE_RATIO),
        pb_ratio: extract_number(payloads, PB_RATIO),
        debt_to_equity: extract_number(payloads, DEBT_TO_EQUITY),
        roe: extract_number(payloads, ROE),
        sector: resolve_sector(payloads, symbol),
        revenue_growth: extract_number(payloads, REVENUE_GROWTH),
        revenue_growth_years,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn raw(quote: Value, statistics: Value, profile: Value) -> RawPayloads {
        RawPayloads::new(quote, statistics, profile)
    }

    #[test]
    fn market_cap_prefers_price_times_shares() {
        let payloads = raw(
            json!({ "close": "10", "market_cap": 5000 }),
            json!({ "shares_outstanding": 100 }),
            json!({}),
        );
        assert_eq!(resolve_market_cap(&payloads), 1000.0);
    }

    #[test]
    fn market_cap_falls_back_to_direct_field() {
        let payloads = raw(
            json!({ "close": 10, "market_cap": 7 }),
            json!({}),
            json!({ "market_cap": "5000" }),
        );
        assert_eq!(resolve_market_cap(&payloads), 5000.0);

        let no_price = raw(
            json!({ "market_cap": 7 }),
            json!({ "shares_outstanding": 100 }),
            json!({}),
        );
        assert_eq!(resolve_market_cap(&no_price), 7.0);
    }

    #[test]
    fn market_cap_defaults_to_zero() {
        assert_eq!(resolve_market_cap(&RawPayloads::default()), 0.0);
    }

    #[test]
    fn sector_prefers_profile_then_table_then_default() {
        let with_industry = raw(json!({}), json!({}), json!({ "sector": "", "industry": "Banks" }));
        assert_eq!(resolve_sector(&with_industry, "AAPL"), "Banks");

        let empty = RawPayloads::default();
        assert_eq!(resolve_sector(&empty, "XOM"), "Energy");
        assert_eq!(resolve_sector(&empty, "ZZZZ"), DEFAULT_SECTOR);
    }

    #[test]
    fn normalizes_well_formed_payloads() {
        let payloads = raw(
            json!({ "symbol": "AAPL", "close": "175.43", "name": "Apple Inc" }),
            json!({
                "valuations_metrics": { "pe_ratio": 28.5, "pb_ratio": "39.8" },
                "balance_sheet": { "debt_to_equity": 1.73 },
                "income_statement": {
                    "roe": 26.4,
                    "revenue_growth": -2.5,
                    "consistent_growth_years": "4"
                },
                "market_cap": 2_800_000_000_000.0
            }),
            json!({ "name": "Apple Inc.", "sector": "Technology" }),
        );

        let record = normalize("AAPL", &payloads);
        assert_eq!(record.symbol, "AAPL");
        assert_eq!(record.name, "Apple Inc.");
        assert_eq!(record.price, 175.43);
        assert_eq!(record.market_cap, 2_800_000_000_000.0);
        assert_eq!(record.pe_ratio, 28.5);
        assert_eq!(record.pb_ratio, 39.8);
        assert_eq!(record.debt_to_equity, 1.73);
        assert_eq!(record.roe, 26.4);
        assert_eq!(record.revenue_growth, -2.5);
        assert_eq!(record.revenue_growth_years, 4);
        assert_eq!(record.sector, "Technology");
        assert!(!record.is_degenerate());
    }

    #[test]
    fn reads_nested_statistics_layout() {
        let payloads = raw(
            json!({ "close": "2.00" }),
            json!({ "statistics": {
                "valuations_metrics": { "trailing_pe": 11.0, "price_to_book_mrq": 1.5 },
                "financials": {
                    "return_on_equity_ttm": 0.21,
                    "balance_sheet": { "total_debt_to_equity_mrq": 80.2 },
                    "income_statement": { "quarterly_revenue_growth": 0.06 }
                },
                "stock_statistics": { "shares_outstanding": 50 }
            }}),
            json!({}),
        );

        let record = normalize("NEST", &payloads);
        assert_eq!(record.pe_ratio, 11.0);
        assert_eq!(record.pb_ratio, 1.5);
        assert_eq!(record.roe, 0.21);
        assert_eq!(record.debt_to_equity, 80.2);
        assert_eq!(record.revenue_growth, 0.06);
        assert_eq!(record.market_cap, 100.0);
    }

    #[test]
    fn empty_payloads_produce_degenerate_record_with_sentinels() {
        let record = normalize("ZZZZ", &RawPayloads::default());
        assert!(record.is_degenerate());
        assert!(record.has_unresolved_name());
        assert_eq!(record.sector, DEFAULT_SECTOR);
        assert_eq!(record.revenue_growth_years, 1);
    }

    #[test]
    fn non_positive_growth_years_clamp_to_one() {
        let payloads = raw(json!({}), json!({ "consistent_growth_years": -3 }), json!({}));
        assert_eq!(normalize("X", &payloads).revenue_growth_years, 1);
    }
}
