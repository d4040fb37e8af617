//! Static data served when live data is unavailable, degenerate, or disabled.

use crate::normalize::DEFAULT_SECTOR;
use crate::{SearchResult, StockRecord};

/// Maximum number of hits any search returns.
pub const MAX_SEARCH_RESULTS: usize = 10;

struct KnownStock {
    symbol: &'static str,
    name: &'static str,
    price: f64,
    market_cap: f64,
    pe_ratio: f64,
    pb_ratio: f64,
    debt_to_equity: f64,
    roe: f64,
    sector: &'static str,
    revenue_growth: f64,
    revenue_growth_years: u32,
}

impl KnownStock {
    fn to_record(&self) -> StockRecord {
        StockRecord {
            symbol: self.symbol.to_owned(),
            name: self.name.to_owned(),
            price: self.price,
            market_cap: self.market_cap,
            pe_ratio: self.pe_ratio,
            pb_ratio: self.pb_ratio,
            debt_to_equity: self.debt_to_equity,
            roe: self.roe,
            sector: self.sector.to_owned(),
            revenue_growth: self.revenue_growth,
            revenue_growth_years: self.revenue_growth_years,
        }
    }
}

macro_rules! known {
    ($symbol:literal, $name:literal, $price:expr, $cap:expr, $pe:expr, $pb:expr, $de:expr, $roe:expr, $sector:literal, $growth:expr, $years:expr) => {
        KnownStock {
            symbol: $symbol,
            name: $name,
            price: $price,
            market_cap: $cap,
            pe_ratio: $pe,
            pb_ratio: $pb,
            debt_to_equity: $de,
            roe: $roe,
            sector: $sector,
            revenue_growth: $growth,
            revenue_growth_years: $years,
        }
    };
}

const KNOWN_STOCKS: &[KnownStock] = &[
    known!("AAPL", "Apple Inc.", 175.43, 2.8e12, 28.5, 39.8, 1.73, 26.4, "Technology", 8.1, 4),
    known!("GOOGL", "Alphabet Inc.", 132.76, 1.65e12, 22.1, 5.2, 0.12, 18.7, "Technology", 12.5, 3),
    known!("MSFT", "Microsoft Corporation", 378.85, 2.82e12, 32.4, 12.1, 0.37, 35.1, "Technology", 11.2, 5),
    known!("TSLA", "Tesla Inc.", 248.50, 7.9e11, 65.7, 9.8, 0.17, 19.3, "Consumer", 47.2, 6),
    known!("JNJ", "Johnson & Johnson", 160.32, 4.21e11, 15.6, 5.1, 0.46, 25.8, "Healthcare", 6.8, 2),
    known!("JPM", "JPMorgan Chase & Co.", 147.92, 4.34e11, 10.8, 1.6, 1.21, 15.2, "Financial", 4.3, 1),
    known!("V", "Visa Inc.", 258.73, 5.44e11, 31.2, 13.4, 0.36, 38.7, "Financial", 9.7, 3),
    known!("PG", "Procter & Gamble", 155.21, 3.69e11, 26.1, 7.8, 0.54, 29.9, "Consumer", 5.2, 2),
    known!("XOM", "Exxon Mobil Corporation", 104.65, 4.41e11, 14.3, 1.9, 0.25, 17.5, "Energy", 15.8, 1),
    known!("HD", "The Home Depot Inc.", 327.89, 3.33e11, 24.7, 45.2, 14.8, 132.4, "Consumer", 7.4, 4),
    known!("NVDA", "NVIDIA Corporation", 487.84, 1.2e12, 67.8, 47.3, 0.42, 71.2, "Technology", 125.9, 5),
];

const SEARCH_CATALOG: &[(&str, &str, &str)] = &[
    ("AAPL", "Apple Inc.", "NASDAQ"),
    ("GOOGL", "Alphabet Inc. Class A", "NASDAQ"),
    ("GOOG", "Alphabet Inc. Class C", "NASDAQ"),
    ("MSFT", "Microsoft Corporation", "NASDAQ"),
    ("TSLA", "Tesla Inc.", "NASDAQ"),
    ("JNJ", "Johnson & Johnson", "NYSE"),
    ("JPM", "JPMorgan Chase & Co.", "NYSE"),
    ("V", "Visa Inc.", "NYSE"),
    ("PG", "Procter & Gamble Company", "NYSE"),
    ("XOM", "Exxon Mobil Corporation", "NYSE"),
    ("HD", "The Home Depot Inc.", "NYSE"),
    ("AMZN", "Amazon.com Inc.", "NASDAQ"),
    ("META", "Meta Platforms Inc.", "NASDAQ"),
    ("NVDA", "NVIDIA Corporation", "NASDAQ"),
    ("NFLX", "Netflix Inc.", "NASDAQ"),
    ("AMD", "Advanced Micro Devices Inc.", "NASDAQ"),
    ("INTC", "Intel Corporation", "NASDAQ"),
    ("CRM", "Salesforce Inc.", "NYSE"),
    ("ORCL", "Oracle Corporation", "NYSE"),
    ("ADBE", "Adobe Inc.", "NASDAQ"),
    ("DIS", "The Walt Disney Company", "NYSE"),
    ("KO", "The Coca-Cola Company", "NYSE"),
    ("PEP", "PepsiCo Inc.", "NASDAQ"),
    ("WMT", "Walmart Inc.", "NYSE"),
    ("CVX", "Chevron Corporation", "NYSE"),
];

/// Curated record for a known symbol, else a zero-valued record carrying the
/// unresolved-name sentinel.
///
/// The generic record is degenerate by construction; callers must not treat that
/// as an error for unknown symbols.
pub fn fallback_record(symbol: &str) -> StockRecord {
    KNOWN_STOCKS
        .iter()
        .find(|known| known.symbol == symbol)
        .map_or_else(|| generic_record(symbol), KnownStock::to_record)
}

/// Symbols with a curated fallback record, in table order.
pub fn known_symbols() -> impl Iterator<Item = &'static str> {
    KNOWN_STOCKS.iter().map(|known| known.symbol)
}

/// Case-insensitive substring match on symbol or name over the curated catalog.
pub fn fallback_search(query: &str) -> Vec<SearchResult> {
    let needle = query.to_lowercase();
    SEARCH_CATALOG
        .iter()
        .filter(|(symbol, name, _)| {
            symbol.to_lowercase().contains(&needle) || name.to_lowercase().contains(&needle)
        })
        .take(MAX_SEARCH_RESULTS)
        .map(|(symbol, name, exchange)| SearchResult::new(*symbol, *name, *exchange, "Common Stock"))
        .collect()
}

fn generic_record(symbol: &str) -> StockRecord {
    StockRecord {
        symbol: symbol.to_owned(),
        name: StockRecord::unresolved_name(symbol),
        price: 0.0,
        market_cap: 0.0,
        pe_ratio: 0.0,
        pb_ratio: 0.0,
        debt_to_equity: 0.0,
        roe: 0.0,
        sector: DEFAULT_SECTOR.to_owned(),
        revenue_growth: 0.0,
        revenue_growth_years: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_known_symbol_has_complete_positive_data() {
        for symbol in known_symbols() {
            let record = fallback_record(symbol);
            assert_eq!(record.symbol, symbol);
            assert!(record.price > 0.0, "{symbol} price");
            assert!(record.market_cap > 0.0, "{symbol} market cap");
            assert!(record.pe_ratio > 0.0, "{symbol} pe");
            assert!(!record.sector.is_empty(), "{symbol} sector");
            assert!(!record.has_unresolved_name(), "{symbol} name");
            assert!(!record.is_degenerate());
        }
        assert_eq!(known_symbols().count(), 11);
    }

    #[test]
    fn unknown_symbol_gets_generic_zero_record() {
        let record = fallback_record("ZZZZ");
        assert_eq!(record.name, "ZZZZ Inc.");
        assert_eq!(record.sector, "Technology");
        assert_eq!(record.revenue_growth_years, 1);
        for value in [
            record.price,
            record.market_cap,
            record.pe_ratio,
            record.pb_ratio,
            record.debt_to_equity,
            record.roe,
            record.revenue_growth,
        ] {
            assert_eq!(value, 0.0);
        }
        assert!(record.is_degenerate());
    }

    #[test]
    fn search_matches_symbol_or_name_case_insensitively() {
        let results = fallback_search("apple");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].symbol, "AAPL");
        assert_eq!(results[0].instrument_type, "Common Stock");

        let by_symbol: Vec<_> = fallback_search("goog")
            .into_iter()
            .map(|hit| hit.symbol)
            .collect();
        assert_eq!(by_symbol, vec!["GOOGL", "GOOG"]);
    }

    #[test]
    fn search_caps_results_and_keeps_catalog_order() {
        let results = fallback_search("inc");
        assert_eq!(results.len(), MAX_SEARCH_RESULTS);
        assert_eq!(results[0].symbol, "AAPL");
        assert_eq!(results[1].symbol, "GOOGL");

        assert!(fallback_search("no-such-company").is_empty());
    }
}
