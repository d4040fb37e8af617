use serde::{Deserialize, Serialize};

const SMALL_CAP_CEILING: f64 = 2_000_000_000.0;
const MID_CAP_CEILING: f64 = 10_000_000_000.0;

/// Canonical per-symbol fundamentals snapshot handed to callers.
///
/// Field names serialize in camelCase so the record can be consumed as-is by a
/// browser front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRecord {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub market_cap: f64,
    pub pe_ratio: f64,
    pub pb_ratio: f64,
    pub debt_to_equity: f64,
    pub roe: f64,
    pub sector: String,
    pub revenue_growth: f64,
    pub revenue_growth_years: u32,
}

impl StockRecord {
    /// Name synthesized when the company name could not be resolved.
    pub fn unresolved_name(symbol: &str) -> String {
        format!("{symbol} Inc.")
    }

    /// `price`, `marketCap` and `peRatio` all exactly zero.
    ///
    /// Upstream rate limiting or an unknown symbol produces this shape, so it is
    /// read as a failure signal rather than a real security.
    pub fn is_degenerate(&self) -> bool {
        self.price == 0.0 && self.market_cap == 0.0 && self.pe_ratio == 0.0
    }

    pub fn has_unresolved_name(&self) -> bool {
        self.name == Self::unresolved_name(&self.symbol)
    }

    pub fn market_cap_category(&self) -> MarketCapCategory {
        MarketCapCategory::classify(self.market_cap)
    }
}

/// Coarse market capitalization bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketCapCategory {
    Small,
    Mid,
    Large,
}

impl MarketCapCategory {
    pub fn classify(market_cap: f64) -> Self {
        if market_cap < SMALL_CAP_CEILING {
            Self::Small
        } else if market_cap < MID_CAP_CEILING {
            Self::Mid
        } else {
            Self::Large
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Mid => "mid",
            Self::Large => "large",
        }
    }
}

/// One symbol-search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub symbol: String,
    pub name: String,
    pub exchange: String,
    #[serde(rename = "type")]
    pub instrument_type: String,
}

impl SearchResult {
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        exchange: impl Into<String>,
        instrument_type: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            exchange: exchange.into(),
            instrument_type: instrument_type.into(),
        }
    }
}
