use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Upstream endpoint family used for URL construction and error attribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Quote,
    Statistics,
    Profile,
    SymbolSearch,
}

impl Endpoint {
    /// The three endpoints merged into one stock record, in join order.
    pub const STOCK_SET: [Self; 3] = [Self::Quote, Self::Statistics, Self::Profile];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quote => "quote",
            Self::Statistics => "statistics",
            Self::Profile => "profile",
            Self::SymbolSearch => "symbol_search",
        }
    }

    /// Builds `{base}/{endpoint}?symbol={symbol}&apikey={key}`.
    ///
    /// The symbol is percent-encoded; a trailing slash on `base_url` is tolerated.
    pub fn url(self, base_url: &str, symbol: &str, api_key: &str) -> String {
        format!(
            "{}/{}?symbol={}&apikey={}",
            base_url.trim_end_matches('/'),
            self.as_str(),
            urlencoding::encode(symbol),
            urlencoding::encode(api_key)
        )
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_encodes_symbol_and_strips_trailing_slash() {
        let url = Endpoint::SymbolSearch.url("https://api.example.test/", "BRK A", "k-1");
        assert_eq!(
            url,
            "https://api.example.test/symbol_search?symbol=BRK%20A&apikey=k-1"
        );
    }
}
