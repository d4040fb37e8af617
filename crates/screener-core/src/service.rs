//! Cache-first orchestration over the remote fetcher and the static fallback.
//!
//! The public stock and search operations never fail. Every error, degenerate
//! payload or panic below this layer is converted into fallback data; the
//! [`StockReport`] variants expose which path produced a record.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::join_all;
use futures::FutureExt;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::cache::{CacheSnapshot, StockCache};
use crate::config::ScreenerConfig;
use crate::error::FetchError;
use crate::fallback::{fallback_record, fallback_search};
use crate::fetcher::TwelveDataClient;
use crate::http_client::{HttpClient, OfflineHttpClient, ReqwestHttpClient};
use crate::normalize::normalize;
use crate::search::{parse_search_payload, sanitize_query, SearchSequencer};
use crate::throttling::RequestBudget;
use crate::{SearchResult, StockRecord, Symbol};

/// Which path produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordOrigin {
    /// Normalized from a successful upstream fetch.
    Live,
    /// Static data substituted after a failed or degenerate fetch.
    Fallback,
    /// Static data served because the service runs without an API key.
    Demo,
}

/// Why live data was replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    Degenerate,
    Fetch(FetchError),
    Panicked,
}

impl FallbackReason {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Degenerate => "degenerate",
            Self::Fetch(error) => error.code(),
            Self::Panicked => "panicked",
        }
    }
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Degenerate => f.write_str("upstream returned no price, market cap or P/E"),
            Self::Fetch(error) => error.fmt(f),
            Self::Panicked => f.write_str("fetch aborted by a panic"),
        }
    }
}

/// A record plus how it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct StockReport {
    pub record: StockRecord,
    pub origin: RecordOrigin,
    pub cache_hit: bool,
    pub fallback_reason: Option<FallbackReason>,
}

impl StockReport {
    pub fn used_fallback(&self) -> bool {
        self.origin != RecordOrigin::Live
    }
}

/// One screener instance: configuration, upstream client, cache and pin set.
///
/// Instances are independent; two services never share cache state.
#[derive(Debug)]
pub struct ScreenerService {
    config: ScreenerConfig,
    client: TwelveDataClient,
    cache: StockCache,
    searches: SearchSequencer,
}

impl ScreenerService {
    pub fn new(config: ScreenerConfig, http: Arc<dyn HttpClient>) -> Self {
        let mut client = TwelveDataClient::new(http, config.base_url.clone(), config.api_key.clone())
            .with_timeout(config.request_timeout);
        if let Some(rate_limit) = config.rate_limit {
            client = client.with_budget(RequestBudget::new(rate_limit));
        }

        Self {
            cache: StockCache::new(config.cache_duration, config.max_cache_entries),
            client,
            config,
            searches: SearchSequencer::new(),
        }
    }

    /// Uses reqwest unless the config is in demo mode.
    pub fn from_config(config: ScreenerConfig) -> Self {
        let http: Arc<dyn HttpClient> = if config.is_demo() {
            Arc::new(OfflineHttpClient)
        } else {
            Arc::new(ReqwestHttpClient::new())
        };
        Self::new(config, http)
    }

    /// Offline instance serving static data only.
    pub fn demo() -> Self {
        Self::new(ScreenerConfig::default(), Arc::new(OfflineHttpClient))
    }

    pub fn config(&self) -> &ScreenerConfig {
        &self.config
    }

    pub fn is_demo(&self) -> bool {
        self.config.is_demo()
    }

    pub async fn get_stock_data(&self, symbol: &str) -> StockRecord {
        self.get_stock_report(symbol).await.record
    }

    /// Cache-first lookup with fallback substitution.
    ///
    /// A fresh cache entry is returned as stored. Otherwise the three payloads are
    /// fetched and normalized; a degenerate record, a fetch error or a panic is
    /// replaced by the static fallback. Whatever is returned is cached with a new
    /// timestamp. Demo mode bypasses the cache and the network entirely.
    #[instrument(level = "debug", skip(self))]
    pub async fn get_stock_report(&self, symbol: &str) -> StockReport {
        let symbol = Symbol::new(symbol);

        if self.config.is_demo() {
            return StockReport {
                record: fallback_record(symbol.as_str()),
                origin: RecordOrigin::Demo,
                cache_hit: false,
                fallback_reason: None,
            };
        }

        if let Some(entry) = self.cache.get_fresh(symbol.as_str()).await {
            debug!("cache hit");
            return StockReport {
                record: entry.record,
                origin: entry.origin,
                cache_hit: true,
                fallback_reason: entry.fallback_reason,
            };
        }

        debug!("cache miss, fetching");
        let outcome = AssertUnwindSafe(self.fetch_record(&symbol))
            .catch_unwind()
            .await;

        let (record, origin, fallback_reason) = match outcome {
            Ok(Ok(record)) if !record.is_degenerate() => (record, RecordOrigin::Live, None),
            Ok(Ok(_)) => {
                warn!("degenerate upstream data, substituting fallback");
                (
                    fallback_record(symbol.as_str()),
                    RecordOrigin::Fallback,
                    Some(FallbackReason::Degenerate),
                )
            }
            Ok(Err(error)) => {
                warn!(code = error.code(), %error, "fetch failed, substituting fallback");
                (
                    fallback_record(symbol.as_str()),
                    RecordOrigin::Fallback,
                    Some(FallbackReason::Fetch(error)),
                )
            }
            Err(_) => {
                warn!("fetch panicked, substituting fallback");
                (
                    fallback_record(symbol.as_str()),
                    RecordOrigin::Fallback,
                    Some(FallbackReason::Panicked),
                )
            }
        };

        self.cache
            .insert(symbol, record.clone(), origin, fallback_reason.clone())
            .await;

        StockReport {
            record,
            origin,
            cache_hit: false,
            fallback_reason,
        }
    }

    /// Concurrent [`Self::get_stock_data`] over `symbols`, in input order.
    pub async fn fetch_multiple_stocks<S: AsRef<str>>(&self, symbols: &[S]) -> Vec<StockRecord> {
        self.fetch_multiple_reports(symbols)
            .await
            .into_iter()
            .map(|report| report.record)
            .collect()
    }

    pub async fn fetch_multiple_reports<S: AsRef<str>>(&self, symbols: &[S]) -> Vec<StockReport> {
        join_all(
            symbols
                .iter()
                .map(|symbol| self.get_stock_report(symbol.as_ref())),
        )
        .await
    }

    /// Batch over the configured default symbols.
    pub async fn fetch_default_stocks(&self) -> Vec<StockRecord> {
        self.fetch_multiple_stocks(&self.config.default_symbols).await
    }

    /// Remote symbol search with the curated list as fallback.
    ///
    /// A query that is empty after sanitizing returns no results and makes no
    /// request. At most ten results are returned.
    pub async fn search_symbols(&self, query: &str) -> Vec<SearchResult> {
        let query = sanitize_query(query);
        if query.is_empty() {
            return Vec::new();
        }
        if self.config.is_demo() {
            return fallback_search(&query);
        }

        match self.client.search_raw(&query).await {
            Ok(payload) => parse_search_payload(&payload).unwrap_or_else(|| {
                warn!(%query, "search payload has no result array, using local list");
                fallback_search(&query)
            }),
            Err(error) => {
                warn!(%query, code = error.code(), %error, "search failed, using local list");
                fallback_search(&query)
            }
        }
    }

    /// Like [`Self::search_symbols`], but yields `None` when a newer search was
    /// started on this service before this one completed.
    pub async fn search_latest(&self, query: &str) -> Option<Vec<SearchResult>> {
        let ticket = self.searches.issue();
        let results = self.search_symbols(query).await;
        self.searches.is_current(ticket).then_some(results)
    }

    /// Drops every cached record. Watchlist pins are kept.
    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    /// Pins `symbol` against eviction. Cached data is untouched.
    pub async fn add_to_watchlist(&self, symbol: &str) -> bool {
        self.cache.pin(Symbol::new(symbol)).await
    }

    pub async fn remove_from_watchlist(&self, symbol: &str) -> bool {
        self.cache.unpin(Symbol::new(symbol).as_str()).await
    }

    pub async fn is_pinned(&self, symbol: &str) -> bool {
        self.cache.is_pinned(Symbol::new(symbol).as_str()).await
    }

    pub async fn pinned_symbols(&self) -> Vec<Symbol> {
        self.cache.pinned().await
    }

    /// Whether `symbol` has an entry inside the freshness window.
    pub async fn is_cache_valid(&self, symbol: &str) -> bool {
        self.cache.is_fresh(Symbol::new(symbol).as_str()).await
    }

    pub async fn cache_entry(&self, symbol: &str) -> Option<CacheSnapshot> {
        self.cache.snapshot(Symbol::new(symbol).as_str()).await
    }

    /// Cached symbols, oldest first.
    pub async fn cached_symbols(&self) -> Vec<Symbol> {
        self.cache.symbols().await
    }

    pub async fn cache_len(&self) -> usize {
        self.cache.len().await
    }

    /// Evicts oldest unpinned entries down to capacity and returns them.
    pub async fn cleanup_cache(&self) -> Vec<Symbol> {
        self.cache.cleanup().await
    }

    async fn fetch_record(&self, symbol: &Symbol) -> Result<StockRecord, FetchError> {
        let payloads = self.client.fetch_raw(symbol.as_str()).await?;
        Ok(normalize(symbol.as_str(), &payloads))
    }
}
