//! # Screener Core
//!
//! Data acquisition and caching core for a Twelve Data backed stock screener.
//!
//! ## Overview
//!
//! - **Multi-endpoint merge**: `quote`, `statistics` and `profile` are fetched
//!   concurrently and normalized into one [`StockRecord`]
//! - **Tolerant extraction** over loosely structured upstream JSON
//! - **Static fallback** for failed, degenerate or offline lookups
//! - **Bounded cache** with a freshness window and watchlist pins
//! - **Symbol search** with a curated local fallback
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`cache`] | Time-expiring record cache with pinned symbols |
//! | [`config`] | Layered configuration sources and resolved settings |
//! | [`domain`] | Domain models (StockRecord, SearchResult, Symbol) |
//! | [`endpoint`] | Upstream endpoint identifiers |
//! | [`error`] | Validation, fetch and configuration errors |
//! | [`extract`] | Ordered field-path extraction |
//! | [`fallback`] | Curated fallback records and search catalog |
//! | [`fetcher`] | Twelve Data HTTP client |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`normalize`] | Market cap, sector and record normalization |
//! | [`search`] | Search payload normalization and request fencing |
//! | [`service`] | Cache-first orchestrator |
//! | [`throttling`] | Optional client-side request budget |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use screener_core::{ScreenerConfig, ScreenerService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = ScreenerService::from_config(ScreenerConfig::from_env()?);
//!
//!     for record in service.fetch_default_stocks().await {
//!         println!("{}: ${:.2}", record.symbol, record.price);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / UI       │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ ScreenerService │────▶│ StockCache       │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ TwelveDataClient│────▶│ HTTP Client      │
//! │ (3-way join)    │     │ (reqwest/offline)│
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ normalize       │     │ fallback         │
//! └─────────────────┘     └──────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Stock and search operations on [`ScreenerService`] never return errors.
//! Failures are converted into fallback data and can be inspected through
//! [`StockReport`]:
//!
//! ```rust
//! use screener_core::{FallbackReason, StockReport};
//!
//! fn describe(report: &StockReport) -> String {
//!     match &report.fallback_reason {
//!         None => String::from("live"),
//!         Some(FallbackReason::Fetch(error)) => error.user_message(),
//!         Some(reason) => reason.to_string(),
//!     }
//! }
//! ```
//!
//! ## Security
//!
//! - The API key travels only as a query parameter and is never logged
//! - Transport errors are stripped of the request URL

pub mod cache;
pub mod config;
pub mod domain;
pub mod endpoint;
pub mod error;
pub mod extract;
pub mod fallback;
pub mod fetcher;
pub mod http_client;
pub mod normalize;
pub mod search;
pub mod service;
pub mod throttling;

// Caching
pub use cache::{CacheEntry, CacheSnapshot, StockCache};

// Configuration
pub use config::{ConfigKey, ConfigSource, EnvSource, MapSource, ScreenerConfig, DEMO_API_KEY};

// Domain models
pub use domain::{MarketCapCategory, SearchResult, StockRecord, Symbol};

pub use endpoint::Endpoint;

// Error types
pub use error::{ConfigError, FetchError, FetchErrorKind, ValidationError};

pub use extract::{FieldPath, RawPayloads, Section};

pub use fallback::{fallback_record, fallback_search, known_symbols, MAX_SEARCH_RESULTS};

pub use fetcher::TwelveDataClient;

// HTTP client types
pub use http_client::{
    HttpClient, HttpError, HttpErrorKind, HttpRequest, HttpResponse, OfflineHttpClient,
    ReqwestHttpClient,
};

pub use normalize::normalize;

pub use search::{SearchSequencer, SearchTicket};

// Orchestrator
pub use service::{FallbackReason, RecordOrigin, ScreenerService, StockReport};

// Throttling
pub use throttling::{RateLimit, RequestBudget};
