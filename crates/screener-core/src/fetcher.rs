//! Remote fetcher for the Twelve Data REST API.
//!
//! One stock record needs three calls (`quote`, `statistics`, `profile`). They run
//! concurrently and join all-or-nothing: the first failure aborts the other two
//! and becomes the error for the whole symbol.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::warn;

use crate::endpoint::Endpoint;
use crate::error::FetchError;
use crate::extract::RawPayloads;
use crate::http_client::{HttpClient, HttpErrorKind, HttpRequest, DEFAULT_TIMEOUT_MS};
use crate::throttling::RequestBudget;

/// HTTP client bound to one base URL and API key.
#[derive(Clone)]
pub struct TwelveDataClient {
    http: Arc<dyn HttpClient>,
    base_url: String,
    api_key: String,
    timeout: Duration,
    budget: Option<RequestBudget>,
}

impl TwelveDataClient {
    pub fn new(
        http: Arc<dyn HttpClient>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            budget: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_budget(mut self, budget: RequestBudget) -> Self {
        self.budget = Some(budget);
        self
    }

    /// Fetches the three raw payloads for `symbol`.
    ///
    /// Budget for all three calls is reserved before any request goes out.
    pub async fn fetch_raw(&self, symbol: &str) -> Result<RawPayloads, FetchError> {
        self.reserve(Endpoint::STOCK_SET.len())?;
        let (quote, statistics, profile) = tokio::try_join!(
            self.fetch_json(Endpoint::Quote, symbol),
            self.fetch_json(Endpoint::Statistics, symbol),
            self.fetch_json(Endpoint::Profile, symbol),
        )?;
        Ok(RawPayloads::new(quote, statistics, profile))
    }

    /// Raw `symbol_search` body; shape discovery happens in [`crate::search`].
    pub async fn search_raw(&self, query: &str) -> Result<Value, FetchError> {
        self.reserve(1)?;
        self.fetch_json(Endpoint::SymbolSearch, query).await
    }

    fn reserve(&self, calls: usize) -> Result<(), FetchError> {
        let Some(budget) = &self.budget else {
            return Ok(());
        };
        budget
            .acquire_n(u32::try_from(calls).unwrap_or(u32::MAX))
            .map_err(|wait| FetchError::Throttled {
                retry_after_ms: duration_ms(wait),
            })
    }

    async fn fetch_json(&self, endpoint: Endpoint, symbol: &str) -> Result<Value, FetchError> {
        let timeout_ms = duration_ms(self.timeout);
        let request = HttpRequest::get(endpoint.url(&self.base_url, symbol, &self.api_key))
            .with_timeout_ms(timeout_ms);

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|error| match error.kind() {
                HttpErrorKind::Timeout => FetchError::Timeout {
                    endpoint,
                    timeout_ms,
                },
                HttpErrorKind::Connect | HttpErrorKind::Other => FetchError::Network {
                    endpoint,
                    message: error.message().to_owned(),
                },
            })?;

        if !response.is_success() {
            return Err(FetchError::from_status(
                endpoint,
                response.status,
                upstream_message(&response.body),
            ));
        }

        let payload: Value =
            serde_json::from_str(&response.body).map_err(|error| FetchError::Decode {
                endpoint,
                message: error.to_string(),
            })?;

        if payload.get("status").and_then(Value::as_str) == Some("error") {
            let detail = upstream_message(&response.body).unwrap_or_default();
            warn!(
                %endpoint,
                %symbol,
                code = ?payload.get("code"),
                upstream_message = %detail,
                "upstream reported an error in a successful response"
            );
        }

        Ok(payload)
    }
}

impl std::fmt::Debug for TwelveDataClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwelveDataClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("budget", &self.budget)
            .finish_non_exhaustive()
    }
}

/// `message` or `error` string field of a JSON error body.
fn upstream_message(body: &str) -> Option<String> {
    let payload: Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .into_iter()
        .filter_map(|key| payload.get(key).and_then(Value::as_str))
        .map(str::trim)
        .find(|text| !text.is_empty())
        .map(str::to_owned)
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
