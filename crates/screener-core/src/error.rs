use thiserror::Error;

use crate::endpoint::Endpoint;

/// Caller-input errors. Raised by [`Symbol::parse`](crate::Symbol::parse) only; the
/// orchestrator's public operations never surface them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },
}

/// Coarse classification of [`FetchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    Timeout,
    Network,
    UpstreamApi,
    Decode,
    Throttled,
}

/// Failure of a single remote call, or of a whole per-symbol fan-out.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("{endpoint} request timed out after {timeout_ms}ms")]
    Timeout { endpoint: Endpoint, timeout_ms: u64 },

    #[error("{endpoint} request failed: {message}")]
    Network { endpoint: Endpoint, message: String },

    #[error("{endpoint} returned HTTP {status}: {message}")]
    Api {
        endpoint: Endpoint,
        status: u16,
        message: String,
    },

    #[error("{endpoint} payload is not valid JSON: {message}")]
    Decode { endpoint: Endpoint, message: String },

    #[error("request budget exhausted; retry in {retry_after_ms}ms")]
    Throttled { retry_after_ms: u64 },
}

impl FetchError {
    /// Maps a non-2xx response to an [`FetchError::Api`].
    ///
    /// Well-known statuses get a fixed explanation; anything else keeps the upstream
    /// `message`/`error` body field when present.
    pub fn from_status(endpoint: Endpoint, status: u16, upstream_message: Option<String>) -> Self {
        let message = match status {
            401 => String::from("Invalid API key. Please check your Twelve Data API key."),
            429 => String::from(
                "Rate limit exceeded. Free tier allows 8 calls/min, 800 calls/day.",
            ),
            404 => String::from("Symbol not found or endpoint not available."),
            400 => String::from("Bad request. Please check the symbol or parameters."),
            _ => upstream_message.unwrap_or_else(|| format!("HTTP {status}")),
        };
        Self::Api {
            endpoint,
            status,
            message,
        }
    }

    pub const fn kind(&self) -> FetchErrorKind {
        match self {
            Self::Timeout { .. } => FetchErrorKind::Timeout,
            Self::Network { .. } => FetchErrorKind::Network,
            Self::Api { .. } => FetchErrorKind::UpstreamApi,
            Self::Decode { .. } => FetchErrorKind::Decode,
            Self::Throttled { .. } => FetchErrorKind::Throttled,
        }
    }

    pub const fn code(&self) -> &'static str {
        match self.kind() {
            FetchErrorKind::Timeout => "fetch.timeout",
            FetchErrorKind::Network => "fetch.network",
            FetchErrorKind::UpstreamApi => "fetch.upstream_api",
            FetchErrorKind::Decode => "fetch.decode",
            FetchErrorKind::Throttled => "fetch.throttled",
        }
    }

    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub const fn retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Network { .. } | Self::Throttled { .. } => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::Decode { .. } => false,
        }
    }

    /// Short text suitable for showing to an end user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Timeout { .. } => {
                String::from("Request timed out. Please check your connection and try again.")
            }
            Self::Network { .. } => {
                String::from("Network error. Please check your internet connection.")
            }
            Self::Throttled { .. } | Self::Api { status: 429, .. } => {
                String::from("API rate limit exceeded. Please try again in a few minutes.")
            }
            Self::Api { status: 401, .. } => {
                String::from("API authentication failed. Please check your API key.")
            }
            Self::Api { status, .. } if *status >= 500 => String::from(
                "API server error. The service may be temporarily unavailable.",
            ),
            Self::Api { message, .. } => format!("API error: {message}"),
            Self::Decode { .. } => {
                String::from("An unexpected error occurred. Please try again.")
            }
        }
    }
}

/// Configuration loading errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("config key '{key}' has invalid numeric value '{value}'")]
    InvalidNumber { key: &'static str, value: String },

    #[error("config key '{key}' must be greater than zero")]
    NonPositive { key: &'static str },

    #[error("base URL cannot be empty")]
    EmptyBaseUrl,
}
