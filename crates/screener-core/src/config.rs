//! Layered configuration for the screener core.
//!
//! Values are looked up key by key across an ordered list of [`ConfigSource`]s;
//! the first source that has a value wins. The core only ever sees the resolved
//! [`ScreenerConfig`].

use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::time::Duration;

use crate::error::ConfigError;
use crate::throttling::RateLimit;
use crate::Symbol;

/// API key sentinel that switches the core into offline demo mode.
pub const DEMO_API_KEY: &str = "demo";

pub const DEFAULT_BASE_URL: &str = "https://api.twelvedata.com";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_CACHE_DURATION: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_MAX_CACHE_ENTRIES: usize = 100;
pub const DEFAULT_SYMBOLS: [&str; 10] = [
    "AAPL", "GOOGL", "MSFT", "TSLA", "JNJ", "JPM", "V", "PG", "XOM", "HD",
];

/// Every setting a source can provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigKey {
    ApiKey,
    BaseUrl,
    RequestTimeoutMs,
    CacheDurationMs,
    MaxCacheEntries,
    DefaultSymbols,
    RateLimitPerMinute,
    RateLimitPerDay,
}

impl ConfigKey {
    pub const ALL: [Self; 8] = [
        Self::ApiKey,
        Self::BaseUrl,
        Self::RequestTimeoutMs,
        Self::CacheDurationMs,
        Self::MaxCacheEntries,
        Self::DefaultSymbols,
        Self::RateLimitPerMinute,
        Self::RateLimitPerDay,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ApiKey => "api_key",
            Self::BaseUrl => "base_url",
            Self::RequestTimeoutMs => "request_timeout_ms",
            Self::CacheDurationMs => "cache_duration_ms",
            Self::MaxCacheEntries => "max_cache_entries",
            Self::DefaultSymbols => "default_symbols",
            Self::RateLimitPerMinute => "rate_limit_per_minute",
            Self::RateLimitPerDay => "rate_limit_per_day",
        }
    }

    pub const fn env_var(self) -> &'static str {
        match self {
            Self::ApiKey => "TWELVE_DATA_API_KEY",
            Self::BaseUrl => "SCREENER_BASE_URL",
            Self::RequestTimeoutMs => "SCREENER_REQUEST_TIMEOUT_MS",
            Self::CacheDurationMs => "SCREENER_CACHE_DURATION_MS",
            Self::MaxCacheEntries => "SCREENER_MAX_CACHE_ENTRIES",
            Self::DefaultSymbols => "SCREENER_DEFAULT_SYMBOLS",
            Self::RateLimitPerMinute => "SCREENER_RATE_LIMIT_PER_MINUTE",
            Self::RateLimitPerDay => "SCREENER_RATE_LIMIT_PER_DAY",
        }
    }
}

/// One layer of configuration lookup.
pub trait ConfigSource {
    fn name(&self) -> &str;
    fn get(&self, key: ConfigKey) -> Option<String>;
}

/// Explicitly provided values, e.g. command-line flags or stored user settings.
#[derive(Debug, Clone, Default)]
pub struct MapSource {
    name: String,
    values: BTreeMap<ConfigKey, String>,
}

impl MapSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: ConfigKey, value: impl Into<String>) -> Self {
        self.values.insert(key, value.into());
        self
    }

    pub fn set(&mut self, key: ConfigKey, value: impl Into<String>) {
        self.values.insert(key, value.into());
    }
}

impl ConfigSource for MapSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: ConfigKey) -> Option<String> {
        self.values.get(&key).cloned()
    }
}

/// Process environment, see [`ConfigKey::env_var`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSource;

impl ConfigSource for EnvSource {
    fn name(&self) -> &str {
        "environment"
    }

    fn get(&self, key: ConfigKey) -> Option<String> {
        std::env::var(key.env_var()).ok()
    }
}

/// Resolved, read-only settings for one screener instance.
#[derive(Clone, PartialEq)]
pub struct ScreenerConfig {
    pub api_key: String,
    pub base_url: String,
    pub request_timeout: Duration,
    pub cache_duration: Duration,
    pub max_cache_entries: usize,
    pub default_symbols: Vec<Symbol>,
    pub rate_limit: Option<RateLimit>,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            api_key: String::from(DEMO_API_KEY),
            base_url: String::from(DEFAULT_BASE_URL),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            cache_duration: DEFAULT_CACHE_DURATION,
            max_cache_entries: DEFAULT_MAX_CACHE_ENTRIES,
            default_symbols: DEFAULT_SYMBOLS.iter().map(|s| Symbol::new(s)).collect(),
            rate_limit: None,
        }
    }
}

impl ScreenerConfig {
    /// Resolves every key across `sources` in order, falling back to defaults.
    ///
    /// Blank values are ignored. For the API key the `demo` sentinel is ignored
    /// too, so a stored demo key never shadows a real key further down the chain.
    pub fn load(sources: &[&dyn ConfigSource]) -> Result<Self, ConfigError> {
        let lookup = |key: ConfigKey| {
            sources.iter().find_map(|source| {
                source
                    .get(key)
                    .map(|value| value.trim().to_owned())
                    .filter(|value| !value.is_empty())
                    .filter(|value| key != ConfigKey::ApiKey || value != DEMO_API_KEY)
            })
        };

        let mut config = Self::default();

        if let Some(api_key) = lookup(ConfigKey::ApiKey) {
            config.api_key = api_key;
        }
        if let Some(base_url) = lookup(ConfigKey::BaseUrl) {
            config.base_url = base_url;
        }
        if let Some(value) = lookup(ConfigKey::RequestTimeoutMs) {
            let millis = parse_positive::<u64>(ConfigKey::RequestTimeoutMs, &value)?;
            config.request_timeout = Duration::from_millis(millis);
        }
        if let Some(value) = lookup(ConfigKey::CacheDurationMs) {
            let millis = parse_number::<u64>(ConfigKey::CacheDurationMs, &value)?;
            config.cache_duration = Duration::from_millis(millis);
        }
        if let Some(value) = lookup(ConfigKey::MaxCacheEntries) {
            config.max_cache_entries = parse_positive::<usize>(ConfigKey::MaxCacheEntries, &value)?;
        }
        if let Some(value) = lookup(ConfigKey::DefaultSymbols) {
            let symbols = parse_symbol_list(&value);
            if !symbols.is_empty() {
                config.default_symbols = symbols;
            }
        }

        let per_minute = lookup(ConfigKey::RateLimitPerMinute)
            .map(|value| parse_number::<u32>(ConfigKey::RateLimitPerMinute, &value))
            .transpose()?;
        let per_day = lookup(ConfigKey::RateLimitPerDay)
            .map(|value| parse_number::<u32>(ConfigKey::RateLimitPerDay, &value))
            .transpose()?;
        if per_minute.is_some() || per_day.is_some() {
            config.rate_limit = Some(RateLimit {
                per_minute: per_minute.unwrap_or(0),
                per_day: per_day.unwrap_or(0),
            });
        }

        config.validate()?;
        Ok(config)
    }

    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(&[&EnvSource])
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::NonPositive {
                key: ConfigKey::RequestTimeoutMs.as_str(),
            });
        }
        if self.max_cache_entries == 0 {
            return Err(ConfigError::NonPositive {
                key: ConfigKey::MaxCacheEntries.as_str(),
            });
        }
        Ok(())
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_cache_duration(mut self, duration: Duration) -> Self {
        self.cache_duration = duration;
        self
    }

    pub fn with_max_cache_entries(mut self, max_entries: usize) -> Self {
        self.max_cache_entries = max_entries;
        self
    }

    pub fn with_default_symbols(mut self, symbols: Vec<Symbol>) -> Self {
        self.default_symbols = symbols;
        self
    }

    pub fn with_rate_limit(mut self, rate_limit: RateLimit) -> Self {
        self.rate_limit = Some(rate_limit);
        self
    }

    pub fn is_demo(&self) -> bool {
        self.api_key == DEMO_API_KEY
    }

    /// API key safe for display: `first4...last4`, or the key itself when short.
    pub fn masked_api_key(&self) -> String {
        if self.is_demo() {
            return String::from(DEMO_API_KEY);
        }
        let chars: Vec<char> = self.api_key.chars().collect();
        if chars.len() <= 8 {
            return self.api_key.clone();
        }
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    }
}

impl Debug for ScreenerConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreenerConfig")
            .field("api_key", &self.masked_api_key())
            .field("base_url", &self.base_url)
            .field("request_timeout", &self.request_timeout)
            .field("cache_duration", &self.cache_duration)
            .field("max_cache_entries", &self.max_cache_entries)
            .field("default_symbols", &self.default_symbols)
            .field("rate_limit", &self.rate_limit)
            .finish()
    }
}

fn parse_number<T: std::str::FromStr>(key: ConfigKey, value: &str) -> Result<T, ConfigError> {
    value.parse::<T>().map_err(|_| ConfigError::InvalidNumber {
        key: key.as_str(),
        value: value.to_owned(),
    })
}

fn parse_positive<T>(key: ConfigKey, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    let number = parse_number::<T>(key, value)?;
    if number <= T::default() {
        return Err(ConfigError::NonPositive { key: key.as_str() });
    }
    Ok(number)
}

fn parse_symbol_list(value: &str) -> Vec<Symbol> {
    value
        .split(|ch: char| ch == ',' || ch.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(Symbol::new)
        .collect()
}
