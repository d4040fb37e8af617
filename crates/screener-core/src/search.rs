//! Symbol search payload handling and superseded-request fencing.

use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;

use crate::fallback::MAX_SEARCH_RESULTS;
use crate::SearchResult;

const SYMBOL_KEYS: &[&str] = &["symbol", "ticker", "code"];
const NAME_KEYS: &[&str] = &["instrument_name", "name", "company_name"];
const EXCHANGE_KEYS: &[&str] = &["exchange", "market"];
const TYPE_KEYS: &[&str] = &["instrument_type", "type"];

const DEFAULT_EXCHANGE: &str = "N/A";
const DEFAULT_TYPE: &str = "Common Stock";

/// Trims the query and strips `<`, `>`, `"` and `'`.
pub fn sanitize_query(query: &str) -> String {
    query
        .trim()
        .chars()
        .filter(|ch| !matches!(ch, '<' | '>' | '"' | '\''))
        .collect()
}

/// Normalizes a `symbol_search` body.
///
/// The result list is the first array among the body itself, `data` and
/// `result`. Returns `None` when none of them is an array.
pub fn parse_search_payload(payload: &Value) -> Option<Vec<SearchResult>> {
    let items = [Some(payload), payload.get("data"), payload.get("result")]
        .into_iter()
        .flatten()
        .find_map(Value::as_array)?;

    Some(
        items
            .iter()
            .filter_map(parse_item)
            .take(MAX_SEARCH_RESULTS)
            .collect(),
    )
}

fn parse_item(item: &Value) -> Option<SearchResult> {
    let symbol = first_text(item, SYMBOL_KEYS)?;
    let name = first_text(item, NAME_KEYS).unwrap_or_else(|| symbol.clone());
    let exchange = first_text(item, EXCHANGE_KEYS).unwrap_or_else(|| DEFAULT_EXCHANGE.to_owned());
    let instrument_type = first_text(item, TYPE_KEYS).unwrap_or_else(|| DEFAULT_TYPE.to_owned());
    Some(SearchResult {
        symbol,
        name,
        exchange,
        instrument_type,
    })
}

fn first_text(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| item.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|text| !text.is_empty())
        .map(str::to_owned)
}

/// Monotonic request ids for searches that may be superseded while in flight.
#[derive(Debug, Default)]
pub struct SearchSequencer {
    latest: AtomicU64,
}

/// Id handed out by [`SearchSequencer::issue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SearchTicket(u64);

impl SearchSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a new id; every earlier ticket stops being current.
    pub fn issue(&self) -> SearchTicket {
        SearchTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: SearchTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}
