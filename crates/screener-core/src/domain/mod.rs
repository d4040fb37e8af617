//! # Domain Models
//!
//! Value types exchanged between the screener core and its callers.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`StockRecord`] | Merged quote + statistics + profile snapshot for one ticker |
//! | [`SearchResult`] | One symbol-search hit |
//! | [`MarketCapCategory`] | Small / mid / large capitalization bucket |
//! | [`Symbol`] | Uppercase ticker key |
//!
//! Records handed out by the orchestrator are clones of cached values; mutating
//! one never affects what later callers see.

mod models;
mod symbol;

pub use models::{MarketCapCategory, SearchResult, StockRecord};
pub use symbol::Symbol;
