//! Bounded, time-expiring record cache with pinned symbols.
//!
//! Entries age from the moment they are stored. Capacity is enforced oldest
//! first, skipping pinned symbols; when nothing is evictable the cache is
//! allowed to overflow.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use time::OffsetDateTime;
use tracing::debug;

use crate::service::{FallbackReason, RecordOrigin};
use crate::{StockRecord, Symbol};

/// A stored record plus where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub record: StockRecord,
    pub origin: RecordOrigin,
    pub fallback_reason: Option<FallbackReason>,
    pub fetched_at: Instant,
    pub recorded_at: OffsetDateTime,
    seq: u64,
}

/// Read-only view of one entry, fresh or not.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSnapshot {
    pub record: StockRecord,
    pub origin: RecordOrigin,
    pub fetched_at: OffsetDateTime,
    pub age: Duration,
}

#[derive(Debug)]
struct CacheInner {
    entries: HashMap<Symbol, CacheEntry>,
    pins: BTreeSet<Symbol>,
    ttl: Duration,
    max_entries: usize,
    next_seq: u64,
}

impl CacheInner {
    fn is_fresh(&self, entry: &CacheEntry) -> bool {
        entry.fetched_at.elapsed() < self.ttl
    }

    /// Removes oldest unpinned entries until within capacity. `keep` is never evicted.
    fn enforce_capacity(&mut self, keep: Option<&Symbol>) -> Vec<Symbol> {
        if self.entries.len() <= self.max_entries {
            return Vec::new();
        }

        let mut candidates: Vec<(Instant, u64, Symbol)> = self
            .entries
            .iter()
            .filter(|(symbol, _)| !self.pins.contains(*symbol) && Some(*symbol) != keep)
            .map(|(symbol, entry)| (entry.fetched_at, entry.seq, symbol.clone()))
            .collect();
        candidates.sort_unstable_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

        let excess = self.entries.len() - self.max_entries;
        let evicted: Vec<Symbol> = candidates
            .into_iter()
            .take(excess)
            .map(|(_, _, symbol)| symbol)
            .collect();
        for symbol in &evicted {
            self.entries.remove(symbol);
        }
        evicted
    }
}

/// Thread-safe record cache shared by one orchestrator instance.
#[derive(Debug, Clone)]
pub struct StockCache {
    inner: Arc<tokio::sync::RwLock<CacheInner>>,
}

impl StockCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            inner: Arc::new(tokio::sync::RwLock::new(CacheInner {
                entries: HashMap::new(),
                pins: BTreeSet::new(),
                ttl,
                max_entries,
                next_seq: 0,
            })),
        }
    }

    /// The entry for `symbol` if it is younger than the freshness window.
    pub async fn get_fresh(&self, symbol: &str) -> Option<CacheEntry> {
        let store = self.inner.read().await;
        store
            .entries
            .get(symbol)
            .filter(|entry| store.is_fresh(entry))
            .cloned()
    }

    pub async fn is_fresh(&self, symbol: &str) -> bool {
        self.get_fresh(symbol).await.is_some()
    }

    /// Stores `record` stamped with the current time, then enforces capacity.
    ///
    /// Returns the symbols evicted to make room.
    pub async fn insert(
        &self,
        symbol: Symbol,
        record: StockRecord,
        origin: RecordOrigin,
        fallback_reason: Option<FallbackReason>,
    ) -> Vec<Symbol> {
        let mut store = self.inner.write().await;
        let seq = store.next_seq;
        store.next_seq += 1;
        store.entries.insert(
            symbol.clone(),
            CacheEntry {
                record,
                origin,
                fallback_reason,
                fetched_at: Instant::now(),
                recorded_at: OffsetDateTime::now_utc(),
                seq,
            },
        );

        let evicted = store.enforce_capacity(Some(&symbol));
        if !evicted.is_empty() {
            debug!(?evicted, "evicted cache entries over capacity");
        }
        evicted
    }

    /// Enforces capacity without inserting anything.
    pub async fn cleanup(&self) -> Vec<Symbol> {
        self.inner.write().await.enforce_capacity(None)
    }

    /// Drops every entry. Pins are kept.
    pub async fn clear(&self) {
        self.inner.write().await.entries.clear();
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Cached symbols, oldest first, fresh or not.
    pub async fn symbols(&self) -> Vec<Symbol> {
        let store = self.inner.read().await;
        let mut entries: Vec<(&Symbol, &CacheEntry)> = store.entries.iter().collect();
        entries.sort_unstable_by_key(|(_, entry)| (entry.fetched_at, entry.seq));
        entries
            .into_iter()
            .map(|(symbol, _)| symbol.clone())
            .collect()
    }

    pub async fn snapshot(&self, symbol: &str) -> Option<CacheSnapshot> {
        let store = self.inner.read().await;
        store.entries.get(symbol).map(|entry| CacheSnapshot {
            record: entry.record.clone(),
            origin: entry.origin,
            fetched_at: entry.recorded_at,
            age: entry.fetched_at.elapsed(),
        })
    }

    /// Returns `false` when the symbol was already pinned.
    pub async fn pin(&self, symbol: Symbol) -> bool {
        self.inner.write().await.pins.insert(symbol)
    }

    /// Returns `false` when the symbol was not pinned.
    pub async fn unpin(&self, symbol: &str) -> bool {
        self.inner.write().await.pins.remove(symbol)
    }

    pub async fn is_pinned(&self, symbol: &str) -> bool {
        self.inner.read().await.pins.contains(symbol)
    }

    /// Pinned symbols in lexical order.
    pub async fn pinned(&self) -> Vec<Symbol> {
        self.inner.read().await.pins.iter().cloned().collect()
    }
}
