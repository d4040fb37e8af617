//! Behavior-driven tests for the cache-first screener service
//!
//! These tests verify HOW the orchestrator combines upstream data, the cache
//! and the static fallback, focusing on what callers observe.

use std::time::Duration;

use screener_core::{
    fallback_record, FallbackReason, FetchError, HttpError, RateLimit, RecordOrigin,
    ScreenerConfig, ScreenerService, Symbol,
};
use serde_json::json;
use screener_tests::{
    aapl_profile, aapl_quote, aapl_statistics, live_config, live_service, query_param,
    service_with, Reply, ScriptedHttpClient, API_KEY,
};
use time::OffsetDateTime;

// =============================================================================
// Live data
// =============================================================================

#[tokio::test]
async fn when_upstream_returns_well_formed_payloads_system_returns_live_record() {
    // Given: An upstream serving complete AAPL payloads
    let http = ScriptedHttpClient::new();
    http.stock("AAPL", aapl_quote(), aapl_statistics(), aapl_profile());
    let service = live_service(&http);

    // When: The caller asks for AAPL
    let report = service.get_stock_report("AAPL").await;

    // Then: The merged record is live and cached with a past timestamp
    assert_eq!(report.origin, RecordOrigin::Live);
    assert!(!report.cache_hit);
    assert!(report.fallback_reason.is_none());

    let record = &report.record;
    assert_eq!(record.price, 175.43);
    assert_eq!(record.pe_ratio, 28.5);
    assert_eq!(record.name, "Apple Inc.");
    assert_eq!(record.sector, "Technology");

    let entry = service.cache_entry("AAPL").await.expect("AAPL is cached");
    assert_eq!(&entry.record, record);
    assert!(entry.fetched_at <= OffsetDateTime::now_utc());
    assert_eq!(service.cached_symbols().await, vec![Symbol::new("AAPL")]);
}

#[tokio::test]
async fn when_caller_passes_lowercase_symbol_system_requests_normalized_ticker() {
    // Given: A live service
    let http = ScriptedHttpClient::new();
    http.stock("MSFT", json!({ "close": 400 }), json!({}), json!({}));
    let service = live_service(&http);

    // When: The symbol is given in lowercase with whitespace
    let record = service.get_stock_data("  msft ").await;

    // Then: Every request uses the uppercase ticker and the configured key
    assert_eq!(record.symbol, "MSFT");
    assert_eq!(record.price, 400.0);
    let requests = http.requests();
    assert_eq!(requests.len(), 3);
    for request in &requests {
        assert_eq!(query_param(&request.url, "symbol").as_deref(), Some("MSFT"));
        assert_eq!(query_param(&request.url, "apikey").as_deref(), Some(API_KEY));
        assert_eq!(request.timeout_ms, 10_000);
    }
}

// =============================================================================
// Fallback substitution
// =============================================================================

#[tokio::test]
async fn when_upstream_data_is_degenerate_system_substitutes_and_caches_fallback() {
    // Given: An upstream that answers with empty objects
    let http = ScriptedHttpClient::new();
    http.stock("AAPL", json!({}), json!({}), json!({}));
    let service = live_service(&http);

    // When: The symbol is requested twice inside the freshness window
    let first = service.get_stock_report("AAPL").await;
    let second = service.get_stock_report("AAPL").await;

    // Then: The curated record replaces the zeroed one and is served from cache
    assert_eq!(first.record, fallback_record("AAPL"));
    assert_eq!(first.origin, RecordOrigin::Fallback);
    assert_eq!(first.fallback_reason, Some(FallbackReason::Degenerate));

    assert!(second.cache_hit);
    assert_eq!(second.record, first.record);
    assert_eq!(second.fallback_reason, Some(FallbackReason::Degenerate));
    assert_eq!(http.request_count(), 3, "no refetch within the window");
}

#[tokio::test]
async fn when_upstream_reports_error_in_body_system_falls_back() {
    // Given: A 200 response carrying an upstream error object
    let http = ScriptedHttpClient::new();
    let body = json!({ "status": "error", "code": 429, "message": "run out of API credits" });
    http.stock_reply("JPM", Reply::json(body));
    let service = live_service(&http);

    // When: The symbol is requested
    let report = service.get_stock_report("JPM").await;

    // Then: The normalized record is degenerate and the fallback is used
    assert_eq!(report.record, fallback_record("JPM"));
    assert_eq!(report.fallback_reason, Some(FallbackReason::Degenerate));
}

#[tokio::test]
async fn when_fetch_fails_system_returns_fallback_and_caches_it() {
    // Given: An upstream rejecting the key
    let http = ScriptedHttpClient::new();
    http.stock_reply("XOM", Reply::status(401, r#"{"message":"bad key"}"#));
    let service = live_service(&http);

    // When: The symbol is requested twice
    let report = service.get_stock_report("XOM").await;
    let again = service.get_stock_data("XOM").await;

    // Then: The failure is visible only through the report
    assert_eq!(report.record, fallback_record("XOM"));
    match report.fallback_reason {
        Some(FallbackReason::Fetch(FetchError::Api { status, .. })) => assert_eq!(status, 401),
        other => panic!("unexpected reason: {other:?}"),
    }
    assert_eq!(again, report.record);
    assert!(service.is_cache_valid("XOM").await);
    assert_eq!(http.requests_for("XOM"), 3);
}

#[tokio::test]
async fn when_unknown_symbol_fails_system_returns_generic_record() {
    // Given: Nothing routed for ZZZZ (every endpoint answers 404)
    let http = ScriptedHttpClient::new();
    let service = live_service(&http);

    // When: The caller asks for an unknown ticker
    let record = service.get_stock_data("ZZZZ").await;

    // Then: The zero-valued generic record with the unresolved-name sentinel comes back
    assert_eq!(record.name, "ZZZZ Inc.");
    assert_eq!(record.sector, "Technology");
    assert!(record.is_degenerate());
    assert!(record.has_unresolved_name());
}

#[tokio::test]
async fn when_transport_panics_system_still_returns_fallback() {
    // Given: A transport that panics for TSLA
    let http = ScriptedHttpClient::new();
    http.stock_reply("TSLA", Reply::Panic);
    let service = live_service(&http);

    // When: TSLA is requested
    let report = service.get_stock_report("TSLA").await;

    // Then: The panic is contained
    assert_eq!(report.record, fallback_record("TSLA"));
    assert_eq!(report.fallback_reason, Some(FallbackReason::Panicked));
}

// =============================================================================
// Cache freshness and eviction
// =============================================================================

#[tokio::test]
async fn when_entry_is_fresh_system_does_not_refetch() {
    // Given: AAPL fetched once
    let http = ScriptedHttpClient::new();
    http.stock("AAPL", aapl_quote(), aapl_statistics(), aapl_profile());
    let service = live_service(&http);
    let first = service.get_stock_data("AAPL").await;

    // When: It is requested again immediately
    let second = service.get_stock_report("AAPL").await;

    // Then: The cached value is returned without network traffic
    assert!(second.cache_hit);
    assert_eq!(second.origin, RecordOrigin::Live);
    assert_eq!(second.record, first);
    assert_eq!(http.request_count(), 3);
}

#[tokio::test]
async fn when_entry_expires_system_fetches_again() {
    // Given: A very short freshness window
    let http = ScriptedHttpClient::new();
    http.stock("AAPL", aapl_quote(), aapl_statistics(), aapl_profile());
    let config = live_config().with_cache_duration(Duration::from_millis(100));
    let service = service_with(&http, config);
    service.get_stock_data("AAPL").await;

    // When: The window elapses
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(!service.is_cache_valid("AAPL").await);
    let report = service.get_stock_report("AAPL").await;

    // Then: The fetcher runs a second time
    assert!(!report.cache_hit);
    assert_eq!(http.request_count(), 6);
    assert!(service.is_cache_valid("AAPL").await);
}

#[tokio::test]
async fn when_cache_is_full_pinned_symbol_is_never_evicted() {
    // Given: A two-entry cache whose oldest entry is pinned
    let http = ScriptedHttpClient::new();
    let service = service_with(&http, live_config().with_max_cache_entries(2));
    service.add_to_watchlist("AAPL").await;
    service.get_stock_data("AAPL").await;
    service.get_stock_data("MSFT").await;

    // When: A third symbol is inserted
    service.get_stock_data("V").await;

    // Then: The oldest unpinned entry goes, the pinned one stays
    let cached = service.cached_symbols().await;
    assert_eq!(cached, vec![Symbol::new("AAPL"), Symbol::new("V")]);
    assert!(service.is_cache_valid("AAPL").await);
}

#[tokio::test]
async fn when_every_entry_is_pinned_cache_overflows() {
    // Given: Both slots pinned
    let http = ScriptedHttpClient::new();
    let service = service_with(&http, live_config().with_max_cache_entries(2));
    for symbol in ["AAPL", "MSFT"] {
        service.add_to_watchlist(symbol).await;
        service.get_stock_data(symbol).await;
    }

    // When: A third symbol arrives
    service.get_stock_data("V").await;

    // Then: Nothing pinned is evicted and the cache grows past capacity
    assert_eq!(service.cache_len().await, 3);

    // And: Once a pin is dropped, cleanup restores capacity
    service.remove_from_watchlist("MSFT").await;
    assert_eq!(service.cleanup_cache().await, vec![Symbol::new("MSFT")]);
    assert_eq!(service.cache_len().await, 2);
}

#[tokio::test]
async fn when_cache_is_cleared_pins_survive_and_data_is_refetched() {
    // Given: A cached, pinned symbol
    let http = ScriptedHttpClient::new();
    let service = live_service(&http);
    service.add_to_watchlist("HD").await;
    service.get_stock_data("HD").await;

    // When: The cache is cleared
    service.clear_cache().await;

    // Then: Entries are gone, the pin is not, and the next read fetches again
    assert_eq!(service.cache_len().await, 0);
    assert!(service.is_pinned("HD").await);
    service.get_stock_data("HD").await;
    assert_eq!(http.requests_for("HD"), 6);
}

// =============================================================================
// Batch fetch
// =============================================================================

#[tokio::test]
async fn when_one_symbol_fails_batch_still_returns_every_slot_in_order() {
    // Given: A fails nothing, B fails at the transport, C panics
    let http = ScriptedHttpClient::new();
    http.stock("AAPL", aapl_quote(), aapl_statistics(), aapl_profile());
    http.stock_reply("GOOGL", Reply::Fail(HttpError::connect("connection refused")));
    http.stock_reply("MSFT", Reply::Panic);
    let service = live_service(&http);

    // When: The batch runs
    let reports = service
        .fetch_multiple_reports(&["AAPL", "GOOGL", "MSFT"])
        .await;

    // Then: Three results in input order, failures filled with fallback data
    let symbols: Vec<&str> = reports.iter().map(|r| r.record.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["AAPL", "GOOGL", "MSFT"]);
    assert_eq!(reports[0].origin, RecordOrigin::Live);
    assert_eq!(reports[1].record, fallback_record("GOOGL"));
    assert!(matches!(
        reports[1].fallback_reason,
        Some(FallbackReason::Fetch(FetchError::Network { .. }))
    ));
    assert_eq!(reports[2].fallback_reason, Some(FallbackReason::Panicked));
}

#[tokio::test]
async fn when_default_batch_is_requested_configured_symbols_are_used() {
    // Given: A config with a custom default list
    let http = ScriptedHttpClient::new();
    let config = live_config().with_default_symbols(vec![Symbol::new("NVDA"), Symbol::new("V")]);
    let service = service_with(&http, config);

    // When: The default batch runs
    let records = service.fetch_default_stocks().await;

    // Then: Exactly those symbols come back
    let symbols: Vec<&str> = records.iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["NVDA", "V"]);
    assert_eq!(records[0], fallback_record("NVDA"));
}

// =============================================================================
// Demo mode and request budget
// =============================================================================

#[tokio::test]
async fn when_running_in_demo_mode_system_never_touches_network() {
    // Given: A demo config over a recording transport
    let http = ScriptedHttpClient::new();
    let service = service_with(&http, ScreenerConfig::default());

    // When: Every public operation is exercised
    let record = service.get_stock_data("AAPL").await;
    let batch = service.fetch_multiple_stocks(&["MSFT", "ZZZZ"]).await;
    let hits = service.search_symbols("apple").await;

    // Then: Static data is served and nothing is sent
    assert_eq!(record, fallback_record("AAPL"));
    assert_eq!(batch[1].name, "ZZZZ Inc.");
    assert_eq!(hits[0].symbol, "AAPL");
    assert_eq!(http.request_count(), 0);
    assert_eq!(service.cache_len().await, 0);
}

#[tokio::test]
async fn when_request_budget_is_spent_system_falls_back_without_sending() {
    // Given: A budget of three calls per minute
    let http = ScriptedHttpClient::new();
    http.stock("AAPL", aapl_quote(), aapl_statistics(), aapl_profile());
    let config = live_config().with_rate_limit(RateLimit {
        per_minute: 3,
        per_day: 0,
    });
    let service = service_with(&http, config);

    // When: Two symbols are requested
    let first = service.get_stock_report("AAPL").await;
    let second = service.get_stock_report("MSFT").await;

    // Then: The second is throttled locally
    assert_eq!(first.origin, RecordOrigin::Live);
    assert!(matches!(
        second.fallback_reason,
        Some(FallbackReason::Fetch(FetchError::Throttled { .. }))
    ));
    assert_eq!(http.request_count(), 3);
}

#[tokio::test]
async fn when_budget_cannot_cover_a_whole_fetch_system_sends_none_of_it() {
    // Given: A budget of four calls per minute and two routable symbols
    let http = ScriptedHttpClient::new();
    http.stock("AAPL", aapl_quote(), aapl_statistics(), aapl_profile());
    http.stock("MSFT", aapl_quote(), aapl_statistics(), aapl_profile());
    let config = live_config().with_rate_limit(RateLimit {
        per_minute: 4,
        per_day: 0,
    });
    let service = service_with(&http, config);

    // When: The first fetch leaves a single call in the window
    service.get_stock_report("AAPL").await;
    let before = http.request_count();
    let second = service.get_stock_report("MSFT").await;

    // Then: The second symbol is throttled without any request going out
    assert_eq!(before, 3);
    assert_eq!(http.request_count(), 3);
    assert_eq!(http.requests_for("MSFT"), 0);
    assert!(matches!(
        second.fallback_reason,
        Some(FallbackReason::Fetch(FetchError::Throttled { .. }))
    ));
}

#[tokio::test]
async fn independent_services_do_not_share_cache_state() {
    let http = ScriptedHttpClient::new();
    let first = live_service(&http);
    let second = ScreenerService::new(live_config(), http.clone());

    first.get_stock_data("PG").await;

    assert_eq!(first.cache_len().await, 1);
    assert_eq!(second.cache_len().await, 0);
}
