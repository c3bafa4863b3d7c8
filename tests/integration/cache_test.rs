//! Cache Integration Tests
//!
//! Result caching through the service, plus TTL and LRU behaviour of
//! `ResultCache` on its own.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use result_formatting::{
    Audience, FormatOptions, FormattedResult, FormattingConfig, FormattingConfigUpdate,
    OrchestrationService, ResultCache, ToolExecutionResult,
};
use serde_json::json;

use crate::support::{empty_service, rows, tool, Behaviour, TestFormatter};

fn cached(text: &str) -> FormattedResult {
    FormattedResult::new(
        ToolExecutionResult::ok(json!(text)),
        "text",
        json!({"type": "text", "text": text}),
    )
}

#[tokio::test]
async fn test_second_request_is_served_from_cache() {
    let service = empty_service(FormattingConfig::default());
    let formatter = TestFormatter::new("plain", "text", 1, Behaviour::Good);
    let calls = formatter.calls();
    service.register_formatter(Arc::new(formatter)).unwrap();

    let first = service.format(rows(), tool("db"), FormatOptions::default()).await.unwrap();
    let second = service.format(rows(), tool("db"), FormatOptions::default()).await.unwrap();

    assert!(!first.metadata.cache_hit);
    assert!(second.metadata.cache_hit);
    assert_eq!(first.content, second.content);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let stats = service.cache_stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.entries, 1);
}

#[tokio::test]
async fn test_presentation_options_partition_cache() {
    let service = empty_service(FormattingConfig::default());
    let formatter = TestFormatter::new("plain", "text", 1, Behaviour::Good);
    let calls = formatter.calls();
    service.register_formatter(Arc::new(formatter)).unwrap();

    service.format(rows(), tool("db"), FormatOptions::default()).await.unwrap();
    service
        .format(rows(), tool("db"), FormatOptions::default().with_audience(Audience::Executive))
        .await
        .unwrap();
    service.format(rows(), tool("other"), FormatOptions::default()).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(service.cache_stats().entries, 3);
}

#[tokio::test]
async fn test_disabled_cache_formats_every_time() {
    let mut config = FormattingConfig::default();
    config.cache.enabled = false;
    let service = empty_service(config);
    let formatter = TestFormatter::new("plain", "text", 1, Behaviour::Good);
    let calls = formatter.calls();
    service.register_formatter(Arc::new(formatter)).unwrap();

    for _ in 0..3 {
        let out = service.format(rows(), tool("db"), FormatOptions::default()).await.unwrap();
        assert!(!out.metadata.cache_hit);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(service.cache_stats().sets, 0);
}

#[tokio::test]
async fn test_invalidate_by_tag_and_clear() {
    let service = OrchestrationService::with_defaults(FormattingConfig::default()).unwrap();
    service.format(rows(), tool("db"), FormatOptions::default()).await.unwrap();
    service
        .format(ToolExecutionResult::ok(json!("hello")), tool("echo"), FormatOptions::default())
        .await
        .unwrap();
    assert_eq!(service.cache_stats().entries, 2);

    assert_eq!(service.invalidate_cache_by_tag("format:table"), 1);
    assert_eq!(service.cache_stats().entries, 1);
    assert_eq!(service.invalidate_cache_by_tag("format:table"), 0);

    service.clear_cache();
    assert_eq!(service.cache_stats().entries, 0);
}

#[tokio::test]
async fn test_shrinking_max_entries_evicts() {
    let service = empty_service(FormattingConfig::default());
    service
        .register_formatter(Arc::new(TestFormatter::new("plain", "text", 1, Behaviour::Good)))
        .unwrap();
    for i in 0..4 {
        service
            .format(ToolExecutionResult::ok(json!(i)), tool("n"), FormatOptions::default())
            .await
            .unwrap();
    }

    let mut update = FormattingConfigUpdate::default();
    update.cache.max_entries = Some(2);
    service.update_config(update).unwrap();

    let stats = service.cache_stats();
    assert_eq!(stats.entries, 2);
    assert_eq!(stats.evictions, 2);
}

#[tokio::test]
async fn test_compression_enabled_through_config() {
    let mut config = FormattingConfig::default();
    config.cache.compression_enabled = true;
    let service = OrchestrationService::with_defaults(config).unwrap();
    let big = json!((0..200).map(|i| json!({"id": i, "label": "repeated label"})).collect::<Vec<_>>());

    let first = service
        .format(ToolExecutionResult::ok(big.clone()), tool("bulk"), FormatOptions::default())
        .await
        .unwrap();
    let second = service
        .format(ToolExecutionResult::ok(big), tool("bulk"), FormatOptions::default())
        .await
        .unwrap();

    assert!(second.metadata.cache_hit);
    assert_eq!(first.content, second.content);
    assert!(service.cache_stats().compression_savings_bytes > 0);
}

// ============================================================================
// ResultCache
// ============================================================================

#[test]
fn test_ttl_one_second_expiry() {
    let cache = ResultCache::new(100, Duration::from_secs(1));
    cache.set("k", &cached("v"));

    std::thread::sleep(Duration::from_millis(500));
    assert!(cache.get("k").is_some());

    std::thread::sleep(Duration::from_millis(600));
    assert!(cache.get("k").is_none());

    let stats = cache.stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.expirations, 1);
}

#[test]
fn test_lru_victim_is_least_recently_used() {
    let cache = ResultCache::new(2, Duration::from_secs(60));
    cache.set("k1", &cached("1"));
    cache.set("k2", &cached("2"));
    assert!(cache.get("k1").is_some());
    cache.set("k3", &cached("3"));

    assert!(cache.get("k1").is_some());
    assert!(cache.get("k2").is_none());
    assert!(cache.get("k3").is_some());
}

#[test]
fn test_recently_read_entry_survives_eviction() {
    let cache = ResultCache::new(3, Duration::from_secs(60));
    cache.set("k1", &cached("1"));
    cache.set("k2", &cached("2"));
    assert!(cache.get("k1").is_some());
    cache.set("k3", &cached("3"));
    cache.set("k4", &cached("4"));

    assert_eq!(cache.len(), 3);
    assert!(cache.contains("k1"));
    assert!(!cache.contains("k2"));
    assert!(cache.contains("k3"));
    assert!(cache.contains("k4"));
    assert_eq!(cache.stats().evictions, 1);
}

#[test]
fn test_inserts_never_exceed_capacity() {
    let cache = ResultCache::new(5, Duration::from_secs(60));
    for i in 0..50 {
        cache.set(&format!("k{}", i), &cached("x"));
        assert!(cache.len() <= 5);
    }
    assert!(cache.contains("k49"));
    assert!(!cache.contains("k0"));
}
