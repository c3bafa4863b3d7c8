//! Service Integration Tests
//!
//! Batch formatting, previews, analytics wiring, health reporting,
//! configuration loading and shutdown.

use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use result_formatting::{
    AnalyticsConfig, AnalyticsTracker, CoreError, DisplayMode, FormatOptions, FormatRequest,
    FormattingAnalytics, FormattingConfig, HealthStatus, OrchestrationService, ToolExecutionResult,
};
use serde_json::json;

use crate::support::{empty_service, rows, tool, Behaviour, TestFormatter};

// ============================================================================
// Batch
// ============================================================================

#[tokio::test]
async fn test_batch_preserves_order_and_isolates_failures() {
    let service = OrchestrationService::with_defaults(FormattingConfig::default()).unwrap();
    service.unregister_formatter("text");
    service.unregister_formatter("code");

    let items = vec![
        FormatRequest::new(rows(), tool("db")),
        FormatRequest::new(ToolExecutionResult::ok(json!(42)), tool("calc")),
        FormatRequest::new(ToolExecutionResult::ok(json!(["a", "b"])), tool("tags")),
        FormatRequest::new(ToolExecutionResult::ok(json!({"name": "Ada"})), tool("user")),
    ];

    let outcomes = service.format_batch(items).await;
    assert_eq!(outcomes.len(), 4);
    assert_eq!(outcomes[0].as_ref().unwrap().format, "table");
    assert!(matches!(outcomes[1], Err(CoreError::NoFormatterFound(_))));
    assert_eq!(outcomes[2].as_ref().unwrap().format, "list");
    assert_eq!(outcomes[3].as_ref().unwrap().format, "card");
}

#[tokio::test]
async fn test_batch_runs_in_chunks() {
    let mut config = FormattingConfig::default();
    config.performance.concurrent_formatters = 2;
    config.cache.enabled = false;
    let service = empty_service(config);
    service
        .register_formatter(Arc::new(TestFormatter::new("slow", "text", 1, Behaviour::Slow(150))))
        .unwrap();

    let items: Vec<FormatRequest> = (0..5)
        .map(|i| FormatRequest::new(ToolExecutionResult::ok(json!(i)), tool("n")))
        .collect();

    let started = Instant::now();
    let outcomes = service.format_batch(items).await;
    let elapsed = started.elapsed();

    assert!(outcomes.iter().all(|o| o.is_ok()));
    // three chunks of at most two concurrent items
    assert!(elapsed >= Duration::from_millis(400), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(740), "elapsed {:?}", elapsed);
}

#[tokio::test]
async fn test_empty_batch() {
    let service = OrchestrationService::with_defaults(FormattingConfig::default()).unwrap();
    assert!(service.format_batch(Vec::new()).await.is_empty());
}

// ============================================================================
// Preview
// ============================================================================

#[tokio::test]
async fn test_preview_summarizes_without_caching() {
    let service = OrchestrationService::with_defaults(FormattingConfig::default()).unwrap();

    let summary = service
        .preview_format(&rows(), tool("db"), "table", FormatOptions::default())
        .unwrap();
    assert!(summary.headline.contains("db tool"));
    assert_eq!(service.cache_stats().sets, 0);

    let err = service
        .preview_format(&rows(), tool("db"), "chart", FormatOptions::default())
        .unwrap_err();
    assert!(matches!(err, CoreError::NoFormatterFound(_)));

    // list exists but rejects tabular output
    assert!(service
        .preview_format(&rows(), tool("db"), "list", FormatOptions::default())
        .is_err());
}

// ============================================================================
// Analytics
// ============================================================================

#[tokio::test]
async fn test_analytics_receive_pipeline_events() {
    let tracker = Arc::new(AnalyticsTracker::new(AnalyticsConfig {
        track_user_interactions: true,
        ..Default::default()
    }));
    let mut config = FormattingConfig::default();
    config.analytics.track_user_interactions = true;
    let service =
        OrchestrationService::new(config, tracker.clone() as Arc<dyn FormattingAnalytics>).unwrap();
    service
        .register_formatter(Arc::new(TestFormatter::new("plain", "text", 1, Behaviour::Good)))
        .unwrap();
    service
        .register_formatter(Arc::new(TestFormatter::new("broken", "table", 9, Behaviour::Fail)))
        .unwrap();

    service.format(rows(), tool("db"), FormatOptions::default()).await.unwrap();
    service.format(rows(), tool("db"), FormatOptions::default()).await.unwrap();
    service.record_interaction("db", "text", "copy");

    let snap = tracker.snapshot().await.unwrap();
    assert_eq!(snap.total_formatted, 1);
    assert_eq!(snap.cache_hits, 1);
    assert_eq!(snap.cache_misses, 1);
    assert_eq!(snap.by_format["text"], 1);
    assert_eq!(snap.by_tool["db"].interactions, 1);
    // the broken primary failed before the fallback succeeded
    assert_eq!(snap.total_errors, 1);
    assert_eq!(snap.recent_errors[0].context, "execution");
}

#[tokio::test]
async fn test_analytics_disabled_in_config() {
    let tracker = Arc::new(AnalyticsTracker::new(AnalyticsConfig::default()));
    let mut config = FormattingConfig::default();
    config.analytics.enabled = false;
    let service = OrchestrationService::new(config, tracker.clone()).unwrap();
    service
        .register_formatter(Arc::new(TestFormatter::new("plain", "text", 1, Behaviour::Good)))
        .unwrap();

    service.format(rows(), tool("db"), FormatOptions::default()).await.unwrap();
    let snap = tracker.snapshot().await.unwrap();
    assert_eq!(snap.total_formatted, 0);
    assert_eq!(snap.cache_misses, 0);
}

// ============================================================================
// Health and lifecycle
// ============================================================================

#[tokio::test]
async fn test_health_statuses() {
    let service = OrchestrationService::with_defaults(FormattingConfig::default()).unwrap();
    let report = service.health_check();
    assert_eq!(report.status, HealthStatus::Healthy);
    assert!(report.registry.supported_formats.contains(&"table".to_string()));
    assert_eq!(report.quality.rules.len(), 4);

    service.unregister_formatter("text");
    let report = service.health_check();
    assert_eq!(report.status, HealthStatus::Degraded);
    assert_eq!(report.registry.missing_formats, vec!["text"]);

    let empty = empty_service(FormattingConfig::default());
    assert_eq!(empty.health_check().status, HealthStatus::Unhealthy);
}

#[tokio::test]
async fn test_shutdown_releases_everything() {
    let tracker = Arc::new(AnalyticsTracker::new(AnalyticsConfig::default()));
    let service = OrchestrationService::new(FormattingConfig::default(), tracker.clone()).unwrap();
    service
        .register_formatter(Arc::new(TestFormatter::new("plain", "text", 1, Behaviour::Good)))
        .unwrap();
    service.format(rows(), tool("db"), FormatOptions::default()).await.unwrap();

    service.shutdown();

    assert_eq!(service.cache_stats().entries, 0);
    assert!(service.registry().is_empty());
    assert_eq!(service.health_check().status, HealthStatus::Unhealthy);
    assert!(!tracker.is_running());

    let err = service
        .format(rows(), tool("db"), FormatOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NoFormatterFound(_)));
}

// ============================================================================
// Configuration
// ============================================================================

#[tokio::test]
async fn test_service_from_config_file() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        file,
        r#"{{
            "defaultDisplayMode": "compact",
            "cache": {{ "maxEntries": 10, "ttlSeconds": 5 }},
            "performance": {{ "maxProcessingTimeMs": 1000 }}
        }}"#
    )
    .unwrap();

    let config = FormattingConfig::load(file.path()).unwrap();
    assert_eq!(config.default_display_mode, DisplayMode::Compact);
    assert_eq!(config.performance.concurrent_formatters, 5);

    let service = OrchestrationService::with_defaults(config).unwrap();
    assert_eq!(service.cache_stats().max_entries, 10);
    let out = service
        .format(ToolExecutionResult::ok(json!("hi")), tool("echo"), FormatOptions::default())
        .await
        .unwrap();
    assert_eq!(out.format, "text");
}

#[test]
fn test_invalid_config_rejected_at_construction() {
    let mut config = FormattingConfig::default();
    config.performance.max_processing_time_ms = 0;
    let err = OrchestrationService::with_defaults(config).err().unwrap();
    assert!(matches!(err, CoreError::Config(_)));
}
