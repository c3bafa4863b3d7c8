//! Pipeline Integration Tests
//!
//! Formatter selection, execution limits, quality fallback, degradation
//! and post-processing through `OrchestrationService::format`.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use result_formatting::{
    CoreError, CoreResult, DisplayMode, FormatContext, FormatOptions, FormattedResult,
    FormattingConfig, OrchestrationService, Processor, ToolExecutionResult,
};
use serde_json::json;

use crate::support::{empty_service, rows, tool, Behaviour, TestFormatter};

// ============================================================================
// Selection
// ============================================================================

#[tokio::test]
async fn test_custom_high_priority_table_formatter_wins() {
    let service = OrchestrationService::with_defaults(FormattingConfig::default()).unwrap();
    service
        .register_formatter(Arc::new(TestFormatter::new("premium-table", "table", 200, Behaviour::Good)))
        .unwrap();

    let out = service.format(rows(), tool("db_query"), FormatOptions::default()).await.unwrap();
    assert_eq!(out.format, "table");
    assert_eq!(out.metadata.formatter_id.as_deref(), Some("premium-table"));
}

#[tokio::test]
async fn test_higher_priority_ranks_first() {
    let service = empty_service(FormattingConfig::default());
    service
        .register_formatter(Arc::new(TestFormatter::new("fifty", "text", 50, Behaviour::Good)))
        .unwrap();
    service
        .register_formatter(Arc::new(TestFormatter::new("hundred", "text", 100, Behaviour::Good)))
        .unwrap();

    let out = service
        .format(ToolExecutionResult::ok(json!("hi")), tool("echo"), FormatOptions::default())
        .await
        .unwrap();
    assert_eq!(out.metadata.formatter_id.as_deref(), Some("hundred"));
}

#[tokio::test]
async fn test_no_compatible_formatter_leaves_cache_untouched() {
    let service = OrchestrationService::with_defaults(FormattingConfig::default()).unwrap();
    service.unregister_formatter("text");
    service.unregister_formatter("code");

    // Only table/list/card remain, none of which accept a bare number
    let err = service
        .format(ToolExecutionResult::ok(json!(42)), tool("calc"), FormatOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NoFormatterFound(_)));

    let stats = service.cache_stats();
    assert_eq!(stats.entries, 0);
    assert_eq!(stats.sets, 0);
}

#[tokio::test]
async fn test_identical_inputs_select_same_formatter() {
    let mut config = FormattingConfig::default();
    config.cache.enabled = false;
    let service = OrchestrationService::with_defaults(config).unwrap();

    let mut chosen = Vec::new();
    for _ in 0..5 {
        let out = service.format(rows(), tool("db_query"), FormatOptions::default()).await.unwrap();
        chosen.push(out.metadata.formatter_id.clone());
    }
    chosen.dedup();
    assert_eq!(chosen, vec![Some("table".to_string())]);
}

// ============================================================================
// Quality fallback
// ============================================================================

#[tokio::test]
async fn test_low_quality_falls_back_to_text() {
    let service = OrchestrationService::with_defaults(FormattingConfig::default()).unwrap();
    service
        .register_formatter(Arc::new(TestFormatter::new("sloppy", "chart", 500, Behaviour::Sloppy)))
        .unwrap();

    let out = service.format(rows(), tool("metrics"), FormatOptions::default()).await.unwrap();
    assert_eq!(out.metadata.formatter_id.as_deref(), Some("text"));
    assert_eq!(out.format, "text");
    assert!(out.quality_score() >= 0.6, "score was {}", out.quality_score());
}

#[tokio::test]
async fn test_fallback_returned_even_when_still_below_minimum() {
    let mut config = FormattingConfig::default();
    config.quality.min_quality_score = 0.9;
    let service = empty_service(config);
    service
        .register_formatter(Arc::new(TestFormatter::new("sloppy", "chart", 500, Behaviour::Sloppy)))
        .unwrap();
    service
        .register_formatter(Arc::new(TestFormatter::new("terse", "text", 1, Behaviour::Terse)))
        .unwrap();

    let out = service.format(rows(), tool("metrics"), FormatOptions::default()).await.unwrap();
    assert_eq!(out.metadata.formatter_id.as_deref(), Some("terse"));
    let score = out.quality_score();
    assert!(score >= 0.8 && score < 0.9, "score was {}", score);
    assert!(out.errors.is_empty());
}

#[tokio::test]
async fn test_missing_headline_fails_gate_before_scoring() {
    // A zero minimum means only the minimum-standards gate can reject
    let mut config = FormattingConfig::default();
    config.quality.min_quality_score = 0.0;
    let service = empty_service(config);
    service
        .register_formatter(Arc::new(TestFormatter::new("headless", "table", 50, Behaviour::Headless)))
        .unwrap();
    service
        .register_formatter(Arc::new(TestFormatter::new("plain", "text", 1, Behaviour::Good)))
        .unwrap();

    let out = service.format(rows(), tool("db"), FormatOptions::default()).await.unwrap();
    assert_eq!(out.metadata.formatter_id.as_deref(), Some("plain"));
    assert!(!out.summary.headline.is_empty());
}

#[tokio::test]
async fn test_content_type_mismatch_falls_back() {
    let service = empty_service(FormattingConfig::default());
    service
        .register_formatter(Arc::new(TestFormatter::new("mislabeled", "text", 50, Behaviour::Mislabeled)))
        .unwrap();
    service
        .register_formatter(Arc::new(TestFormatter::new("plain", "text", 1, Behaviour::Good)))
        .unwrap();

    let out = service.format(rows(), tool("db"), FormatOptions::default()).await.unwrap();
    assert_eq!(out.metadata.formatter_id.as_deref(), Some("plain"));
    assert_eq!(out.content["type"], json!(out.format));
}

#[tokio::test]
async fn test_content_type_agrees_with_format_when_kept() {
    let mut config = FormattingConfig::default();
    config.quality.fallback_on_low_quality = false;
    let service = empty_service(config);
    service
        .register_formatter(Arc::new(TestFormatter::new("mislabeled", "text", 50, Behaviour::Mislabeled)))
        .unwrap();

    let out = service.format(rows(), tool("db"), FormatOptions::default()).await.unwrap();
    assert_eq!(out.metadata.formatter_id.as_deref(), Some("mislabeled"));
    assert_eq!(out.content["type"], json!("text"));
    assert_eq!(service.invalidate_cache_by_tag("content:text"), 1);
}

#[tokio::test]
async fn test_complete_output_scores_full_marks() {
    let service = empty_service(FormattingConfig::default());
    service
        .register_formatter(Arc::new(TestFormatter::new("plain", "text", 1, Behaviour::Good)))
        .unwrap();

    let out = service
        .format(ToolExecutionResult::ok(json!("hi")), tool("echo"), FormatOptions::default())
        .await
        .unwrap();
    // the engine-recorded score counts toward metadata completeness
    assert!(out.quality_score() > 0.99, "score was {}", out.quality_score());
}

#[tokio::test]
async fn test_low_quality_kept_when_fallback_disabled() {
    let mut config = FormattingConfig::default();
    config.quality.fallback_on_low_quality = false;
    let service = OrchestrationService::with_defaults(config).unwrap();
    service
        .register_formatter(Arc::new(TestFormatter::new("sloppy", "chart", 500, Behaviour::Sloppy)))
        .unwrap();

    let out = service.format(rows(), tool("metrics"), FormatOptions::default()).await.unwrap();
    assert_eq!(out.metadata.formatter_id.as_deref(), Some("sloppy"));
    assert!(out.quality_score() < 0.6);
}

#[tokio::test]
async fn test_validation_disabled_skips_fallback() {
    let mut config = FormattingConfig::default();
    config.quality.enable_quality_validation = false;
    let service = OrchestrationService::with_defaults(config).unwrap();
    service
        .register_formatter(Arc::new(TestFormatter::new("sloppy", "chart", 500, Behaviour::Sloppy)))
        .unwrap();

    let out = service.format(rows(), tool("metrics"), FormatOptions::default()).await.unwrap();
    assert_eq!(out.metadata.formatter_id.as_deref(), Some("sloppy"));
    assert_eq!(out.quality_score(), 1.0);
}

// ============================================================================
// Execution failures
// ============================================================================

#[tokio::test]
async fn test_failure_is_retried_then_falls_back() {
    let service = empty_service(FormattingConfig::default());
    let broken = TestFormatter::new("broken", "table", 100, Behaviour::Fail);
    let broken_calls = broken.calls();
    service.register_formatter(Arc::new(broken)).unwrap();
    service
        .register_formatter(Arc::new(TestFormatter::new("plain", "text", 1, Behaviour::Good)))
        .unwrap();

    let out = service.format(rows(), tool("db"), FormatOptions::default()).await.unwrap();
    // one attempt plus one retry
    assert_eq!(broken_calls.load(Ordering::SeqCst), 2);
    assert_eq!(out.metadata.formatter_id.as_deref(), Some("plain"));
    assert!(out.errors.iter().any(|e| e.stage == "formatting"));
}

#[tokio::test]
async fn test_timeout_without_fallback_degrades() {
    let mut config = FormattingConfig::default();
    config.performance.max_processing_time_ms = 50;
    let service = empty_service(config);
    let slow = TestFormatter::new("slow", "text", 1, Behaviour::Slow(5_000));
    let slow_calls = slow.calls();
    service.register_formatter(Arc::new(slow)).unwrap();

    let started = Instant::now();
    let out = service
        .format(ToolExecutionResult::ok(json!({"id": 7})), tool("api"), FormatOptions::default())
        .await
        .unwrap();

    assert!(started.elapsed() < Duration::from_secs(2));
    // timeouts are not retried
    assert_eq!(slow_calls.load(Ordering::SeqCst), 1);
    assert_eq!(out.format, "text");
    assert_eq!(out.quality_score(), 0.1);
    assert!(out.errors[0].message.contains("timed out after 50ms"));
    assert_eq!(service.cache_stats().entries, 0);
}

#[tokio::test]
async fn test_failed_tool_result_is_still_formatted() {
    let service = OrchestrationService::with_defaults(FormattingConfig::default()).unwrap();
    let out = service
        .format(
            ToolExecutionResult::failed("permission denied"),
            tool("fs_read"),
            FormatOptions::default(),
        )
        .await
        .unwrap();
    assert_eq!(out.format, "text");
    assert!(out.content["text"].as_str().unwrap().contains("permission denied"));
    assert!(out.summary.headline.contains("failed"));
}

// ============================================================================
// Processing
// ============================================================================

struct ExplodingProcessor;

#[async_trait]
impl Processor for ExplodingProcessor {
    fn id(&self) -> &str {
        "exploding"
    }

    fn priority(&self) -> i32 {
        1_000
    }

    async fn process(&self, _result: &FormattedResult, _ctx: &FormatContext) -> CoreResult<FormattedResult> {
        Err(CoreError::internal("processor exploded"))
    }
}

struct TaggingProcessor;

#[async_trait]
impl Processor for TaggingProcessor {
    fn id(&self) -> &str {
        "tagging"
    }

    async fn process(&self, result: &FormattedResult, _ctx: &FormatContext) -> CoreResult<FormattedResult> {
        let mut out = result.clone();
        out.summary.highlights.push("tagged".to_string());
        Ok(out)
    }
}

#[tokio::test]
async fn test_processor_failure_does_not_abort_chain() {
    let service = empty_service(FormattingConfig::default());
    service
        .register_formatter(Arc::new(TestFormatter::new("plain", "text", 1, Behaviour::Good)))
        .unwrap();
    service.register_processor(Arc::new(ExplodingProcessor)).unwrap();
    service.register_processor(Arc::new(TaggingProcessor)).unwrap();

    let out = service
        .format(ToolExecutionResult::ok(json!("x")), tool("echo"), FormatOptions::default())
        .await
        .unwrap();
    assert!(out.summary.highlights.contains(&"tagged".to_string()));
    assert_eq!(out.errors.len(), 1);
    assert_eq!(out.errors[0].stage, "processing");
    assert!(out.errors[0].message.contains("exploding"));
}

#[tokio::test]
async fn test_compact_mode_truncates_long_text() {
    let service = OrchestrationService::with_defaults(FormattingConfig::default()).unwrap();
    let long = "word ".repeat(400);

    let out = service
        .format(
            ToolExecutionResult::ok(json!(long)),
            tool("reader"),
            FormatOptions::default().with_display_mode(DisplayMode::Compact),
        )
        .await
        .unwrap();
    assert_eq!(out.content["truncated"], json!(true));
    assert!(out.content["text"].as_str().unwrap().ends_with('…'));

    let full = service
        .format(ToolExecutionResult::ok(json!(long)), tool("reader"), FormatOptions::default())
        .await
        .unwrap();
    assert!(full.content.get("truncated").is_none());
}
