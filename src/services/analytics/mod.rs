//! Formatting Analytics
//!
//! The analytics collaborator receives fire-and-forget events from the
//! orchestration service. Implementations must never block the caller.
//!
//! - `NoopAnalytics` - discards every event
//! - `AnalyticsTracker` - channel-backed in-memory aggregation

pub mod tracker;

pub use tracker::{
    AnalyticsSnapshot, AnalyticsTracker, ErrorEvent, TrackerMessage, ToolUsage,
};

use result_formatting_core::CoreError;

/// Sink for formatting events.
pub trait FormattingAnalytics: Send + Sync {
    /// A result was formatted (cache misses only).
    fn record_formatting(&self, tool_id: &str, format: &str, processing_time_ms: f64, quality_score: f64);

    /// A formatter failed or the engine produced a degraded result.
    fn record_error(&self, tool_id: &str, error: &CoreError, context: &str);

    fn record_cache_hit(&self, tool_id: &str);

    fn record_cache_miss(&self);

    /// A user interacted with a rendered result (e.g. expanded, copied).
    fn record_interaction(&self, _tool_id: &str, _format: &str, _action: &str) {}

    /// Stop background work. Events recorded afterwards are dropped.
    fn shutdown(&self) {}
}

/// Analytics sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAnalytics;

impl FormattingAnalytics for NoopAnalytics {
    fn record_formatting(&self, _tool_id: &str, _format: &str, _ms: f64, _quality: f64) {}

    fn record_error(&self, _tool_id: &str, _error: &CoreError, _context: &str) {}

    fn record_cache_hit(&self, _tool_id: &str) {}

    fn record_cache_miss(&self) {}
}
