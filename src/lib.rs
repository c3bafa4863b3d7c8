//! Result Formatting Engine
//!
//! Turns raw tool execution results into presentation-ready
//! `FormattedResult`s. The engine picks the best registered formatter,
//! bounds its execution time, scores the output, falls back when quality
//! is too low, post-processes, and caches the outcome.
//!
//! Workspace layout:
//! - `result_formatting_core` - models, context, plugin traits, errors
//! - `result_formatting_quality` - weighted quality rules and validator
//! - `result_formatting_formatters` - built-in formatters and processors
//! - this crate - configuration, registry, cache, analytics, orchestration

pub mod models;
pub mod services;

// ── Engine ──────────────────────────────────────────────────────────────
pub use models::config::{
    AnalyticsConfig, CacheConfig, FormattingConfig, FormattingConfigUpdate, PerformanceConfig,
    QualityConfig,
};
pub use models::health::{HealthReport, HealthStatus};
pub use services::analytics::{AnalyticsSnapshot, AnalyticsTracker, FormattingAnalytics, NoopAnalytics};
pub use services::cache::{CacheStats, CompressionHook, GzipCompression, ResultCache};
pub use services::orchestrator::{FormatOptions, FormatRequest, OrchestrationService};
pub use services::registry::FormatterRegistry;

// ── Workspace crates ────────────────────────────────────────────────────
pub use result_formatting_core::{
    formats, Audience, CoreError, CoreResult, DisplayMode, FormatContext, FormatMetadata,
    FormattedResult, Formatter, FormatterDefinition, FormatterExecutable, OutputShape, Processor,
    ResultSummary, ToolCompatibility, ToolDescriptor, ToolExecutionResult,
};
pub use result_formatting_quality::{
    IssueSeverity, QualityAnalysis, QualityIssue, QualityRule, QualityValidator,
};
