//! Orchestration Service
//!
//! Runs one formatting request through the pipeline:
//!
//! ```text
//! cache lookup ─hit──────────────────────────────────────────────▶ done
//!      │miss
//!      ▼
//! select ─none─▶ NoFormatterFound
//!      │
//!      ▼
//! execute ─fail─▶ fallback ─fail─▶ degraded (not cached) ─────────▶ done
//!      │              │
//!      ▼              ▼
//! validate ─reject─▶ fallback ─▶ process ─▶ cache ──────────────▶ done
//! ```
//!
//! Formatter failures never reach the caller; only `NoFormatterFound`
//! (and configuration errors) do.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use chrono::Utc;
use futures_util::future::join_all;
use result_formatting_core::{
    formats, Audience, CoreError, CoreResult, DisplayMode, FormatContext, FormattedResult,
    Formatter, Processor, ResultSummary, ToolDescriptor, ToolExecutionResult,
};
use result_formatting_formatters::{default_formatters, default_processors, render_text};
use result_formatting_quality::{QualityAnalysis, QualityRule, QualityValidator};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::fingerprint;
use crate::models::config::{FormattingConfig, FormattingConfigUpdate};
use crate::models::health::{CacheHealth, HealthReport, QualityHealth};
use crate::services::analytics::{FormattingAnalytics, NoopAnalytics};
use crate::services::cache::{CacheStats, CompressionHook, GzipCompression, ResultCache};
use crate::services::registry::FormatterRegistry;

/// Version stamped on results whose formatter left it empty.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Quality score pinned on degraded results.
pub const DEGRADED_QUALITY: f64 = 0.1;

// ============================================================================
// Request types
// ============================================================================

/// Per-request presentation overrides. Unset fields use the configured defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatOptions {
    pub display_mode: Option<DisplayMode>,
    pub audience: Option<Audience>,
    pub locale: Option<String>,
    pub timezone: Option<String>,
    pub conversation_id: Option<String>,
    pub user_id: Option<String>,
    pub workspace_id: Option<String>,
    #[serde(default)]
    pub previous_results: Vec<FormattedResult>,
}

impl FormatOptions {
    pub fn with_display_mode(mut self, mode: DisplayMode) -> Self {
        self.display_mode = Some(mode);
        self
    }

    pub fn with_audience(mut self, audience: Audience) -> Self {
        self.audience = Some(audience);
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }
}

/// One item of a batch request.
#[derive(Debug, Clone)]
pub struct FormatRequest {
    pub result: ToolExecutionResult,
    pub tool: ToolDescriptor,
    pub options: FormatOptions,
}

impl FormatRequest {
    pub fn new(result: ToolExecutionResult, tool: ToolDescriptor) -> Self {
        Self {
            result,
            tool,
            options: FormatOptions::default(),
        }
    }

    pub fn with_options(mut self, options: FormatOptions) -> Self {
        self.options = options;
        self
    }
}

// ============================================================================
// OrchestrationService
// ============================================================================

/// Entry point of the formatting engine.
///
/// Owns the registry, cache and validator. Construct one per host with
/// `new` or `with_defaults`, and call `shutdown` when done.
pub struct OrchestrationService {
    config: RwLock<FormattingConfig>,
    registry: Arc<FormatterRegistry>,
    cache: Arc<ResultCache>,
    validator: RwLock<QualityValidator>,
    analytics: Arc<dyn FormattingAnalytics>,
}

impl OrchestrationService {
    /// Create a service with an empty registry.
    ///
    /// Starts the cache sweeper when caching is enabled and a tokio runtime
    /// is available.
    pub fn new(config: FormattingConfig, analytics: Arc<dyn FormattingAnalytics>) -> CoreResult<Self> {
        config.validate()?;

        let cache = Arc::new(ResultCache::from_config(&config.cache));
        if config.cache.enabled {
            cache.spawn_sweeper(Duration::from_secs(config.cache.cleanup_interval_seconds));
        }
        let validator = QualityValidator::new(config.quality.enable_quality_validation);

        info!(
            cache_enabled = config.cache.enabled,
            max_entries = config.cache.max_entries,
            min_quality = config.quality.min_quality_score,
            "Orchestration service created"
        );

        Ok(Self {
            config: RwLock::new(config),
            registry: Arc::new(FormatterRegistry::new()),
            cache,
            validator: RwLock::new(validator),
            analytics,
        })
    }

    /// Create a service with the built-in formatters and processors and no analytics.
    pub fn with_defaults(config: FormattingConfig) -> CoreResult<Self> {
        let service = Self::new(config, Arc::new(NoopAnalytics))?;
        for formatter in default_formatters() {
            service.register_formatter(formatter)?;
        }
        for processor in default_processors() {
            service.register_processor(processor)?;
        }
        Ok(service)
    }

    fn read_config(&self) -> RwLockReadGuard<'_, FormattingConfig> {
        self.config.read().unwrap_or_else(|e| e.into_inner())
    }

    fn read_validator(&self) -> RwLockReadGuard<'_, QualityValidator> {
        self.validator.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_validator(&self) -> RwLockWriteGuard<'_, QualityValidator> {
        self.validator.write().unwrap_or_else(|e| e.into_inner())
    }

    // ── Formatting ──────────────────────────────────────────────────────

    /// Format a tool result.
    pub async fn format(
        &self,
        result: ToolExecutionResult,
        tool: ToolDescriptor,
        options: FormatOptions,
    ) -> CoreResult<FormattedResult> {
        let started = Instant::now();
        let config = self.config();
        let ctx = Arc::new(build_context(tool, options, &config));
        let result = Arc::new(result);

        // Cache lookup
        let key = fingerprint::cache_key(&result, &ctx);
        if config.cache.enabled {
            if let Some(mut hit) = self.cache.get(&key) {
                hit.metadata.cache_hit = true;
                debug!(tool_id = %ctx.tool_id, key = %key, "Cache hit");
                if config.analytics.enabled {
                    self.analytics.record_cache_hit(&ctx.tool_id);
                }
                return Ok(hit);
            }
            if config.analytics.enabled {
                self.analytics.record_cache_miss();
            }
        }

        // Selection
        let candidates = self.registry.get_compatible_formatters(&result, &ctx);
        let primary = candidates.first().cloned().ok_or_else(|| {
            CoreError::no_formatter(format!(
                "no compatible formatter for tool '{}' ({} output)",
                ctx.tool_id,
                result.output_shape()
            ))
        })?;

        // Execution, validation and fallback
        let formatted = match self.execute(&primary, &result, &ctx, &config).await {
            Ok(formatted) => {
                self.validate_or_fallback(formatted, &primary, &candidates, &result, &ctx, &config)
                    .await
            }
            Err(e) => {
                warn!(tool_id = %ctx.tool_id, formatter_id = primary.id(), error = %e, "Primary formatter failed");
                if config.analytics.enabled {
                    self.analytics.record_error(&ctx.tool_id, &e, "execution");
                }
                match self
                    .recover(&e, &primary, &candidates, &result, &ctx, &config)
                    .await
                {
                    Some(formatted) => formatted,
                    None => return Ok(self.degrade(&e, &result, &ctx, &config, started)),
                }
            }
        };

        // Processing
        let mut processed = self.run_processors(formatted, &ctx).await;
        processed.metadata.processing_time_ms = Some(elapsed_ms(started));

        // Caching
        if config.cache.enabled {
            self.cache.set(&key, &processed);
        }

        if config.analytics.enabled {
            self.analytics.record_formatting(
                &ctx.tool_id,
                &processed.format,
                elapsed_ms(started),
                processed.quality_score(),
            );
        }

        debug!(
            tool_id = %ctx.tool_id,
            format = %processed.format,
            quality = processed.quality_score(),
            elapsed_ms = elapsed_ms(started),
            "Formatting complete"
        );
        Ok(processed)
    }

    /// Format many results.
    ///
    /// Items are processed in chunks of `concurrent_formatters`; items in a
    /// chunk run concurrently and each chunk completes before the next
    /// starts. Outcomes are returned in input order and are independent of
    /// each other.
    pub async fn format_batch(&self, items: Vec<FormatRequest>) -> Vec<CoreResult<FormattedResult>> {
        let chunk_size = self.read_config().performance.concurrent_formatters.max(1);
        let total = items.len();
        let mut outcomes = Vec::with_capacity(total);

        let mut pending = items.into_iter().peekable();
        while pending.peek().is_some() {
            let chunk: Vec<FormatRequest> = pending.by_ref().take(chunk_size).collect();
            let results = join_all(
                chunk
                    .into_iter()
                    .map(|req| self.format(req.result, req.tool, req.options)),
            )
            .await;
            outcomes.extend(results);
        }

        let failed = outcomes.iter().filter(|o| o.is_err()).count();
        info!(total, failed, chunk_size, "Batch formatting complete");
        outcomes
    }

    /// Summary the best formatter for `target_format` would produce.
    ///
    /// Runs only `summarize`; nothing is executed or cached.
    pub fn preview_format(
        &self,
        result: &ToolExecutionResult,
        tool: ToolDescriptor,
        target_format: &str,
        options: FormatOptions,
    ) -> CoreResult<ResultSummary> {
        let config = self.config();
        let ctx = build_context(tool, options, &config);

        self.registry
            .get_formatters_by_format(target_format)
            .into_iter()
            .find(|f| f.can_format(result, &ctx).unwrap_or(false))
            .map(|f| f.summarize(result, &ctx))
            .ok_or_else(|| {
                CoreError::no_formatter(format!(
                    "no formatter for format '{}' accepts this result",
                    target_format
                ))
            })
    }

    /// Full quality analysis of a result with the current rule set.
    pub fn analyze_quality(&self, result: &FormattedResult) -> QualityAnalysis {
        self.read_validator().analyze_quality(result)
    }

    /// Forward a user interaction to analytics when interaction tracking is on.
    pub fn record_interaction(&self, tool_id: &str, format: &str, action: &str) {
        let config = self.read_config();
        if config.analytics.enabled && config.analytics.track_user_interactions {
            self.analytics.record_interaction(tool_id, format, action);
        }
    }

    // ── Pipeline stages ─────────────────────────────────────────────────

    /// Run a formatter with the configured deadline, retrying execution errors.
    async fn execute(
        &self,
        formatter: &Arc<dyn Formatter>,
        result: &Arc<ToolExecutionResult>,
        ctx: &Arc<FormatContext>,
        config: &FormattingConfig,
    ) -> CoreResult<FormattedResult> {
        let timeout_ms = config.performance.max_processing_time_ms;
        let attempts = config.performance.retry_attempts + 1;
        let mut attempt = 1;

        loop {
            let started = Instant::now();
            match run_formatter(formatter.clone(), result.clone(), ctx.clone(), timeout_ms).await {
                Ok(mut formatted) => {
                    stamp_metadata(&mut formatted, formatter.id(), elapsed_ms(started));
                    return Ok(formatted);
                }
                Err(e @ CoreError::FormattingTimeout { .. }) => return Err(e),
                Err(e) if attempt < attempts => {
                    debug!(formatter_id = formatter.id(), attempt, error = %e, "Retrying formatter");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Keep a passing result, or re-run with a fallback formatter when the
    /// result is rejected.
    ///
    /// A result is rejected when it fails the minimum-standards gate (without
    /// being fully scored), when its `content.type` disagrees with its format,
    /// or when its score is below the configured minimum. A fallback result
    /// is returned even if its own score is still low.
    async fn validate_or_fallback(
        &self,
        mut formatted: FormattedResult,
        primary: &Arc<dyn Formatter>,
        candidates: &[Arc<dyn Formatter>],
        result: &Arc<ToolExecutionResult>,
        ctx: &Arc<FormatContext>,
        config: &FormattingConfig,
    ) -> FormattedResult {
        let quality = &config.quality;
        if !quality.enable_quality_validation {
            return self.finalize(formatted);
        }

        let rejection = match self.review(&mut formatted, quality.min_quality_score) {
            Some(reason) => reason,
            None => return formatted,
        };

        if !quality.fallback_on_low_quality {
            debug!(formatter_id = primary.id(), reason = %rejection, "Rejected result kept, fallback disabled");
            return self.finalize(formatted);
        }

        let fallback = match select_fallback(primary, candidates, &config.default_format) {
            Some(f) => f,
            None => {
                let mut formatted = self.finalize(formatted);
                formatted.push_error(
                    "quality",
                    format!("{}; no fallback formatter available", rejection),
                );
                return formatted;
            }
        };

        info!(
            primary = primary.id(),
            fallback = fallback.id(),
            reason = %rejection,
            "Result rejected, trying fallback formatter"
        );

        match self.execute(&fallback, result, ctx, config).await {
            Ok(replacement) => self.finalize(replacement),
            Err(e) => {
                warn!(fallback = fallback.id(), error = %e, "Fallback formatter failed, keeping primary result");
                let mut formatted = self.finalize(formatted);
                formatted.push_error("fallback", e.to_string());
                formatted
            }
        }
    }

    /// Why a freshly executed result should be replaced, or `None` when it
    /// passes. Scores the result only once the cheap checks have passed.
    fn review(&self, formatted: &mut FormattedResult, min_score: f64) -> Option<String> {
        let validator = self.read_validator();
        if !validator.meets_minimum_standards(formatted) {
            return Some("result is missing a format, content, headline or timestamp".to_string());
        }
        if let Some(content_type) = formatted.content_type() {
            if content_type != formatted.format {
                return Some(format!(
                    "content type '{}' does not match format '{}'",
                    content_type, formatted.format
                ));
            }
        }

        let score = score_into(&validator, formatted);
        if score < min_score {
            return Some(format!("quality score {:.2} below minimum {:.2}", score, min_score));
        }
        None
    }

    /// Align `content.type` with the format and record the final score.
    fn finalize(&self, mut formatted: FormattedResult) -> FormattedResult {
        align_content_type(&mut formatted);
        score_into(&self.read_validator(), &mut formatted);
        formatted
    }

    /// Try a fallback formatter after the primary failed to execute.
    async fn recover(
        &self,
        primary_error: &CoreError,
        primary: &Arc<dyn Formatter>,
        candidates: &[Arc<dyn Formatter>],
        result: &Arc<ToolExecutionResult>,
        ctx: &Arc<FormatContext>,
        config: &FormattingConfig,
    ) -> Option<FormattedResult> {
        let fallback = select_fallback(primary, candidates, &config.default_format)?;
        info!(primary = primary.id(), fallback = fallback.id(), "Trying fallback formatter");

        match self.execute(&fallback, result, ctx, config).await {
            Ok(formatted) => {
                let mut formatted = self.finalize(formatted);
                formatted.push_error("formatting", primary_error.to_string());
                Some(formatted)
            }
            Err(e) => {
                warn!(fallback = fallback.id(), error = %e, "Fallback formatter failed");
                if config.analytics.enabled {
                    self.analytics.record_error(&ctx.tool_id, &e, "fallback");
                }
                None
            }
        }
    }

    /// Build the degraded plain-text result returned when every formatter failed.
    fn degrade(
        &self,
        cause: &CoreError,
        result: &ToolExecutionResult,
        ctx: &FormatContext,
        config: &FormattingConfig,
        started: Instant,
    ) -> FormattedResult {
        error!(tool_id = %ctx.tool_id, error = %cause, "All formatters failed, returning degraded result");

        let summary = if result.success {
            ResultSummary::new(
                format!("{} returned a result", ctx.tool.name),
                "The result could not be formatted, so the raw output is shown as plain text.",
            )
        } else {
            ResultSummary::new(
                format!("{} failed", ctx.tool.name),
                result
                    .error
                    .clone()
                    .unwrap_or_else(|| "The tool reported a failure without details.".to_string()),
            )
        };

        let content = serde_json::json!({
            "type": formats::TEXT,
            "text": render_text(result),
        });

        let mut degraded = FormattedResult::new(result.clone(), formats::TEXT, content).with_summary(summary);
        degraded.metadata.formatted_at = Some(Utc::now());
        degraded.metadata.version = ENGINE_VERSION.to_string();
        degraded.metadata.processing_time_ms = Some(elapsed_ms(started));
        degraded.metadata.quality_score = Some(DEGRADED_QUALITY);
        degraded.push_error("formatting", cause.to_string());

        if config.analytics.enabled {
            self.analytics.record_error(&ctx.tool_id, cause, "degraded");
        }
        degraded
    }

    /// Apply processors in priority order. A failing processor is skipped.
    async fn run_processors(&self, formatted: FormattedResult, ctx: &FormatContext) -> FormattedResult {
        let mut current = formatted;
        for processor in self.registry.get_processors() {
            match processor.process(&current, ctx).await {
                Ok(next) => current = next,
                Err(e) => {
                    let err = CoreError::processor(processor.id(), e.to_string());
                    warn!(processor_id = processor.id(), error = %e, "Processor failed, continuing");
                    current.push_error("processing", err.to_string());
                }
            }
        }
        current
    }

    // ── Plugins ─────────────────────────────────────────────────────────

    pub fn register_formatter(&self, formatter: Arc<dyn Formatter>) -> CoreResult<()> {
        self.registry.register(formatter)
    }

    pub fn unregister_formatter(&self, id: &str) -> bool {
        self.registry.unregister(id)
    }

    pub fn register_processor(&self, processor: Arc<dyn Processor>) -> CoreResult<()> {
        self.registry.register_processor(processor)
    }

    pub fn unregister_processor(&self, id: &str) -> bool {
        self.registry.unregister_processor(id)
    }

    /// Add a custom quality rule alongside the defaults.
    pub fn add_quality_rule(&self, rule: Box<dyn QualityRule>) {
        self.write_validator().add_rule(rule);
    }

    pub fn registry(&self) -> &Arc<FormatterRegistry> {
        &self.registry
    }

    // ── Configuration ───────────────────────────────────────────────────

    /// Snapshot of the current configuration.
    pub fn config(&self) -> FormattingConfig {
        self.read_config().clone()
    }

    /// Apply a partial configuration update.
    ///
    /// The update is validated before it takes effect; an invalid update
    /// leaves the configuration unchanged.
    pub fn update_config(&self, update: FormattingConfigUpdate) -> CoreResult<()> {
        let mut next = self.config();
        next.apply_update(update);
        next.validate()?;

        let previous = {
            let mut config = self.config.write().unwrap_or_else(|e| e.into_inner());
            std::mem::replace(&mut *config, next.clone())
        };

        let cache = &next.cache;
        self.cache
            .reconfigure(cache.max_entries, Duration::from_secs(cache.ttl_seconds));
        if cache.compression_enabled != previous.cache.compression_enabled {
            let hook: Option<Arc<dyn CompressionHook>> = if cache.compression_enabled {
                Some(Arc::new(GzipCompression::default()))
            } else {
                None
            };
            self.cache.set_compression(hook);
        }
        if !cache.enabled {
            self.cache.stop_sweeper();
            self.cache.clear();
        } else if !previous.cache.enabled
            || cache.cleanup_interval_seconds != previous.cache.cleanup_interval_seconds
        {
            self.cache
                .spawn_sweeper(Duration::from_secs(cache.cleanup_interval_seconds));
        }

        self.write_validator()
            .set_enabled(next.quality.enable_quality_validation);

        info!("Configuration updated");
        Ok(())
    }

    // ── Cache ───────────────────────────────────────────────────────────

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Remove cached results carrying `tag`. Returns the number removed.
    pub fn invalidate_cache_by_tag(&self, tag: &str) -> usize {
        self.cache.invalidate_by_tag(tag)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    // ── Lifecycle ───────────────────────────────────────────────────────

    /// Health of the registry, cache and validator.
    pub fn health_check(&self) -> HealthReport {
        let config = self.config();
        let registry = self.registry.health_check();
        let stats = self.cache.stats();
        let validator = self.read_validator();

        let report = HealthReport {
            status: HealthReport::status_for(&registry),
            registry,
            cache: CacheHealth {
                enabled: config.cache.enabled,
                entries: stats.entries,
                max_entries: stats.max_entries,
                hit_rate: stats.hit_rate,
            },
            quality: QualityHealth {
                enabled: validator.is_enabled(),
                min_quality_score: config.quality.min_quality_score,
                rules: validator.rule_ids(),
            },
            checked_at: Utc::now(),
        };

        if !report.is_healthy() {
            warn!(
                status = %report.status,
                missing = ?report.registry.missing_formats,
                "Formatting engine is not healthy"
            );
        }
        report
    }

    /// Stop background work and release every plugin and cached result.
    pub fn shutdown(&self) {
        self.cache.stop_sweeper();
        self.cache.clear();
        self.registry.clear();
        self.analytics.shutdown();
        info!("Orchestration service shut down");
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

/// Merge request options with configured defaults.
fn build_context(tool: ToolDescriptor, options: FormatOptions, config: &FormattingConfig) -> FormatContext {
    let mut ctx = FormatContext::new(tool)
        .with_display_mode(options.display_mode.unwrap_or(config.default_display_mode))
        .with_audience(options.audience.unwrap_or_default())
        .with_previous_results(options.previous_results);
    if let Some(locale) = options.locale {
        ctx = ctx.with_locale(locale);
    }
    if let Some(timezone) = options.timezone {
        ctx = ctx.with_timezone(timezone);
    }
    ctx.conversation_id = options.conversation_id;
    ctx.user_id = options.user_id;
    ctx.workspace_id = options.workspace_id;
    ctx
}

/// Spawn a formatter and wait at most `timeout_ms` for it.
///
/// On timeout the task is aborted so its output can never be observed.
async fn run_formatter(
    formatter: Arc<dyn Formatter>,
    result: Arc<ToolExecutionResult>,
    ctx: Arc<FormatContext>,
    timeout_ms: u64,
) -> CoreResult<FormattedResult> {
    let id = formatter.id().to_string();
    let mut task = tokio::spawn(async move { formatter.format(&result, &ctx).await });

    match tokio::time::timeout(Duration::from_millis(timeout_ms), &mut task).await {
        Ok(Ok(Ok(formatted))) => Ok(formatted),
        Ok(Ok(Err(e))) if e.is_execution_failure() => Err(e),
        Ok(Ok(Err(e))) => Err(CoreError::execution(id, e.to_string())),
        Ok(Err(join_err)) if join_err.is_panic() => Err(CoreError::execution(id, "formatter panicked")),
        Ok(Err(_)) => Err(CoreError::execution(id, "formatter task was cancelled")),
        Err(_) => {
            task.abort();
            Err(CoreError::timeout(id, timeout_ms))
        }
    }
}

/// Engine-owned metadata stamped after a formatter returns.
fn stamp_metadata(formatted: &mut FormattedResult, formatter_id: &str, processing_ms: f64) {
    let meta = &mut formatted.metadata;
    meta.formatter_id = Some(formatter_id.to_string());
    meta.formatted_at = Some(Utc::now());
    meta.processing_time_ms = Some(processing_ms);
    meta.cache_hit = false;
    if meta.version.trim().is_empty() {
        meta.version = ENGINE_VERSION.to_string();
    }

    let format = formatted.format.clone();
    if let Some(content) = formatted.content.as_object_mut() {
        content
            .entry("type")
            .or_insert_with(|| serde_json::Value::String(format));
    }
}

/// Score `formatted` and record the score in its metadata.
///
/// The engine always records a score, so the metadata is scored as if one
/// were already present.
fn score_into(validator: &QualityValidator, formatted: &mut FormattedResult) -> f64 {
    formatted.metadata.quality_score.get_or_insert(0.0);
    let score = validator.score(formatted);
    formatted.metadata.quality_score = Some(score);
    score
}

/// Overwrite a disagreeing `content.type` with the result's format.
fn align_content_type(formatted: &mut FormattedResult) {
    let format = formatted.format.clone();
    if let Some(content) = formatted.content.as_object_mut() {
        let agrees = content.get("type").and_then(|t| t.as_str()) == Some(format.as_str());
        if !agrees {
            if let Some(previous) = content.insert("type".to_string(), serde_json::Value::String(format)) {
                debug!(previous = %previous, "Replaced disagreeing content type");
            }
        }
    }
}

/// Next-best formatter other than `primary`, preferring one that supports
/// `preferred_format`.
fn select_fallback(
    primary: &Arc<dyn Formatter>,
    candidates: &[Arc<dyn Formatter>],
    preferred_format: &str,
) -> Option<Arc<dyn Formatter>> {
    let others = || candidates.iter().filter(|f| f.id() != primary.id());
    others()
        .find(|f| f.supports_format(preferred_format))
        .or_else(|| others().next())
        .cloned()
}

// ============================================================================
// Tests
// ============================================================================
