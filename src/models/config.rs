//! Engine Configuration
//!
//! Typed configuration with explicit defaults, partial updates, and
//! validation. Configuration can be built in code, loaded from a JSON or
//! TOML file, and changed at runtime through `FormattingConfigUpdate`.

use std::path::Path;

use result_formatting_core::{formats, CoreError, CoreResult, DisplayMode};
use serde::{Deserialize, Serialize};

// ============================================================================
// Sections
// ============================================================================

/// Result cache settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Entry lifetime in seconds. Zero disables expiry.
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
    #[serde(default)]
    pub compression_enabled: bool,
    /// Interval of the background expiry sweep
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: default_ttl_seconds(),
            max_entries: default_max_entries(),
            compression_enabled: false,
            cleanup_interval_seconds: default_cleanup_interval(),
        }
    }
}

/// Execution limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceConfig {
    #[serde(default = "default_max_processing_time_ms")]
    pub max_processing_time_ms: u64,
    /// Batch chunk size / concurrency limit
    #[serde(default = "default_concurrent_formatters")]
    pub concurrent_formatters: usize,
    /// Extra attempts on the same formatter after an execution error
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            max_processing_time_ms: default_max_processing_time_ms(),
            concurrent_formatters: default_concurrent_formatters(),
            retry_attempts: default_retry_attempts(),
        }
    }
}

/// Quality gate settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityConfig {
    #[serde(default = "default_min_quality_score")]
    pub min_quality_score: f64,
    #[serde(default = "default_true")]
    pub enable_quality_validation: bool,
    #[serde(default = "default_true")]
    pub fallback_on_low_quality: bool,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            min_quality_score: default_min_quality_score(),
            enable_quality_validation: true,
            fallback_on_low_quality: true,
        }
    }
}

/// Analytics reporting settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub track_user_interactions: bool,
    #[serde(default = "default_retention_days")]
    pub retention_period_days: u32,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            track_user_interactions: false,
            retention_period_days: default_retention_days(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_ttl_seconds() -> u64 {
    300
}

fn default_max_entries() -> usize {
    1000
}

fn default_cleanup_interval() -> u64 {
    60
}

fn default_max_processing_time_ms() -> u64 {
    5000
}

fn default_concurrent_formatters() -> usize {
    5
}

fn default_retry_attempts() -> u32 {
    1
}

fn default_min_quality_score() -> f64 {
    0.6
}

fn default_retention_days() -> u32 {
    30
}

fn default_format() -> String {
    formats::TEXT.to_string()
}

// ============================================================================
// FormattingConfig
// ============================================================================

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattingConfig {
    #[serde(default = "default_format")]
    pub default_format: String,
    #[serde(default)]
    pub default_display_mode: DisplayMode,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub performance: PerformanceConfig,
    #[serde(default)]
    pub quality: QualityConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

impl Default for FormattingConfig {
    fn default() -> Self {
        Self {
            default_format: default_format(),
            default_display_mode: DisplayMode::default(),
            cache: CacheConfig::default(),
            performance: PerformanceConfig::default(),
            quality: QualityConfig::default(),
            analytics: AnalyticsConfig::default(),
        }
    }
}

/// Partial update for `CacheConfig`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheConfigUpdate {
    pub enabled: Option<bool>,
    pub ttl_seconds: Option<u64>,
    pub max_entries: Option<usize>,
    pub compression_enabled: Option<bool>,
    pub cleanup_interval_seconds: Option<u64>,
}

/// Partial update for `PerformanceConfig`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceConfigUpdate {
    pub max_processing_time_ms: Option<u64>,
    pub concurrent_formatters: Option<usize>,
    pub retry_attempts: Option<u32>,
}

/// Partial update for `QualityConfig`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityConfigUpdate {
    pub min_quality_score: Option<f64>,
    pub enable_quality_validation: Option<bool>,
    pub fallback_on_low_quality: Option<bool>,
}

/// Partial update for `AnalyticsConfig`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsConfigUpdate {
    pub enabled: Option<bool>,
    pub track_user_interactions: Option<bool>,
    pub retention_period_days: Option<u32>,
}

/// Configuration update request (partial update)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattingConfigUpdate {
    pub default_format: Option<String>,
    pub default_display_mode: Option<DisplayMode>,
    #[serde(default)]
    pub cache: CacheConfigUpdate,
    #[serde(default)]
    pub performance: PerformanceConfigUpdate,
    #[serde(default)]
    pub quality: QualityConfigUpdate,
    #[serde(default)]
    pub analytics: AnalyticsConfigUpdate,
}

impl FormattingConfig {
    /// Load configuration from a `.toml` or `.json` file.
    ///
    /// Missing fields take their defaults. The result is validated.
    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;

        let config: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&raw)
                .map_err(|e| CoreError::config(format!("Invalid TOML in {}: {}", path.display(), e)))?,
            _ => serde_json::from_str(&raw)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Apply a partial update to the configuration
    pub fn apply_update(&mut self, update: FormattingConfigUpdate) {
        if let Some(format) = update.default_format {
            self.default_format = format;
        }
        if let Some(mode) = update.default_display_mode {
            self.default_display_mode = mode;
        }

        let cache = update.cache;
        if let Some(enabled) = cache.enabled {
            self.cache.enabled = enabled;
        }
        if let Some(ttl) = cache.ttl_seconds {
            self.cache.ttl_seconds = ttl;
        }
        if let Some(max) = cache.max_entries {
            self.cache.max_entries = max;
        }
        if let Some(compression) = cache.compression_enabled {
            self.cache.compression_enabled = compression;
        }
        if let Some(interval) = cache.cleanup_interval_seconds {
            self.cache.cleanup_interval_seconds = interval;
        }

        let performance = update.performance;
        if let Some(ms) = performance.max_processing_time_ms {
            self.performance.max_processing_time_ms = ms;
        }
        if let Some(n) = performance.concurrent_formatters {
            self.performance.concurrent_formatters = n;
        }
        if let Some(n) = performance.retry_attempts {
            self.performance.retry_attempts = n;
        }

        let quality = update.quality;
        if let Some(min) = quality.min_quality_score {
            self.quality.min_quality_score = min;
        }
        if let Some(enabled) = quality.enable_quality_validation {
            self.quality.enable_quality_validation = enabled;
        }
        if let Some(fallback) = quality.fallback_on_low_quality {
            self.quality.fallback_on_low_quality = fallback;
        }

        let analytics = update.analytics;
        if let Some(enabled) = analytics.enabled {
            self.analytics.enabled = enabled;
        }
        if let Some(track) = analytics.track_user_interactions {
            self.analytics.track_user_interactions = track;
        }
        if let Some(days) = analytics.retention_period_days {
            self.analytics.retention_period_days = days;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> CoreResult<()> {
        if self.default_format.trim().is_empty() {
            return Err(CoreError::config("default_format must not be empty"));
        }

        let min = self.quality.min_quality_score;
        if !(0.0..=1.0).contains(&min) {
            return Err(CoreError::config(format!(
                "min_quality_score must be within [0, 1], got {}",
                min
            )));
        }

        if self.cache.max_entries == 0 {
            return Err(CoreError::config("cache.max_entries must be at least 1"));
        }

        if self.performance.concurrent_formatters == 0 {
            return Err(CoreError::config(
                "performance.concurrent_formatters must be at least 1",
            ));
        }

        if self.performance.max_processing_time_ms == 0 {
            return Err(CoreError::config(
                "performance.max_processing_time_ms must be positive",
            ));
        }

        Ok(())
    }
}
