//! Health Models
//!
//! Health reports produced by the registry and the orchestration service.

use serde::{Deserialize, Serialize};

/// Coarse health classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Degraded => write!(f, "degraded"),
            HealthStatus::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

/// Registry health detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryHealth {
    /// At least one formatter and every baseline format covered
    pub healthy: bool,
    pub formatter_count: usize,
    pub processor_count: usize,
    /// Every format covered by at least one formatter, sorted
    pub supported_formats: Vec<String>,
    /// Baseline formats with no formatter
    pub missing_formats: Vec<String>,
}

/// Cache health detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheHealth {
    pub enabled: bool,
    pub entries: usize,
    pub max_entries: usize,
    /// Hit rate in percent
    pub hit_rate: f64,
}

/// Quality validation detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityHealth {
    pub enabled: bool,
    pub min_quality_score: f64,
    pub rules: Vec<String>,
}

/// Engine health report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: HealthStatus,
    pub registry: RegistryHealth,
    pub cache: CacheHealth,
    pub quality: QualityHealth,
    pub checked_at: chrono::DateTime<chrono::Utc>,
}

impl HealthReport {
    /// Derive the overall status from the registry detail.
    pub fn status_for(registry: &RegistryHealth) -> HealthStatus {
        if registry.formatter_count == 0 {
            HealthStatus::Unhealthy
        } else if !registry.missing_formats.is_empty() {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}
