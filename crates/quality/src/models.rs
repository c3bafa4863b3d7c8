//! Quality Models
//!
//! Data structures produced by quality analysis: issues, per-rule scores,
//! component metrics, and the aggregated analysis.

use serde::{Deserialize, Serialize};

/// Severity of a quality issue.
///
/// Ordering is by importance: `Error` sorts before `Warning` before `Info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueSeverity::Error => write!(f, "error"),
            IssueSeverity::Warning => write!(f, "warning"),
            IssueSeverity::Info => write!(f, "info"),
        }
    }
}

/// Area of the formatted result an issue concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueCategory {
    Structure,
    Content,
    Summary,
    Metadata,
}

/// A single finding from quality analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityIssue {
    pub severity: IssueSeverity,
    pub category: IssueCategory,
    pub message: String,
    /// Suggested fix
    pub suggestion: String,
}

impl QualityIssue {
    pub fn error(category: IssueCategory, message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::new(IssueSeverity::Error, category, message, suggestion)
    }

    pub fn warning(category: IssueCategory, message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::new(IssueSeverity::Warning, category, message, suggestion)
    }

    pub fn info(category: IssueCategory, message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::new(IssueSeverity::Info, category, message, suggestion)
    }

    fn new(
        severity: IssueSeverity,
        category: IssueCategory,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }
}

/// Outcome of evaluating one rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleEvaluation {
    /// Score in [0, 1]
    pub score: f64,
    pub issues: Vec<QualityIssue>,
}

impl RuleEvaluation {
    pub fn new(score: f64, issues: Vec<QualityIssue>) -> Self {
        Self {
            score: clamp_unit(score),
            issues,
        }
    }
}

/// Weighted score of one rule inside an analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleScore {
    pub rule_id: String,
    pub weight: f64,
    pub score: f64,
}

/// Component metrics, each in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityMetrics {
    pub completeness: f64,
    pub accuracy: f64,
    pub readability: f64,
    pub structure: f64,
    pub metadata_quality: f64,
    /// Weighted-rule score
    pub overall: f64,
}

impl QualityMetrics {
    /// Metrics for a disabled validator: everything passes.
    pub fn perfect() -> Self {
        Self {
            completeness: 1.0,
            accuracy: 1.0,
            readability: 1.0,
            structure: 1.0,
            metadata_quality: 1.0,
            overall: 1.0,
        }
    }
}

/// Full quality analysis of a formatted result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityAnalysis {
    pub metrics: QualityMetrics,
    pub rule_scores: Vec<RuleScore>,
    pub issues: Vec<QualityIssue>,
    /// Up to five suggested fixes, most important first
    pub recommendations: Vec<String>,
}

impl QualityAnalysis {
    /// Overall score shortcut.
    pub fn overall(&self) -> f64 {
        self.metrics.overall
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == IssueSeverity::Error)
    }

    /// Issues of a given severity.
    pub fn issues_with_severity(&self, severity: IssueSeverity) -> Vec<&QualityIssue> {
        self.issues.iter().filter(|i| i.severity == severity).collect()
    }
}

/// Clamp a score into [0, 1]. NaN becomes 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        let mut severities = vec![IssueSeverity::Info, IssueSeverity::Error, IssueSeverity::Warning];
        severities.sort();
        assert_eq!(
            severities,
            vec![IssueSeverity::Error, IssueSeverity::Warning, IssueSeverity::Info]
        );
    }

    #[test]
    fn test_clamp_unit() {
        assert_eq!(clamp_unit(1.7), 1.0);
        assert_eq!(clamp_unit(-0.2), 0.0);
        assert_eq!(clamp_unit(f64::NAN), 0.0);
        assert_eq!(clamp_unit(0.42), 0.42);
    }

    #[test]
    fn test_rule_evaluation_clamps() {
        let eval = RuleEvaluation::new(3.0, vec![]);
        assert_eq!(eval.score, 1.0);
    }

    #[test]
    fn test_issue_serde() {
        let issue = QualityIssue::warning(IssueCategory::Summary, "Headline is too short", "Expand it");
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["severity"], "warning");
        assert_eq!(json["category"], "summary");
    }
}
