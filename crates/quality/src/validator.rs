//! Quality Validator
//!
//! Scores a `FormattedResult` with the weighted rule set and derives the
//! component metrics. When disabled, every result scores 1.0.
//!
//! `overall = Σ(score × weight) / Σ(weight)` over the rules that evaluated,
//! clamped to [0, 1]. A rule returning an error is skipped with a warning.

use std::collections::HashSet;

use result_formatting_core::FormattedResult;
use tracing::{debug, warn};

use crate::models::{
    clamp_unit, QualityAnalysis, QualityIssue, QualityMetrics, RuleScore,
};
use crate::rules::{
    content_type_matches, default_rules, format_structure_valid, has_content, QualityRule,
    MIN_DESCRIPTION_CHARS, MIN_HEADLINE_CHARS,
};

/// Maximum number of recommendations returned by `analyze_quality`.
pub const MAX_RECOMMENDATIONS: usize = 5;

const MAX_HEADLINE_CHARS: usize = 120;
const MAX_DESCRIPTION_CHARS: usize = 1000;
const MAX_HIGHLIGHTS: usize = 5;

/// Weighted-rule quality validator.
pub struct QualityValidator {
    enabled: bool,
    rules: Vec<Box<dyn QualityRule>>,
}

struct RuleRun {
    overall: f64,
    scores: Vec<RuleScore>,
    issues: Vec<QualityIssue>,
}

impl QualityValidator {
    /// Create a validator with the default rule set.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            rules: default_rules(),
        }
    }

    /// Add a custom rule alongside the defaults.
    pub fn add_rule(&mut self, rule: Box<dyn QualityRule>) {
        self.rules.push(rule);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Identifiers of the active rules, in evaluation order.
    pub fn rule_ids(&self) -> Vec<String> {
        self.rules.iter().map(|r| r.id().to_string()).collect()
    }

    /// Overall quality score in [0, 1].
    pub fn score(&self, result: &FormattedResult) -> f64 {
        if !self.enabled {
            return 1.0;
        }
        self.run_rules(result).overall
    }

    /// Cheap structural pre-check, independent of scoring.
    ///
    /// Requires format, content, summary headline and formatted-at timestamp.
    pub fn meets_minimum_standards(&self, result: &FormattedResult) -> bool {
        !result.format.trim().is_empty()
            && has_content(result)
            && !result.summary.headline.trim().is_empty()
            && result.metadata.formatted_at.is_some()
    }

    /// Full analysis: component metrics, rule scores, issues, recommendations.
    pub fn analyze_quality(&self, result: &FormattedResult) -> QualityAnalysis {
        if !self.enabled {
            return QualityAnalysis {
                metrics: QualityMetrics::perfect(),
                rule_scores: Vec::new(),
                issues: Vec::new(),
                recommendations: Vec::new(),
            };
        }

        let run = self.run_rules(result);
        let metadata_quality = run
            .scores
            .iter()
            .find(|s| s.rule_id == "metadata_completeness")
            .map(|s| s.score)
            .unwrap_or_else(|| metadata_ratio(result));

        let metrics = QualityMetrics {
            completeness: completeness(result),
            accuracy: accuracy(result),
            readability: readability(result),
            structure: structure(result),
            metadata_quality,
            overall: run.overall,
        };

        let recommendations = recommendations(&run.issues);

        debug!(
            format = %result.format,
            overall = metrics.overall,
            issues = run.issues.len(),
            "Quality analysis complete"
        );

        QualityAnalysis {
            metrics,
            rule_scores: run.scores,
            issues: run.issues,
            recommendations,
        }
    }

    fn run_rules(&self, result: &FormattedResult) -> RuleRun {
        let mut weighted = 0.0;
        let mut total_weight = 0.0;
        let mut scores = Vec::with_capacity(self.rules.len());
        let mut issues = Vec::new();

        for rule in &self.rules {
            match rule.evaluate(result) {
                Ok(eval) => {
                    let weight = rule.weight().max(0.0);
                    weighted += eval.score * weight;
                    total_weight += weight;
                    scores.push(RuleScore {
                        rule_id: rule.id().to_string(),
                        weight,
                        score: eval.score,
                    });
                    issues.extend(eval.issues);
                }
                Err(e) => {
                    warn!(rule = rule.id(), error = %e, "Quality rule failed, skipping");
                }
            }
        }

        let overall = if total_weight > 0.0 {
            clamp_unit(weighted / total_weight)
        } else {
            0.0
        };

        RuleRun {
            overall,
            scores,
            issues,
        }
    }
}

impl Default for QualityValidator {
    fn default() -> Self {
        Self::new(true)
    }
}

// ============================================================================
// Component metrics
// ============================================================================

fn ratio(checks: &[bool]) -> f64 {
    if checks.is_empty() {
        return 0.0;
    }
    let passed = checks.iter().filter(|c| **c).count();
    passed as f64 / checks.len() as f64
}

fn completeness(result: &FormattedResult) -> f64 {
    ratio(&[
        !result.format.trim().is_empty(),
        has_content(result),
        !result.summary.headline.trim().is_empty(),
        !result.summary.description.trim().is_empty(),
        !result.summary.highlights.is_empty(),
        result.metadata.formatted_at.is_some(),
    ])
}

fn accuracy(result: &FormattedResult) -> f64 {
    let type_score = match result.content_type() {
        Some(_) if content_type_matches(result) => 1.0,
        Some(_) => 0.0,
        None => 0.5,
    };
    let structure_score = if format_structure_valid(&result.format, &result.content) {
        1.0
    } else {
        0.0
    };
    let score_in_range = match result.metadata.quality_score {
        Some(q) if (0.0..=1.0).contains(&q) => 1.0,
        Some(_) => 0.0,
        None => 1.0,
    };
    clamp_unit((type_score + structure_score + score_in_range) / 3.0)
}

fn length_score(text: &str, min: usize, max: usize) -> f64 {
    let len = text.trim().chars().count();
    if len == 0 {
        0.0
    } else if (min..=max).contains(&len) {
        1.0
    } else {
        0.5
    }
}

fn readability(result: &FormattedResult) -> f64 {
    let summary = &result.summary;
    let headline = length_score(&summary.headline, MIN_HEADLINE_CHARS, MAX_HEADLINE_CHARS);
    let description = length_score(&summary.description, MIN_DESCRIPTION_CHARS, MAX_DESCRIPTION_CHARS);
    let highlights = match summary.highlights.len() {
        0 => 0.5,
        n if n <= MAX_HIGHLIGHTS => 1.0,
        _ => 0.5,
    };
    clamp_unit((headline + description + highlights) / 3.0)
}

fn structure(result: &FormattedResult) -> f64 {
    let typed_object = result.content.is_object() && result.content_type().is_some();
    let alternatives_valid = result
        .alternatives
        .iter()
        .all(|a| !a.format.trim().is_empty() && !a.content.is_null());
    ratio(&[
        typed_object,
        format_structure_valid(&result.format, &result.content),
        alternatives_valid,
    ])
}

fn metadata_ratio(result: &FormattedResult) -> f64 {
    let meta = &result.metadata;
    ratio(&[
        meta.formatted_at.is_some(),
        !meta.version.trim().is_empty(),
        meta.processing_time_ms.is_some(),
        meta.quality_score.is_some(),
    ])
}

/// Up to five deduplicated suggestions, errors first.
fn recommendations(issues: &[QualityIssue]) -> Vec<String> {
    let mut ranked: Vec<&QualityIssue> = issues.iter().collect();
    ranked.sort_by_key(|i| i.severity);

    let mut seen = HashSet::new();
    ranked
        .into_iter()
        .filter(|i| seen.insert(i.suggestion.as_str()))
        .take(MAX_RECOMMENDATIONS)
        .map(|i| i.suggestion.clone())
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
