//! Quality Rules
//!
//! Weighted structural/content rules evaluated against a `FormattedResult`.
//! The default rule set is:
//!
//! | rule                    | weight |
//! |-------------------------|--------|
//! | `basic_structure`       | 0.30   |
//! | `content_quality`       | 0.25   |
//! | `summary_quality`       | 0.25   |
//! | `metadata_completeness` | 0.20   |

use result_formatting_core::{formats, CoreResult, FormattedResult};
use serde_json::Value;

use crate::models::{IssueCategory, QualityIssue, RuleEvaluation};

/// Minimum headline length considered informative.
pub const MIN_HEADLINE_CHARS: usize = 10;

/// Minimum description length considered informative.
pub const MIN_DESCRIPTION_CHARS: usize = 50;

/// A weighted quality rule.
///
/// A rule that returns `Err` is skipped by the validator and excluded from
/// the weighted average.
pub trait QualityRule: Send + Sync {
    fn id(&self) -> &str;

    fn weight(&self) -> f64;

    fn evaluate(&self, result: &FormattedResult) -> CoreResult<RuleEvaluation>;
}

/// The fixed default rule set.
pub fn default_rules() -> Vec<Box<dyn QualityRule>> {
    vec![
        Box::new(BasicStructureRule),
        Box::new(ContentQualityRule),
        Box::new(SummaryQualityRule),
        Box::new(MetadataCompletenessRule),
    ]
}

// ============================================================================
// Shared checks
// ============================================================================

pub(crate) fn non_empty_str(value: Option<&Value>) -> bool {
    value
        .and_then(|v| v.as_str())
        .map(|s| !s.trim().is_empty())
        .unwrap_or(false)
}

fn non_empty_array(value: Option<&Value>) -> bool {
    value
        .and_then(|v| v.as_array())
        .map(|a| !a.is_empty())
        .unwrap_or(false)
}

pub(crate) fn has_content(result: &FormattedResult) -> bool {
    match &result.content {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}

pub(crate) fn has_metadata(result: &FormattedResult) -> bool {
    result.metadata.formatted_at.is_some() || !result.metadata.version.trim().is_empty()
}

/// Whether the content's `type` tag agrees with the result's format.
pub(crate) fn content_type_matches(result: &FormattedResult) -> bool {
    result.content_type() == Some(result.format.as_str())
}

pub(crate) fn has_title_or_description(content: &Value) -> bool {
    ["title", "description", "caption"]
        .iter()
        .any(|key| non_empty_str(content.get(*key)))
}

/// Format-specific structural check. Unknown formats pass.
pub(crate) fn format_structure_valid(format: &str, content: &Value) -> bool {
    match format {
        formats::TABLE => {
            non_empty_array(content.get("columns"))
                && content.get("rows").map(|r| r.is_array()).unwrap_or(false)
        }
        formats::LIST => content.get("items").map(|i| i.is_array()).unwrap_or(false),
        formats::CARD => non_empty_str(content.get("title")) || non_empty_array(content.get("fields")),
        formats::CHART => non_empty_array(content.get("data")) || non_empty_array(content.get("series")),
        formats::CODE => content.get("code").map(|c| c.is_string()).unwrap_or(false),
        formats::IMAGE => non_empty_str(content.get("url")) || non_empty_str(content.get("src")),
        formats::TEXT => content.get("text").map(|t| t.is_string()).unwrap_or(false),
        _ => true,
    }
}

// ============================================================================
// basic_structure
// ============================================================================

/// Presence of format, content, summary and metadata.
pub struct BasicStructureRule;

impl QualityRule for BasicStructureRule {
    fn id(&self) -> &str {
        "basic_structure"
    }

    fn weight(&self) -> f64 {
        0.30
    }

    fn evaluate(&self, result: &FormattedResult) -> CoreResult<RuleEvaluation> {
        let mut passed = 0u32;
        let mut issues = Vec::new();

        if result.format.trim().is_empty() {
            issues.push(QualityIssue::error(
                IssueCategory::Structure,
                "Missing format",
                "Set the format tag produced by the formatter",
            ));
        } else {
            passed += 1;
        }

        if has_content(result) {
            passed += 1;
        } else {
            issues.push(QualityIssue::error(
                IssueCategory::Structure,
                "Missing content",
                "Provide a content payload with a type discriminator",
            ));
        }

        if result.summary.is_empty() {
            issues.push(QualityIssue::error(
                IssueCategory::Structure,
                "Missing summary",
                "Generate a summary with a headline and description",
            ));
        } else {
            passed += 1;
        }

        if has_metadata(result) {
            passed += 1;
        } else {
            issues.push(QualityIssue::error(
                IssueCategory::Structure,
                "Missing metadata",
                "Stamp the result with a timestamp and version",
            ));
        }

        Ok(RuleEvaluation::new(f64::from(passed) / 4.0, issues))
    }
}

// ============================================================================
// content_quality
// ============================================================================

/// Content type agreement, title/description, and format-specific structure.
pub struct ContentQualityRule;

impl QualityRule for ContentQualityRule {
    fn id(&self) -> &str {
        "content_quality"
    }

    fn weight(&self) -> f64 {
        0.25
    }

    fn evaluate(&self, result: &FormattedResult) -> CoreResult<RuleEvaluation> {
        let mut passed = 0u32;
        let mut issues = Vec::new();

        match result.content_type() {
            Some(t) if t == result.format => passed += 1,
            Some(t) => issues.push(QualityIssue::error(
                IssueCategory::Content,
                format!("Content type '{}' does not match format '{}'", t, result.format),
                "Make content.type equal to the result format",
            )),
            None => issues.push(QualityIssue::warning(
                IssueCategory::Content,
                "Content has no type discriminator",
                "Add a `type` field to the content payload",
            )),
        }

        if has_title_or_description(&result.content) {
            passed += 1;
        } else {
            issues.push(QualityIssue::info(
                IssueCategory::Content,
                "Content has no title or description",
                "Add a title or description to the content",
            ));
        }

        if format_structure_valid(&result.format, &result.content) {
            passed += 1;
        } else {
            issues.push(QualityIssue::error(
                IssueCategory::Content,
                format!("Content structure is invalid for format '{}'", result.format),
                format!("Include the fields a '{}' renderer requires", result.format),
            ));
        }

        Ok(RuleEvaluation::new(f64::from(passed) / 3.0, issues))
    }
}

// ============================================================================
// summary_quality
// ============================================================================

/// Headline and description length, highlights, suggestions.
pub struct SummaryQualityRule;

impl QualityRule for SummaryQualityRule {
    fn id(&self) -> &str {
        "summary_quality"
    }

    fn weight(&self) -> f64 {
        0.25
    }

    fn evaluate(&self, result: &FormattedResult) -> CoreResult<RuleEvaluation> {
        let summary = &result.summary;
        let mut score = 0.0;
        let mut issues = Vec::new();

        let headline = summary.headline.trim();
        if headline.is_empty() {
            issues.push(QualityIssue::error(
                IssueCategory::Summary,
                "Missing headline",
                "Add a one-line headline describing the result",
            ));
        } else {
            score += 0.2;
            if headline.chars().count() >= MIN_HEADLINE_CHARS {
                score += 0.15;
            } else {
                issues.push(QualityIssue::warning(
                    IssueCategory::Summary,
                    "Headline is too short",
                    format!("Use at least {} characters in the headline", MIN_HEADLINE_CHARS),
                ));
            }
        }

        let description = summary.description.trim();
        if description.is_empty() {
            issues.push(QualityIssue::warning(
                IssueCategory::Summary,
                "Missing description",
                "Describe what the result contains",
            ));
        } else {
            score += 0.2;
            if description.chars().count() >= MIN_DESCRIPTION_CHARS {
                score += 0.15;
            } else {
                issues.push(QualityIssue::info(
                    IssueCategory::Summary,
                    "Description is too short",
                    format!("Use at least {} characters in the description", MIN_DESCRIPTION_CHARS),
                ));
            }
        }

        if summary.highlights.is_empty() {
            issues.push(QualityIssue::info(
                IssueCategory::Summary,
                "No highlights",
                "List the key findings as highlights",
            ));
        } else {
            score += 0.15;
        }

        if summary.suggestions.is_empty() {
            issues.push(QualityIssue::info(
                IssueCategory::Summary,
                "No suggestions",
                "Offer follow-up suggestions",
            ));
        } else {
            score += 0.15;
        }

        Ok(RuleEvaluation::new(score, issues))
    }
}

// ============================================================================
// metadata_completeness
// ============================================================================

/// Timestamp, version, processing time and quality score.
pub struct MetadataCompletenessRule;

impl QualityRule for MetadataCompletenessRule {
    fn id(&self) -> &str {
        "metadata_completeness"
    }

    fn weight(&self) -> f64 {
        0.20
    }

    fn evaluate(&self, result: &FormattedResult) -> CoreResult<RuleEvaluation> {
        let meta = &result.metadata;
        let mut passed = 0u32;
        let mut issues = Vec::new();

        if meta.formatted_at.is_some() {
            passed += 1;
        } else {
            issues.push(QualityIssue::warning(
                IssueCategory::Metadata,
                "Missing timestamp",
                "Set metadata.formattedAt",
            ));
        }

        if meta.version.trim().is_empty() {
            issues.push(QualityIssue::info(
                IssueCategory::Metadata,
                "Missing version",
                "Set metadata.version",
            ));
        } else {
            passed += 1;
        }

        if meta.processing_time_ms.map(|t| t.is_finite()).unwrap_or(false) {
            passed += 1;
        } else {
            issues.push(QualityIssue::info(
                IssueCategory::Metadata,
                "Missing processing time",
                "Record metadata.processingTimeMs",
            ));
        }

        if meta.quality_score.map(|q| q.is_finite()).unwrap_or(false) {
            passed += 1;
        } else {
            issues.push(QualityIssue::info(
                IssueCategory::Metadata,
                "Missing quality score",
                "Record metadata.qualityScore",
            ));
        }

        Ok(RuleEvaluation::new(f64::from(passed) / 4.0, issues))
    }
}
