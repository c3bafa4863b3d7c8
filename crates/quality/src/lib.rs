//! Result Formatting Quality
//!
//! Quality scoring for formatted results:
//!
//! - `models` - Issues, rule scores, component metrics, analysis
//! - `rules` - The weighted rule set (`QualityRule` and the four default rules)
//! - `validator` - `QualityValidator`, which runs the rules and derives metrics

pub mod models;
pub mod rules;
pub mod validator;

pub use models::{
    IssueCategory, IssueSeverity, QualityAnalysis, QualityIssue, QualityMetrics, RuleEvaluation,
    RuleScore,
};
pub use rules::{
    default_rules, BasicStructureRule, ContentQualityRule, MetadataCompletenessRule, QualityRule,
    SummaryQualityRule,
};
pub use validator::QualityValidator;
