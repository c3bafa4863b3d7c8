//! Quality Integration Tests
//!
//! Scoring and analysis of formatted results, including the results the
//! built-in formatters produce.

use chrono::Utc;
use result_formatting::{
    FormatMetadata, FormatOptions, FormattedResult, FormattingConfig, IssueSeverity,
    OrchestrationService, QualityValidator, ResultSummary, ToolExecutionResult,
};
use serde_json::json;

use crate::support::{rows, tool};

fn missing_headline() -> FormattedResult {
    FormattedResult::new(
        ToolExecutionResult::ok(json!("output")),
        "text",
        json!({"type": "text", "text": "output"}),
    )
    .with_summary(ResultSummary::new("", "Short description"))
    .with_metadata(FormatMetadata {
        formatted_at: Some(Utc::now()),
        version: "1.0.0".to_string(),
        ..Default::default()
    })
}

#[test]
fn test_missing_headline_is_flagged() {
    let validator = QualityValidator::new(true);
    let analysis = validator.analyze_quality(&missing_headline());

    assert!(analysis
        .issues
        .iter()
        .any(|i| i.severity == IssueSeverity::Error && i.message.contains("Missing headline")));
    assert!(analysis.overall() < 0.7);
    assert!(analysis.recommendations.len() <= 5);
    assert!(!validator.meets_minimum_standards(&missing_headline()));
}

#[test]
fn test_score_is_bounded_for_arbitrary_results() {
    let validator = QualityValidator::new(true);
    let samples = vec![
        FormattedResult::new(ToolExecutionResult::ok(json!(null)), "", json!(null)),
        FormattedResult::new(ToolExecutionResult::failed("x"), "chart", json!({"type": "table"})),
        FormattedResult::new(ToolExecutionResult::ok(json!(1)), "unknown", json!([1, 2, 3])),
        missing_headline(),
    ];
    for sample in &samples {
        let score = validator.score(sample);
        assert!((0.0..=1.0).contains(&score), "score {} out of range", score);
    }
}

#[tokio::test]
async fn test_builtin_output_meets_standards() {
    let service = OrchestrationService::with_defaults(FormattingConfig::default()).unwrap();
    let out = service.format(rows(), tool("db"), FormatOptions::default()).await.unwrap();

    let analysis = service.analyze_quality(&out);
    assert!(analysis.overall() >= service.config().quality.min_quality_score);
    assert!(!analysis.has_errors());
    assert!(QualityValidator::default().meets_minimum_standards(&out));
    assert_eq!(out.content_type(), Some(out.format.as_str()));
}
