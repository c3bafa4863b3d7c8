//! Shared summary helpers for the built-in formatters.

use chrono::Utc;
use result_formatting_core::{
    FormatContext, FormatMetadata, ResultSummary, ToolExecutionResult,
};
use serde_json::Value;

/// Version stamped by the built-in formatters.
pub const FORMATTER_VERSION: &str = "1.0.0";

/// Plain-language description of a JSON value's size and shape.
pub fn describe_value(value: &Value) -> String {
    match value {
        Value::Null => "no data".to_string(),
        Value::Bool(b) => format!("the value {}", b),
        Value::Number(n) => format!("the number {}", n),
        Value::String(s) => format!("{} characters of text", s.chars().count()),
        Value::Array(items) => match items.len() {
            1 => "1 item".to_string(),
            n => format!("{} items", n),
        },
        Value::Object(map) => match map.len() {
            1 => "an object with 1 field".to_string(),
            n => format!("an object with {} fields", n),
        },
    }
}

/// Render a scalar JSON value as display text.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Default summary shared by formatters; `shown_as` names the presentation.
pub fn summarize_result(
    result: &ToolExecutionResult,
    ctx: &FormatContext,
    shown_as: &str,
) -> ResultSummary {
    let tool_name = if ctx.tool.name.is_empty() {
        ctx.tool_id.as_str()
    } else {
        ctx.tool.name.as_str()
    };

    if !result.success {
        let error = result.error.as_deref().unwrap_or("Unknown error");
        return ResultSummary::new(
            format!("{} failed", tool_name),
            format!(
                "The {} tool reported an error and produced no usable output: {}",
                tool_name, error
            ),
        )
        .with_highlights(vec![format!("Error: {}", error)])
        .with_suggestions(vec![
            "Check the tool input and try again".to_string(),
            "Review the error message for missing permissions or arguments".to_string(),
        ]);
    }

    let description = describe_value(&result.output);
    let mut highlights = vec![format!("Returned {}", description)];
    if let Some(timing) = &result.timing {
        highlights.push(format!("Completed in {}ms", timing.duration_ms));
    }

    ResultSummary::new(
        format!("{} completed successfully", tool_name),
        format!(
            "The {} tool returned {}, presented below as {}.",
            tool_name, description, shown_as
        ),
    )
    .with_highlights(highlights)
    .with_suggestions(vec![format!("Ask a follow-up question about the {} output", tool_name)])
}

/// Metadata with the formatter's own confidence estimate.
///
/// The orchestration service overwrites timing and score after validation.
pub fn base_metadata(formatter_id: &str, confidence: f64) -> FormatMetadata {
    FormatMetadata {
        formatted_at: Some(Utc::now()),
        processing_time_ms: None,
        version: FORMATTER_VERSION.to_string(),
        quality_score: Some(confidence),
        formatter_id: Some(formatter_id.to_string()),
        cache_hit: false,
    }
}

/// Title for a content payload: the tool's name, or its id.
pub fn content_title(ctx: &FormatContext) -> String {
    if ctx.tool.name.is_empty() {
        ctx.tool_id.clone()
    } else {
        ctx.tool.name.clone()
    }
}
