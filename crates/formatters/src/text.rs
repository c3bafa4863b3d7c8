//! Plain text formatter.
//!
//! Accepts every result, including failed ones, so the `text` baseline
//! format is always coverable.

use async_trait::async_trait;
use result_formatting_core::{
    formats, CoreResult, FormatContext, FormattedResult, FormatterDefinition,
    FormatterExecutable, ResultSummary, ToolExecutionResult,
};
use serde_json::{json, Value};

use crate::summary::{base_metadata, content_title, summarize_result};

/// Render a tool result as display text.
///
/// Strings pass through, other values are pretty-printed JSON, and failed
/// results render their error message.
pub fn render_text(result: &ToolExecutionResult) -> String {
    if !result.success {
        return format!(
            "Error: {}",
            result.error.as_deref().unwrap_or("Unknown error")
        );
    }
    match &result.output {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

pub struct TextFormatter;

impl FormatterDefinition for TextFormatter {
    fn id(&self) -> &str {
        "text"
    }

    fn name(&self) -> &str {
        "Plain Text"
    }

    fn supported_formats(&self) -> Vec<String> {
        vec![formats::TEXT.to_string()]
    }

    fn priority(&self) -> i32 {
        10
    }
}

#[async_trait]
impl FormatterExecutable for TextFormatter {
    fn can_format(&self, _result: &ToolExecutionResult, _ctx: &FormatContext) -> CoreResult<bool> {
        Ok(true)
    }

    async fn format(
        &self,
        result: &ToolExecutionResult,
        ctx: &FormatContext,
    ) -> CoreResult<FormattedResult> {
        let content = json!({
            "type": formats::TEXT,
            "title": content_title(ctx),
            "text": render_text(result),
        });

        Ok(FormattedResult::new(result.clone(), formats::TEXT, content)
            .with_summary(self.summarize(result, ctx))
            .with_metadata(base_metadata(self.id(), 0.6)))
    }

    fn summarize(&self, result: &ToolExecutionResult, ctx: &FormatContext) -> ResultSummary {
        summarize_result(result, ctx, "plain text")
    }
}
