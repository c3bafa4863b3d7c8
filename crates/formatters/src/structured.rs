//! Formatters for structured, non-tabular output: list, card, and code.

use async_trait::async_trait;
use result_formatting_core::{
    formats, CoreError, CoreResult, FormatContext, FormattedResult, FormatterDefinition,
    FormatterExecutable, OutputShape, ResultSummary, ToolCompatibility, ToolExecutionResult,
};
use serde_json::{json, Value};

use crate::summary::{base_metadata, content_title, scalar_text, summarize_result};

/// Objects with more fields than this render as code rather than a card.
pub const MAX_CARD_FIELDS: usize = 20;

fn is_scalar(value: &Value) -> bool {
    !(value.is_array() || value.is_object())
}

// ============================================================================
// List
// ============================================================================

/// Bullet list for arrays of scalar values.
pub struct ListFormatter;

impl FormatterDefinition for ListFormatter {
    fn id(&self) -> &str {
        "list"
    }

    fn name(&self) -> &str {
        "List"
    }

    fn supported_formats(&self) -> Vec<String> {
        vec![formats::LIST.to_string()]
    }

    fn priority(&self) -> i32 {
        60
    }

    fn tool_compatibility(&self) -> Option<ToolCompatibility> {
        Some(ToolCompatibility::new().accept_shape(OutputShape::Array))
    }
}

#[async_trait]
impl FormatterExecutable for ListFormatter {
    fn can_format(&self, result: &ToolExecutionResult, _ctx: &FormatContext) -> CoreResult<bool> {
        Ok(result.success
            && result
                .output
                .as_array()
                .map(|items| !items.is_empty() && items.iter().all(is_scalar))
                .unwrap_or(false))
    }

    async fn format(
        &self,
        result: &ToolExecutionResult,
        ctx: &FormatContext,
    ) -> CoreResult<FormattedResult> {
        let items: Vec<String> = result
            .output
            .as_array()
            .ok_or_else(|| CoreError::execution(self.id(), "output is not an array"))?
            .iter()
            .map(scalar_text)
            .collect();

        let content = json!({
            "type": formats::LIST,
            "title": content_title(ctx),
            "items": items,
        });

        Ok(FormattedResult::new(result.clone(), formats::LIST, content)
            .with_summary(self.summarize(result, ctx))
            .with_metadata(base_metadata(self.id(), 0.85)))
    }

    fn summarize(&self, result: &ToolExecutionResult, ctx: &FormatContext) -> ResultSummary {
        summarize_result(result, ctx, "a list")
    }
}

// ============================================================================
// Card
// ============================================================================

/// Label/value card for flat objects.
pub struct CardFormatter;

impl CardFormatter {
    fn card_title(object: &serde_json::Map<String, Value>, ctx: &FormatContext) -> String {
        ["title", "name"]
            .iter()
            .filter_map(|k| object.get(*k).and_then(|v| v.as_str()))
            .find(|s| !s.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| content_title(ctx))
    }
}

impl FormatterDefinition for CardFormatter {
    fn id(&self) -> &str {
        "card"
    }

    fn name(&self) -> &str {
        "Card"
    }

    fn supported_formats(&self) -> Vec<String> {
        vec![formats::CARD.to_string()]
    }

    fn priority(&self) -> i32 {
        70
    }

    fn tool_compatibility(&self) -> Option<ToolCompatibility> {
        Some(ToolCompatibility::new().accept_shape(OutputShape::Object))
    }
}

#[async_trait]
impl FormatterExecutable for CardFormatter {
    fn can_format(&self, result: &ToolExecutionResult, _ctx: &FormatContext) -> CoreResult<bool> {
        Ok(result.success
            && result
                .output
                .as_object()
                .map(|o| !o.is_empty() && o.len() <= MAX_CARD_FIELDS && o.values().all(is_scalar))
                .unwrap_or(false))
    }

    async fn format(
        &self,
        result: &ToolExecutionResult,
        ctx: &FormatContext,
    ) -> CoreResult<FormattedResult> {
        let object = result
            .output
            .as_object()
            .ok_or_else(|| CoreError::execution(self.id(), "output is not an object"))?;

        let fields: Vec<Value> = object
            .iter()
            .map(|(label, value)| json!({"label": label, "value": scalar_text(value)}))
            .collect();

        let content = json!({
            "type": formats::CARD,
            "title": Self::card_title(object, ctx),
            "fields": fields,
        });

        Ok(FormattedResult::new(result.clone(), formats::CARD, content)
            .with_summary(self.summarize(result, ctx))
            .with_metadata(base_metadata(self.id(), 0.85)))
    }

    fn summarize(&self, result: &ToolExecutionResult, ctx: &FormatContext) -> ResultSummary {
        summarize_result(result, ctx, "a card")
    }
}

// ============================================================================
// Code
// ============================================================================

/// Pretty-printed JSON for any structured output.
pub struct CodeFormatter;

impl FormatterDefinition for CodeFormatter {
    fn id(&self) -> &str {
        "code"
    }

    fn name(&self) -> &str {
        "JSON Code Block"
    }

    fn supported_formats(&self) -> Vec<String> {
        vec![formats::CODE.to_string()]
    }

    fn priority(&self) -> i32 {
        30
    }
}

#[async_trait]
impl FormatterExecutable for CodeFormatter {
    fn can_format(&self, result: &ToolExecutionResult, _ctx: &FormatContext) -> CoreResult<bool> {
        Ok(result.success && (result.output.is_object() || result.output.is_array()))
    }

    async fn format(
        &self,
        result: &ToolExecutionResult,
        ctx: &FormatContext,
    ) -> CoreResult<FormattedResult> {
        let code = serde_json::to_string_pretty(&result.output)?;
        let content = json!({
            "type": formats::CODE,
            "title": content_title(ctx),
            "language": "json",
            "code": code,
        });

        Ok(FormattedResult::new(result.clone(), formats::CODE, content)
            .with_summary(self.summarize(result, ctx))
            .with_metadata(base_metadata(self.id(), 0.7)))
    }

    fn summarize(&self, result: &ToolExecutionResult, ctx: &FormatContext) -> ResultSummary {
        summarize_result(result, ctx, "JSON")
    }
}
