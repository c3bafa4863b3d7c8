//! Table formatter for arrays of homogeneous objects.

use async_trait::async_trait;
use result_formatting_core::{
    formats, CoreError, CoreResult, FormatContext, FormattedResult, FormatterDefinition,
    FormatterExecutable, OutputShape, ResultSummary, ToolCompatibility, ToolExecutionResult,
};
use serde_json::{json, Map, Value};

use crate::summary::{base_metadata, content_title, summarize_result};

/// Rows kept when the caller asked for a compact display.
pub const COMPACT_ROW_LIMIT: usize = 10;

/// Column names in first-seen order across all rows.
fn collect_columns(rows: &[Value]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for row in rows.iter().filter_map(|r| r.as_object()) {
        for key in row.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

fn row_values(row: &Map<String, Value>, columns: &[String]) -> Value {
    Value::Array(
        columns
            .iter()
            .map(|c| row.get(c).cloned().unwrap_or(Value::Null))
            .collect(),
    )
}

pub struct TableFormatter;

impl FormatterDefinition for TableFormatter {
    fn id(&self) -> &str {
        "table"
    }

    fn name(&self) -> &str {
        "Table"
    }

    fn supported_formats(&self) -> Vec<String> {
        vec![formats::TABLE.to_string()]
    }

    fn priority(&self) -> i32 {
        80
    }

    fn tool_compatibility(&self) -> Option<ToolCompatibility> {
        Some(ToolCompatibility::new().accept_shape(OutputShape::Table))
    }
}

#[async_trait]
impl FormatterExecutable for TableFormatter {
    fn can_format(&self, result: &ToolExecutionResult, _ctx: &FormatContext) -> CoreResult<bool> {
        Ok(result.success && result.output_shape() == OutputShape::Table)
    }

    async fn format(
        &self,
        result: &ToolExecutionResult,
        ctx: &FormatContext,
    ) -> CoreResult<FormattedResult> {
        let rows = result
            .output
            .as_array()
            .ok_or_else(|| CoreError::execution(self.id(), "output is not an array"))?;
        let columns = collect_columns(rows);

        let limit = if ctx.is_compact() { COMPACT_ROW_LIMIT } else { rows.len() };
        let table_rows: Vec<Value> = rows
            .iter()
            .filter_map(|r| r.as_object())
            .take(limit)
            .map(|r| row_values(r, &columns))
            .collect();

        let content = json!({
            "type": formats::TABLE,
            "title": content_title(ctx),
            "columns": columns,
            "rows": table_rows,
            "totalRows": rows.len(),
            "truncated": rows.len() > limit,
        });

        Ok(FormattedResult::new(result.clone(), formats::TABLE, content)
            .with_summary(self.summarize(result, ctx))
            .with_alternative(
                formats::CODE,
                json!({"type": formats::CODE, "language": "json", "code": result.output.to_string()}),
                10,
            )
            .with_metadata(base_metadata(self.id(), 0.9)))
    }

    fn summarize(&self, result: &ToolExecutionResult, ctx: &FormatContext) -> ResultSummary {
        let mut summary = summarize_result(result, ctx, "a table");
        if let Some(rows) = result.output.as_array() {
            let columns = collect_columns(rows);
            summary
                .highlights
                .push(format!("{} rows across {} columns", rows.len(), columns.len()));
        }
        summary
    }
}
