//! Built-in post-processors.

use async_trait::async_trait;
use result_formatting_core::{formats, CoreResult, FormatContext, FormattedResult, Processor};
use serde_json::Value;

/// Deduplicates and caps summary highlights and suggestions.
pub struct HighlightLimitProcessor {
    max_items: usize,
}

impl HighlightLimitProcessor {
    pub fn new(max_items: usize) -> Self {
        Self { max_items }
    }
}

impl Default for HighlightLimitProcessor {
    fn default() -> Self {
        Self::new(5)
    }
}

fn dedup_and_cap(items: &mut Vec<String>, max: usize) {
    let mut seen = std::collections::HashSet::new();
    items.retain(|item| seen.insert(item.clone()));
    items.truncate(max);
}

#[async_trait]
impl Processor for HighlightLimitProcessor {
    fn id(&self) -> &str {
        "highlight-limit"
    }

    fn priority(&self) -> i32 {
        100
    }

    async fn process(
        &self,
        result: &FormattedResult,
        _ctx: &FormatContext,
    ) -> CoreResult<FormattedResult> {
        let mut out = result.clone();
        dedup_and_cap(&mut out.summary.highlights, self.max_items);
        dedup_and_cap(&mut out.summary.suggestions, self.max_items);
        Ok(out)
    }
}

/// Shortens long text content for compact and summary display modes.
pub struct CompactTextProcessor {
    max_chars: usize,
}

impl CompactTextProcessor {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }
}

impl Default for CompactTextProcessor {
    fn default() -> Self {
        Self::new(500)
    }
}

#[async_trait]
impl Processor for CompactTextProcessor {
    fn id(&self) -> &str {
        "compact-text"
    }

    fn priority(&self) -> i32 {
        50
    }

    async fn process(
        &self,
        result: &FormattedResult,
        ctx: &FormatContext,
    ) -> CoreResult<FormattedResult> {
        if !ctx.is_compact() || result.content_type() != Some(formats::TEXT) {
            return Ok(result.clone());
        }

        let text = match result.content.get("text").and_then(|t| t.as_str()) {
            Some(t) if t.chars().count() > self.max_chars => t,
            _ => return Ok(result.clone()),
        };

        let shortened: String = text.chars().take(self.max_chars).collect();
        let mut out = result.clone();
        if let Some(obj) = out.content.as_object_mut() {
            obj.insert("text".to_string(), Value::String(format!("{}…", shortened)));
            obj.insert("truncated".to_string(), Value::Bool(true));
        }
        Ok(out)
    }
}
