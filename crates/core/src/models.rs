//! Result Models
//!
//! Data structures exchanged between the engine and its collaborators:
//! the raw tool execution result coming in, and the `FormattedResult`
//! handed to rendering layers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Well-known format tags.
///
/// Formats are open-ended strings so plugins can introduce new ones; these
/// are the tags the built-in formatters and the quality rules know about.
pub mod formats {
    /// Universal fallback format. Must always be coverable.
    pub const TEXT: &str = "text";
    pub const TABLE: &str = "table";
    pub const LIST: &str = "list";
    pub const CARD: &str = "card";
    pub const CHART: &str = "chart";
    pub const CODE: &str = "code";
    pub const IMAGE: &str = "image";

    /// Formats the registry must always be able to serve.
    pub const BASELINE: &[&str] = &[TEXT];
}

// ============================================================================
// Tool input
// ============================================================================

/// Timing information reported by the tool runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolTiming {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_ms: u64,
}

/// Result of a tool execution, as produced by the host application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolExecutionResult {
    /// Whether the tool succeeded
    pub success: bool,
    /// Raw tool output (any JSON value)
    #[serde(default)]
    pub output: Value,
    /// Error message (if failed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Optional timing data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing: Option<ToolTiming>,
}

impl ToolExecutionResult {
    /// Create a successful result
    pub fn ok(output: Value) -> Self {
        Self {
            success: true,
            output,
            error: None,
            timing: None,
        }
    }

    /// Create a failed result
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: Value::Null,
            error: Some(error.into()),
            timing: None,
        }
    }

    /// Attach timing data
    pub fn with_timing(mut self, timing: ToolTiming) -> Self {
        self.timing = Some(timing);
        self
    }

    /// Shape of the output payload.
    pub fn output_shape(&self) -> OutputShape {
        OutputShape::detect(&self.output)
    }
}

/// Descriptor of the tool that produced a result. Opaque beyond id/name/description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Any additional host-specific fields
    #[serde(default, flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl ToolDescriptor {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Coarse shape of a tool output, used for tool-affinity matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputShape {
    Null,
    Boolean,
    Number,
    Text,
    Array,
    /// Non-empty array whose elements are all objects
    Table,
    Object,
}

impl OutputShape {
    /// Detect the shape of a JSON value.
    pub fn detect(value: &Value) -> Self {
        match value {
            Value::Null => OutputShape::Null,
            Value::Bool(_) => OutputShape::Boolean,
            Value::Number(_) => OutputShape::Number,
            Value::String(_) => OutputShape::Text,
            Value::Array(items) => {
                if !items.is_empty() && items.iter().all(|v| v.is_object()) {
                    OutputShape::Table
                } else {
                    OutputShape::Array
                }
            }
            Value::Object(_) => OutputShape::Object,
        }
    }

    /// Whether a declared shape accepts an actual output shape.
    ///
    /// A declared `Array` also accepts tabular output.
    pub fn accepts(&self, actual: OutputShape) -> bool {
        *self == actual || (*self == OutputShape::Array && actual == OutputShape::Table)
    }
}

impl std::fmt::Display for OutputShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OutputShape::Null => "null",
            OutputShape::Boolean => "boolean",
            OutputShape::Number => "number",
            OutputShape::Text => "text",
            OutputShape::Array => "array",
            OutputShape::Table => "table",
            OutputShape::Object => "object",
        };
        write!(f, "{}", s)
    }
}

// ============================================================================
// Formatted output
// ============================================================================

/// Natural-language summary of a result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSummary {
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

impl ResultSummary {
    pub fn new(headline: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            headline: headline.into(),
            description: description.into(),
            highlights: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    pub fn with_highlights(mut self, highlights: Vec<String>) -> Self {
        self.highlights = highlights;
        self
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }

    /// True when neither a headline nor a description is present.
    pub fn is_empty(&self) -> bool {
        self.headline.trim().is_empty() && self.description.trim().is_empty()
    }
}

/// An alternate representation offered alongside the primary content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeRepresentation {
    pub format: String,
    pub content: Value,
    pub priority: i32,
}

/// Metadata stamped on every formatted result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatMetadata {
    #[serde(default)]
    pub formatted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub processing_time_ms: Option<f64>,
    #[serde(default)]
    pub version: String,
    /// Quality score in [0, 1]
    #[serde(default)]
    pub quality_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatter_id: Option<String>,
    #[serde(default)]
    pub cache_hit: bool,
}

/// Non-fatal error recorded while producing a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatErrorEntry {
    /// Pipeline stage (e.g. "formatting", "processing", "fallback")
    pub stage: String,
    pub message: String,
}

impl FormatErrorEntry {
    pub fn new(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            message: message.into(),
        }
    }
}

/// A tool result converted into a presentation format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedResult {
    /// The tool response this was produced from
    pub original: ToolExecutionResult,
    /// Chosen format tag
    pub format: String,
    /// Format-specific payload, carrying a `type` discriminator
    pub content: Value,
    #[serde(default)]
    pub summary: ResultSummary,
    #[serde(default)]
    pub alternatives: Vec<AlternativeRepresentation>,
    #[serde(default)]
    pub metadata: FormatMetadata,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FormatErrorEntry>,
}

impl FormattedResult {
    /// Create a result with the given format and content.
    pub fn new(original: ToolExecutionResult, format: impl Into<String>, content: Value) -> Self {
        Self {
            original,
            format: format.into(),
            content,
            summary: ResultSummary::default(),
            alternatives: Vec::new(),
            metadata: FormatMetadata::default(),
            errors: Vec::new(),
        }
    }

    pub fn with_summary(mut self, summary: ResultSummary) -> Self {
        self.summary = summary;
        self
    }

    pub fn with_alternative(mut self, format: impl Into<String>, content: Value, priority: i32) -> Self {
        self.alternatives.push(AlternativeRepresentation {
            format: format.into(),
            content,
            priority,
        });
        self
    }

    pub fn with_metadata(mut self, metadata: FormatMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Record a non-fatal error.
    pub fn push_error(&mut self, stage: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FormatErrorEntry::new(stage, message));
    }

    /// The `type` discriminator of the content payload, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.content.get("type").and_then(|v| v.as_str())
    }

    /// Quality score, or 0.0 when unscored.
    pub fn quality_score(&self) -> f64 {
        self.metadata.quality_score.unwrap_or(0.0)
    }
}
