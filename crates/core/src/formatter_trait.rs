//! Formatter and Processor Traits
//!
//! Defines the plugin abstraction with split definition/execution traits:
//!
//! - `FormatterDefinition` - Identity, supported formats, priority, tool affinity
//! - `FormatterExecutable` - Compatibility predicate, formatting, summarizing
//! - `Formatter` - Combined trait (auto-implemented via blanket impl)
//! - `Processor` - Post-processing step applied after formatting
//!
//! The split lets the registry index and rank formatters from their
//! definitions alone, and lets tests mock execution independently.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::context::FormatContext;
use crate::error::CoreResult;
use crate::models::{FormattedResult, OutputShape, ResultSummary, ToolExecutionResult};

// ============================================================================
// Tool affinity
// ============================================================================

/// A formatter's declared preferences for originating tools and output shapes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCompatibility {
    /// Tools this formatter should win for
    #[serde(default)]
    pub preferred_tools: Vec<String>,
    /// Tools this formatter should lose for
    #[serde(default)]
    pub excluded_tools: Vec<String>,
    /// Output shapes this formatter is designed for. Empty = undeclared.
    #[serde(default)]
    pub output_types: Vec<OutputShape>,
}

impl ToolCompatibility {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefer(mut self, tool_id: impl Into<String>) -> Self {
        self.preferred_tools.push(tool_id.into());
        self
    }

    pub fn exclude(mut self, tool_id: impl Into<String>) -> Self {
        self.excluded_tools.push(tool_id.into());
        self
    }

    pub fn accept_shape(mut self, shape: OutputShape) -> Self {
        self.output_types.push(shape);
        self
    }

    pub fn prefers(&self, tool_id: &str) -> bool {
        self.preferred_tools.iter().any(|t| t == tool_id)
    }

    pub fn excludes(&self, tool_id: &str) -> bool {
        self.excluded_tools.iter().any(|t| t == tool_id)
    }

    /// `None` when no output types are declared, otherwise whether `shape` matches.
    pub fn matches_shape(&self, shape: OutputShape) -> Option<bool> {
        if self.output_types.is_empty() {
            None
        } else {
            Some(self.output_types.iter().any(|t| t.accepts(shape)))
        }
    }
}

// ============================================================================
// Trait Definitions
// ============================================================================

/// Formatter identity and capability metadata.
pub trait FormatterDefinition: Send + Sync {
    /// Unique identifier (e.g., "table", "markdown-text").
    fn id(&self) -> &str;

    /// Human-readable name.
    fn name(&self) -> &str;

    /// Format tags this formatter can produce. Must not be empty.
    fn supported_formats(&self) -> Vec<String>;

    /// Base ranking priority. Higher wins.
    fn priority(&self) -> i32 {
        0
    }

    /// Optional tool-affinity descriptor.
    fn tool_compatibility(&self) -> Option<ToolCompatibility> {
        None
    }

    /// Whether this formatter declares support for `format`.
    fn supports_format(&self, format: &str) -> bool {
        self.supported_formats().iter().any(|f| f == format)
    }
}

/// Formatter behaviour.
///
/// Implementations must be stateless with respect to the engine: the same
/// inputs produce the same output and no shared mutable state is touched.
#[async_trait]
pub trait FormatterExecutable: Send + Sync {
    /// Whether this formatter can handle the result.
    ///
    /// An `Err` is treated by the registry as "not compatible".
    fn can_format(&self, result: &ToolExecutionResult, ctx: &FormatContext) -> CoreResult<bool>;

    /// Convert the result into this formatter's presentation.
    async fn format(
        &self,
        result: &ToolExecutionResult,
        ctx: &FormatContext,
    ) -> CoreResult<FormattedResult>;

    /// Produce only the natural-language summary.
    fn summarize(&self, result: &ToolExecutionResult, ctx: &FormatContext) -> ResultSummary;
}

/// Combined trait for formatters.
pub trait Formatter: FormatterDefinition + FormatterExecutable {}

// Blanket implementation: anything that implements both traits is a Formatter
impl<T: FormatterDefinition + FormatterExecutable> Formatter for T {}

/// Post-processing step applied to an already formatted result.
///
/// Processors run in descending priority order. A failing processor is
/// skipped; the chain continues with the previous result.
#[async_trait]
pub trait Processor: Send + Sync {
    fn id(&self) -> &str;

    fn priority(&self) -> i32 {
        0
    }

    async fn process(
        &self,
        result: &FormattedResult,
        ctx: &FormatContext,
    ) -> CoreResult<FormattedResult>;
}

// ============================================================================
// Tests
// ============================================================================
