//! Result Formatting Core
//!
//! Foundational traits, error types, and data models for the result
//! formatting workspace. This crate has no dependency on the registry,
//! cache, or orchestration code.
//!
//! ## Module Organization
//!
//! - `error` - Core error taxonomy (`CoreError`, `CoreResult`)
//! - `context` - Per-request context (`FormatContext`, `DisplayMode`, `Audience`)
//! - `models` - Tool input and formatted output types
//! - `formatter_trait` - Plugin traits (`Formatter`, `Processor`)
//!
//! ## Design Principles
//!
//! 1. **Small dependency set** - serde, chrono, async-trait, thiserror
//! 2. **Trait-based plugins** - formatters are registered as `Arc<dyn Formatter>`
//! 3. **Unidirectional dependency** - this crate depends on nothing else in the workspace

pub mod context;
pub mod error;
pub mod formatter_trait;
pub mod models;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Context ────────────────────────────────────────────────────────────
pub use context::{Audience, DisplayMode, FormatContext};

// ── Models ─────────────────────────────────────────────────────────────
pub use models::{
    formats, AlternativeRepresentation, FormatErrorEntry, FormatMetadata, FormattedResult,
    OutputShape, ResultSummary, ToolDescriptor, ToolExecutionResult, ToolTiming,
};

// ── Plugin Traits ──────────────────────────────────────────────────────
pub use formatter_trait::{
    Formatter, FormatterDefinition, FormatterExecutable, Processor, ToolCompatibility,
};
