//! Core Error Types
//!
//! Defines the error taxonomy shared across the result formatting workspace.
//! Registry and cache failures are recovered where they occur; formatter
//! failures are turned into degraded results by the orchestration service.
//! Only `NoFormatterFound` and configuration errors are expected to reach
//! callers of the top-level API.

use thiserror::Error;

/// Core error type for the result formatting workspace.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Bad formatter/processor registration or malformed input
    #[error("Validation error: {0}")]
    Validation(String),

    /// No registered formatter can handle the result
    #[error("No formatter found: {0}")]
    NoFormatterFound(String),

    /// A formatter did not finish within the configured deadline
    #[error("Formatter '{formatter_id}' timed out after {timeout_ms}ms")]
    FormattingTimeout { formatter_id: String, timeout_ms: u64 },

    /// A formatter returned an error or panicked
    #[error("Formatter '{formatter_id}' failed: {message}")]
    FormatterExecution { formatter_id: String, message: String },

    /// Cache read/write failures (always treated as a miss)
    #[error("Cache error: {0}")]
    Cache(String),

    /// A single post-processor failed
    #[error("Processor '{processor_id}' failed: {message}")]
    Processor { processor_id: String, message: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for core errors
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a no-formatter-found error
    pub fn no_formatter(msg: impl Into<String>) -> Self {
        Self::NoFormatterFound(msg.into())
    }

    /// Create a formatting timeout error
    pub fn timeout(formatter_id: impl Into<String>, timeout_ms: u64) -> Self {
        Self::FormattingTimeout {
            formatter_id: formatter_id.into(),
            timeout_ms,
        }
    }

    /// Create a formatter execution error
    pub fn execution(formatter_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FormatterExecution {
            formatter_id: formatter_id.into(),
            message: message.into(),
        }
    }

    /// Create a cache error
    pub fn cache(msg: impl Into<String>) -> Self {
        Self::Cache(msg.into())
    }

    /// Create a processor error
    pub fn processor(processor_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Processor {
            processor_id: processor_id.into(),
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error came from running a formatter (timeout or failure).
    ///
    /// These errors are recovered by the fallback path instead of being
    /// surfaced to the caller.
    pub fn is_execution_failure(&self) -> bool {
        matches!(
            self,
            CoreError::FormattingTimeout { .. } | CoreError::FormatterExecution { .. }
        )
    }

    /// Short machine-readable kind, used for analytics and error entries.
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::Validation(_) => "validation",
            CoreError::NoFormatterFound(_) => "no_formatter_found",
            CoreError::FormattingTimeout { .. } => "formatting_timeout",
            CoreError::FormatterExecution { .. } => "formatter_execution",
            CoreError::Cache(_) => "cache",
            CoreError::Processor { .. } => "processor",
            CoreError::Config(_) => "config",
            CoreError::Io(_) => "io",
            CoreError::Serialization(_) => "serialization",
            CoreError::Internal(_) => "internal",
        }
    }
}

/// Convert CoreError to a string
impl From<CoreError> for String {
    fn from(err: CoreError) -> String {
        err.to_string()
    }
}
