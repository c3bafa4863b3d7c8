//! Format Context
//!
//! The immutable per-request context handed to formatters and processors.
//! The orchestration service builds one `FormatContext` per request from the
//! caller's options and the configured defaults, then shares it by `Arc` for
//! the rest of the pipeline. Nothing in the engine mutates it afterwards.

use serde::{Deserialize, Serialize};

use crate::models::{FormattedResult, ToolDescriptor};

/// How much detail a rendering layer wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    Compact,
    #[default]
    Detailed,
    Summary,
}

impl std::fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayMode::Compact => write!(f, "compact"),
            DisplayMode::Detailed => write!(f, "detailed"),
            DisplayMode::Summary => write!(f, "summary"),
        }
    }
}

/// Intended reader of the formatted output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    #[default]
    General,
    Technical,
    Executive,
}

impl std::fmt::Display for Audience {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Audience::General => write!(f, "general"),
            Audience::Technical => write!(f, "technical"),
            Audience::Executive => write!(f, "executive"),
        }
    }
}

/// Request context for one formatting call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatContext {
    pub tool_id: String,
    pub tool: ToolDescriptor,
    pub display_mode: DisplayMode,
    pub audience: Audience,
    pub locale: String,
    pub timezone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<String>,
    /// Results previously produced in the same conversation
    #[serde(default)]
    pub previous_results: Vec<FormattedResult>,
}

impl FormatContext {
    /// Create a context for the given tool with default presentation settings.
    pub fn new(tool: ToolDescriptor) -> Self {
        Self {
            tool_id: tool.id.clone(),
            tool,
            display_mode: DisplayMode::default(),
            audience: Audience::default(),
            locale: "en-US".to_string(),
            timezone: "UTC".to_string(),
            conversation_id: None,
            user_id: None,
            workspace_id: None,
            previous_results: Vec::new(),
        }
    }

    pub fn with_display_mode(mut self, mode: DisplayMode) -> Self {
        self.display_mode = mode;
        self
    }

    pub fn with_audience(mut self, audience: Audience) -> Self {
        self.audience = audience;
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    pub fn with_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_workspace(mut self, workspace_id: impl Into<String>) -> Self {
        self.workspace_id = Some(workspace_id.into());
        self
    }

    pub fn with_previous_results(mut self, results: Vec<FormattedResult>) -> Self {
        self.previous_results = results;
        self
    }

    /// Whether the caller asked for the shortest representation.
    pub fn is_compact(&self) -> bool {
        matches!(self.display_mode, DisplayMode::Compact | DisplayMode::Summary)
    }
}
