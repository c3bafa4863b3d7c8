//! Test formatters and fixtures shared by the integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use result_formatting::{
    CoreError, CoreResult, FormatContext, FormattedResult, FormatterDefinition,
    FormatterExecutable, FormattingConfig, NoopAnalytics, OrchestrationService, ResultSummary,
    ToolDescriptor, ToolExecutionResult,
};
use serde_json::json;

/// What a `TestFormatter` does when asked to format.
#[derive(Clone, Copy, PartialEq)]
pub enum Behaviour {
    /// Complete, high quality output
    Good,
    /// Output with no summary and no title
    Sloppy,
    /// Returns an error
    Fail,
    /// Sleeps before returning good output
    Slow(u64),
    /// Good output with a short description and no highlights or suggestions
    Terse,
    /// Good output with an empty headline
    Headless,
    /// Good output whose `content.type` names a different format
    Mislabeled,
}

pub struct TestFormatter {
    pub id: String,
    pub format: String,
    pub priority: i32,
    pub behaviour: Behaviour,
    pub calls: Arc<AtomicUsize>,
}

impl TestFormatter {
    pub fn new(id: &str, format: &str, priority: i32, behaviour: Behaviour) -> Self {
        Self {
            id: id.to_string(),
            format: format.to_string(),
            priority,
            behaviour,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

impl FormatterDefinition for TestFormatter {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.id
    }

    fn supported_formats(&self) -> Vec<String> {
        vec![self.format.clone()]
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

#[async_trait]
impl FormatterExecutable for TestFormatter {
    fn can_format(&self, _result: &ToolExecutionResult, _ctx: &FormatContext) -> CoreResult<bool> {
        Ok(true)
    }

    async fn format(
        &self,
        result: &ToolExecutionResult,
        ctx: &FormatContext,
    ) -> CoreResult<FormattedResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behaviour {
            Behaviour::Fail => return Err(CoreError::internal("formatter blew up")),
            Behaviour::Slow(ms) => tokio::time::sleep(Duration::from_millis(ms)).await,
            Behaviour::Sloppy => {
                return Ok(FormattedResult::new(
                    result.clone(),
                    self.format.clone(),
                    json!({"type": self.format}),
                ))
            }
            Behaviour::Good | Behaviour::Terse | Behaviour::Headless | Behaviour::Mislabeled => {}
        }

        let content_type = if self.behaviour == Behaviour::Mislabeled {
            "card".to_string()
        } else {
            self.format.clone()
        };

        Ok(FormattedResult::new(
            result.clone(),
            self.format.clone(),
            json!({
                "type": content_type,
                "title": ctx.tool.name,
                "text": "rendered",
                "columns": ["value"],
                "rows": [["rendered"]],
            }),
        )
        .with_summary(self.summarize(result, ctx)))
    }

    fn summarize(&self, _result: &ToolExecutionResult, ctx: &FormatContext) -> ResultSummary {
        match self.behaviour {
            Behaviour::Terse => return ResultSummary::new(format!("{} finished", ctx.tool.name), "Rendered."),
            Behaviour::Headless => {
                return ResultSummary::new(
                    "",
                    "The tool produced output that was rendered by the test formatter in full.",
                )
                .with_highlights(vec!["rendered".to_string()])
                .with_suggestions(vec!["try again".to_string()])
            }
            _ => {}
        }

        ResultSummary::new(
            format!("{} finished without problems", ctx.tool.name),
            "The tool produced output that was rendered by the test formatter in full.",
        )
        .with_highlights(vec!["rendered".to_string()])
        .with_suggestions(vec!["try again".to_string()])
    }
}

pub fn tool(id: &str) -> ToolDescriptor {
    ToolDescriptor::new(id, format!("{} tool", id))
}

pub fn rows() -> ToolExecutionResult {
    ToolExecutionResult::ok(json!([
        {"name": "alpha", "score": 3},
        {"name": "beta", "score": 5},
    ]))
}

/// Service with no plugins and no analytics.
pub fn empty_service(config: FormattingConfig) -> OrchestrationService {
    OrchestrationService::new(config, Arc::new(NoopAnalytics)).unwrap()
}
