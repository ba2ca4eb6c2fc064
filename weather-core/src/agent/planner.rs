use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;

use crate::error::AgentError;

use super::tool::ToolDefinition;

/// A request from the planner to run one tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    /// Correlates the call with its result in the transcript.
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

/// One entry of a conversation transcript.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatMessage {
    System(String),
    User(String),
    /// The assistant asked for a tool to be run.
    ToolCall(ToolCall),
    /// Output of the tool call with the same id, as JSON text.
    ToolResult { call_id: String, content: String },
}

/// What the planner wants to do next.
#[derive(Debug, Clone, PartialEq)]
pub enum PlannerStep {
    CallTool(ToolCall),
    Final(String),
}

/// Decides, given the transcript so far, whether to call a tool or answer.
///
/// Implementations return at most one tool call per step.
#[async_trait]
pub trait Planner: Send + Sync + Debug {
    fn name(&self) -> &str;

    async fn next_step(
        &self,
        transcript: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<PlannerStep, AgentError>;
}
