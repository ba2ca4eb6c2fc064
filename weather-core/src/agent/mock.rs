use async_trait::async_trait;
use std::{collections::VecDeque, sync::Mutex};

use crate::error::AgentError;

use super::{
    planner::{ChatMessage, Planner, PlannerStep, ToolCall},
    tool::ToolDefinition,
};

/// Planner that replays a fixed script of steps and records every transcript it sees.
///
/// Running past the end of the script is an `AgentError::Model`.
#[derive(Debug, Default)]
pub struct ScriptedPlanner {
    script: Mutex<VecDeque<Result<PlannerStep, String>>>,
    seen: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then_call(self, id: &str, name: &str, arguments: serde_json::Value) -> Self {
        self.push(Ok(PlannerStep::CallTool(ToolCall {
            id: id.to_string(),
            name: name.to_string(),
            arguments,
        })))
    }

    pub fn then_answer(self, text: impl Into<String>) -> Self {
        self.push(Ok(PlannerStep::Final(text.into())))
    }

    pub fn then_fail(self, message: impl Into<String>) -> Self {
        self.push(Err(message.into()))
    }

    fn push(self, step: Result<PlannerStep, String>) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(step);
        }
        self
    }

    /// Transcripts passed to `next_step`, one per call.
    pub fn transcripts(&self) -> Vec<Vec<ChatMessage>> {
        self.seen.lock().map(|seen| seen.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Planner for ScriptedPlanner {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn next_step(
        &self,
        transcript: &[ChatMessage],
        _tools: &[ToolDefinition],
    ) -> Result<PlannerStep, AgentError> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(transcript.to_vec());
        }

        let next = self.script.lock().ok().and_then(|mut script| script.pop_front());
        match next {
            Some(Ok(step)) => Ok(step),
            Some(Err(message)) => Err(AgentError::Model(message)),
            None => Err(AgentError::Model("Planner script exhausted".to_string())),
        }
    }
}
