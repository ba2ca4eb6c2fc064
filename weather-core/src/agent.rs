//! Plan/act/observe loop around a `Planner` and a `ToolRegistry`.

use chrono::{NaiveDate, Utc};
use std::sync::Arc;

use crate::{error::AgentError, provider::WeatherProvider};

pub mod mock;
pub mod openai;
pub mod planner;
pub mod tool;
pub mod weather_tool;

pub use openai::OpenAiPlanner;
pub use planner::{ChatMessage, Planner, PlannerStep, ToolCall};
pub use tool::{Tool, ToolDefinition, ToolRegistry};
pub use weather_tool::{WEATHER_TOOL_NAME, WeatherTool};

pub const DEFAULT_MAX_STEPS: usize = 8;

/// A conversational agent that can call the weather tool.
///
/// Each `converse` call starts from an empty transcript; nothing is shared between prompts.
#[derive(Debug)]
pub struct WeatherAgent {
    planner: Arc<dyn Planner>,
    tools: ToolRegistry,
    max_steps: usize,
}

impl WeatherAgent {
    pub fn new(planner: Arc<dyn Planner>, tools: ToolRegistry) -> Self {
        Self {
            planner,
            tools,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    /// Agent with `get_weather` as its only tool.
    pub fn with_weather(planner: Arc<dyn Planner>, provider: Arc<dyn WeatherProvider>) -> Self {
        Self::new(planner, ToolRegistry::new().with(WeatherTool::new(provider)))
    }

    /// Planner rounds allowed before giving up; at least one.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    /// Run one conversation to completion and return the final answer.
    #[tracing::instrument(skip_all, fields(planner = self.planner.name()))]
    pub async fn converse(&self, prompt: &str) -> Result<String, AgentError> {
        let definitions = self.tools.definitions();
        let mut transcript = vec![
            ChatMessage::System(system_instruction(Utc::now().date_naive())),
            ChatMessage::User(prompt.to_string()),
        ];

        for step in 1..=self.max_steps {
            match self.planner.next_step(&transcript, &definitions).await? {
                PlannerStep::Final(text) => {
                    tracing::info!(steps = step, "Agent finished");
                    return Ok(text);
                }
                PlannerStep::CallTool(call) => {
                    tracing::debug!(step, tool = %call.name, args = %call.arguments, "Calling tool");

                    let output = self.tools.call(&call.name, call.arguments.clone()).await?;
                    let call_id = call.id.clone();
                    transcript.push(ChatMessage::ToolCall(call));
                    transcript.push(ChatMessage::ToolResult {
                        call_id,
                        content: output.to_string(),
                    });
                }
            }
        }

        Err(AgentError::StepLimit(self.max_steps))
    }
}

fn system_instruction(today: NaiveDate) -> String {
    format!(
        "You are a weather assistant. Today is {today} (UTC). \
         When the user asks about weather, call the `{WEATHER_TOOL_NAME}` tool with the \
         latitude and longitude of the place in question, then answer from the data it returns. \
         If the tool reports an error, explain it plainly. Answer in the user's language."
    )
}
