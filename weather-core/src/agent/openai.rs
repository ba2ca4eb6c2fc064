use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    config::{ApiKey, LlmSettings},
    error::AgentError,
};

use super::{
    planner::{ChatMessage, Planner, PlannerStep, ToolCall},
    tool::ToolDefinition,
};

/// `Planner` backed by an OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiPlanner {
    http: Client,
    api_key: ApiKey,
    endpoint: String,
    model: String,
}

impl OpenAiPlanner {
    pub fn new(settings: &LlmSettings) -> Result<Self, AgentError> {
        let http = Client::builder().timeout(settings.timeout()).build()?;

        Ok(Self {
            http,
            api_key: settings.api_key.clone(),
            endpoint: format!("{}/chat/completions", settings.base_url.trim_end_matches('/')),
            model: settings.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request<'a>(
        &'a self,
        transcript: &[ChatMessage],
        tools: &'a [ToolDefinition],
    ) -> ChatCompletionRequest<'a> {
        let has_tools = !tools.is_empty();

        ChatCompletionRequest {
            model: &self.model,
            messages: transcript.iter().map(WireMessage::from).collect(),
            tools: tools
                .iter()
                .map(|def| WireTool {
                    kind: "function",
                    function: WireFunction {
                        name: &def.name,
                        description: &def.description,
                        parameters: &def.parameters,
                    },
                })
                .collect(),
            tool_choice: has_tools.then_some("auto"),
            parallel_tool_calls: has_tools.then_some(false),
        }
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parallel_tool_calls: Option<bool>,
}

#[derive(Serialize)]
struct WireTool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireFunction<'a>,
}

#[derive(Serialize)]
struct WireFunction<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a Value,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<WireToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl WireMessage {
    fn text(role: &'static str, content: &str) -> Self {
        Self {
            role,
            content: Some(content.to_string()),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }
}

impl From<&ChatMessage> for WireMessage {
    fn from(message: &ChatMessage) -> Self {
        match message {
            ChatMessage::System(text) => WireMessage::text("system", text),
            ChatMessage::User(text) => WireMessage::text("user", text),
            ChatMessage::ToolCall(call) => WireMessage {
                role: "assistant",
                content: None,
                tool_calls: vec![WireToolCall {
                    id: call.id.clone(),
                    kind: "function".to_string(),
                    function: WireFunctionCall {
                        name: call.name.clone(),
                        arguments: call.arguments.to_string(),
                    },
                }],
                tool_call_id: None,
            },
            ChatMessage::ToolResult { call_id, content } => WireMessage {
                role: "tool",
                content: Some(content.clone()),
                tool_calls: Vec::new(),
                tool_call_id: Some(call_id.clone()),
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type", default = "function_kind")]
    kind: String,
    function: WireFunctionCall,
}

fn function_kind() -> String {
    "function".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    /// JSON-encoded arguments object.
    arguments: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<WireToolCall>>,
}

impl ResponseMessage {
    fn into_step(self) -> Result<PlannerStep, AgentError> {
        let mut calls = self.tool_calls.unwrap_or_default().into_iter();

        if let Some(call) = calls.next() {
            let skipped = calls.count();
            if skipped > 0 {
                tracing::warn!(skipped, "Model returned several tool calls; running only the first");
            }

            let arguments = parse_arguments(&call.function.arguments).map_err(|e| {
                AgentError::Model(format!(
                    "Malformed arguments for tool '{}': {e}",
                    call.function.name
                ))
            })?;

            return Ok(PlannerStep::CallTool(ToolCall {
                id: call.id,
                name: call.function.name,
                arguments,
            }));
        }

        match self.content {
            Some(text) if !text.trim().is_empty() => Ok(PlannerStep::Final(text)),
            _ => Err(AgentError::Model("Model returned an empty answer".to_string())),
        }
    }
}

fn parse_arguments(raw: &str) -> Result<Value, serde_json::Error> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(raw)
}

#[async_trait]
impl Planner for OpenAiPlanner {
    fn name(&self) -> &str {
        "openai"
    }

    async fn next_step(
        &self,
        transcript: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<PlannerStep, AgentError> {
        let body = self.build_request(transcript, tools);

        let mut request = self.http.post(&self.endpoint);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(self.api_key.as_str());
        }

        let response = request.json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AgentError::Model(format!(
                "API returned status {status}: {}",
                text.trim()
            )));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Model(format!("Failed to parse response JSON: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::Model("No choices found in model response".to_string()))?
            .message
            .into_step()
    }
}
