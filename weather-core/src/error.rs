use thiserror::Error;

/// Faults raised while talking to the weather provider.
///
/// A non-200 answer is not one of these; it comes back as `WeatherResult::Failure`.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Failed to build weather HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Weather request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Weather provider returned malformed JSON: {0}")]
    Decode(#[source] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Invalid arguments for tool '{tool}': {reason}")]
    InvalidArguments { tool: String, reason: String },

    #[error(transparent)]
    Weather(#[from] WeatherError),
}

/// Anything that stops a conversation from producing a final answer.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Language model error: {0}")]
    Model(String),

    #[error("Language model request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("Agent gave no final answer after {0} steps")]
    StepLimit(usize),

    #[error("Agent task failed: {0}")]
    Join(String),
}
