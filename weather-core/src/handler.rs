use std::sync::Arc;

use crate::{
    Config, DisplayResult,
    agent::{OpenAiPlanner, WeatherAgent},
    error::AgentError,
    provider::provider_from_config,
};

/// The boundary between the UI and the agent: every prompt gets a `DisplayResult`, never an error.
#[derive(Debug, Clone)]
pub struct RequestHandler {
    agent: Arc<WeatherAgent>,
}

impl RequestHandler {
    pub fn new(agent: WeatherAgent) -> Self {
        Self {
            agent: Arc::new(agent),
        }
    }

    /// Wire the OpenWeather client and the OpenAI planner from config.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        if config.llm.api_key.is_empty() {
            tracing::warn!(
                "{} is not set; model requests will likely be rejected",
                crate::config::OPENAI_API_KEY_VAR
            );
        }

        let provider = provider_from_config(config)?;
        let planner = OpenAiPlanner::new(&config.llm)?;
        tracing::info!(model = planner.model(), "Using language model");

        let agent = WeatherAgent::with_weather(Arc::new(planner), provider)
            .with_max_steps(config.llm.max_steps);
        Ok(Self::new(agent))
    }

    /// Run the agent on its own task, so a panic inside it is reported like any other fault.
    pub async fn handle(&self, prompt: &str) -> DisplayResult {
        let agent = Arc::clone(&self.agent);
        let prompt = prompt.to_owned();

        let outcome = tokio::spawn(async move { agent.converse(&prompt).await })
            .await
            .unwrap_or_else(|join| Err(AgentError::Join(join.to_string())));

        match outcome {
            Ok(reply) => DisplayResult::text(reply),
            Err(err) => {
                tracing::warn!(error = %err, "Prompt failed");
                DisplayResult::error(err.to_string())
            }
        }
    }
}
