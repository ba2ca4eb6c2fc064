use async_trait::async_trait;
use schemars::r#gen::SchemaSettings;
use serde_json::Value;
use std::sync::Arc;

use crate::{WeatherQuery, error::ToolError, provider::WeatherProvider};

use super::tool::Tool;

pub const WEATHER_TOOL_NAME: &str = "get_weather";

/// Exposes a `WeatherProvider` to the planner as the `get_weather` tool.
#[derive(Debug, Clone)]
pub struct WeatherTool {
    provider: Arc<dyn WeatherProvider>,
}

impl WeatherTool {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider }
    }
}

/// Inline JSON schema for `WeatherQuery`, without `$ref`s or a meta-schema.
pub fn query_schema() -> Value {
    let settings = SchemaSettings::draft07().with(|s| {
        s.inline_subschemas = true;
        s.meta_schema = None;
    });
    let generator = schemars::r#gen::SchemaGenerator::new(settings);
    let mut schema = generator.into_root_schema_for::<WeatherQuery>();
    schema.schema.metadata().title = None;

    serde_json::to_value(schema.schema).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to serialize weather query schema; using a bare object schema");
        serde_json::json!({"type": "object"})
    })
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        WEATHER_TOOL_NAME
    }

    fn description(&self) -> &str {
        "Calls the OpenWeatherMap One Call API to get current weather, forecasts and alerts \
         for a latitude/longitude pair."
    }

    fn parameters(&self) -> Value {
        query_schema()
    }

    async fn call(&self, args: Value) -> Result<Value, ToolError> {
        let query: WeatherQuery =
            serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments {
                tool: WEATHER_TOOL_NAME.to_string(),
                reason: e.to_string(),
            })?;

        let result = self.provider.fetch(&query).await?;
        tracing::debug!(success = result.is_success(), "Weather tool finished");
        Ok(result.into_tool_output())
    }
}
