use crate::{
    Config, WeatherQuery, WeatherResult, error::WeatherError,
    provider::openweather::OpenWeatherClient,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod mock;
pub mod openweather;

/// Source of weather data for a coordinate pair.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// One fresh request per call. Provider-side errors come back as
    /// `WeatherResult::Failure`; only transport-level faults are `Err`.
    async fn fetch(&self, query: &WeatherQuery) -> Result<WeatherResult, WeatherError>;
}

/// Construct the OpenWeather client from config.
///
/// A missing key is not rejected here: the call still goes out and the provider answers 401.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    if config.weather.api_key.is_empty() {
        tracing::warn!(
            "{} is not set; weather requests will be rejected by the provider",
            crate::config::WEATHER_API_KEY_VAR
        );
    }

    let client = OpenWeatherClient::from_settings(&config.weather)?;
    Ok(Arc::new(client))
}
