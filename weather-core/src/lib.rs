//! Core library for the weather chatbot.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather One Call client, behind the `WeatherProvider` trait
//! - The agent loop: tool registry, planner abstraction and an OpenAI-backed planner
//! - The request handler that turns every outcome into something displayable
//!
//! It is used by `weather-web`, but can also be reused by other binaries or services.

pub mod agent;
pub mod config;
pub mod error;
pub mod handler;
pub mod model;
pub mod provider;

pub use agent::WeatherAgent;
pub use config::{ApiKey, Config, LlmSettings, ServerSettings, WeatherSettings};
pub use error::{AgentError, ToolError, WeatherError};
pub use handler::RequestHandler;
pub use model::{DisplayKind, DisplayResult, Units, WeatherQuery, WeatherResult};
pub use provider::{WeatherProvider, openweather::OpenWeatherClient};
