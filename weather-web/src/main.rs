//! Binary crate for the `weather-web` server.
//!
//! This crate focuses on:
//! - Loading configuration and logging setup
//! - Serving the single-page prompt form
//! - Rendering agent replies as HTML

use anyhow::Context;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use weather_core::{Config, RequestHandler};

mod page;
mod server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();
    init_tracing();
    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "Loaded environment file");
    }

    let config = Config::load().context("Failed to load configuration")?;
    let handler = RequestHandler::from_config(&config)?;

    server::serve(&config.server.bind, handler).await
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}
