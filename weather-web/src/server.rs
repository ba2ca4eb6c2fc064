use anyhow::Context;
use axum::{
    Form, Json, Router,
    extract::State,
    response::Html,
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use weather_core::{DisplayResult, RequestHandler};

use crate::page;

type AppState = Arc<RequestHandler>;

#[derive(Debug, Deserialize)]
struct PromptInput {
    #[serde(default)]
    prompt: String,
}

pub fn router(handler: RequestHandler) -> Router {
    Router::new()
        .route("/", get(index).post(submit))
        .route("/api/prompt", post(api_prompt))
        .route("/healthz", get(|| async { "ok" }))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(handler))
}

pub async fn serve(bind: &str, handler: RequestHandler) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;

    let addr = listener.local_addr().context("Failed to read local address")?;
    tracing::info!("Weather chatbot listening at http://{addr}");

    axum::serve(listener, router(handler))
        .await
        .context("Server terminated with an error")
}

async fn index() -> Html<String> {
    Html(page::render("", None))
}

async fn submit(State(handler): State<AppState>, Form(input): Form<PromptInput>) -> Html<String> {
    let result = handler.handle(&input.prompt).await;
    Html(page::render(&input.prompt, Some(&result)))
}

async fn api_prompt(
    State(handler): State<AppState>,
    Json(input): Json<PromptInput>,
) -> Json<DisplayResult> {
    Json(handler.handle(&input.prompt).await)
}
