//! chatguard-classifier: a reference classifier service
//!
//! Speaks the protocol the chatguard client expects:
//!
//! ```text
//! GET  /health   ->  200 {"status": "ok"}
//! POST /analyze  {"text": "..."}  ->  200 {"entities": [{"text": "...", "label": "..."}]}
//! ```
//!
//! Entities come from a fixed pattern battery: the built-in structural
//! rules plus heuristic person and organization rules. There is no
//! statistical model behind it.

mod battery;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chatguard::classifier::AnalyzeResponse;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tokio::net::TcpListener;

pub use battery::{extract, labels};

/// Body of `POST /analyze`.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeBody {
    /// Text to classify. Required.
    pub text: Option<String>,
}

/// A rejected request.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The body was not a JSON object.
    #[error("invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),

    /// The `text` field was absent.
    #[error("the 'text' field is required")]
    MissingText,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self, "rejected analyze request");
        (StatusCode::BAD_REQUEST, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn analyze(
    body: Result<Json<AnalyzeBody>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ServiceError> {
    let Json(body) = body?;
    let text = body.text.ok_or(ServiceError::MissingText)?;
    let entities = extract(&text);
    tracing::info!(text_len = text.len(), entities = entities.len(), "analyzed text");
    Ok(Json(AnalyzeResponse { entities }))
}

/// The service routes.
#[must_use]
pub fn router() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/analyze", post(analyze))
}

/// Serve the routes on `listener` until the process stops.
pub async fn serve(listener: TcpListener) -> std::io::Result<()> {
    axum::serve(listener, router()).await
}
