//! HTTP routes: `GET /health` and `POST /convert`.

use crate::config::ServiceConfig;
use crate::converter::Converter;
use crate::error::ApiError;
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const PDF_CONTENT_DISPOSITION: &str = "attachment; filename=document.pdf";

/// Body of `POST /convert`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConversionRequest {
    /// Absent and `null` both decode as `None` and are rejected by validation.
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Serialize)]
struct HealthBody {
    status: &'static str,
}

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub converter: Arc<Converter>,
}

impl AppState {
    pub fn new(converter: Converter) -> Self {
        Self {
            converter: Arc::new(converter),
        }
    }
}

/// Builds the service router.
pub fn router(state: AppState, config: &ServiceConfig) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/convert", post(convert).fallback(method_not_allowed))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .with_state(state)
}

async fn health() -> Json<HealthBody> {
    Json(HealthBody { status: "healthy" })
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Decodes the body as JSON whatever the declared content type.
fn decode_request(body: &[u8]) -> Result<ConversionRequest, ApiError> {
    let request: ConversionRequest =
        serde_json::from_slice(body).map_err(|_| ApiError::InvalidJson)?;
    match request.html.as_deref() {
        Some(html) if !html.is_empty() => Ok(request),
        _ => Err(ApiError::MissingHtml),
    }
}

async fn convert(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let request = decode_request(&body)?;
    let html = request.html.as_deref().unwrap_or_default();

    let pdf = state
        .converter
        .convert(html, request.title.as_deref())
        .await
        .map_err(|e| {
            error!("PDF generation failed: {}", e);
            ApiError::from(e)
        })?;

    Ok((
        [
            (header::CONTENT_TYPE, PDF_CONTENT_TYPE),
            (header::CONTENT_DISPOSITION, PDF_CONTENT_DISPOSITION),
        ],
        pdf,
    )
        .into_response())
}
