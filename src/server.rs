//! HTTP server for project guide generation

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::{GuideEngine, GuideError, GuideResponse};

/// HTTP request body for `/api/generate`
#[derive(Debug, Deserialize)]
pub struct GenerateRequestHttp {
    /// Kept loose so a missing or mistyped field maps to a 400, not a 422
    #[serde(default)]
    pub sensors: Option<serde_json::Value>,
}

impl GenerateRequestHttp {
    /// String members of `sensors`, or `None` if it is not an array
    fn names(&self) -> Option<Vec<String>> {
        let items = self.sensors.as_ref()?.as_array()?;
        Some(
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
        )
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub error: String,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// Error wrapper that renders as `{status, error}` with a matching HTTP status
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            message: message.into(),
        }
    }
}

impl From<GuideError> for ApiError {
    fn from(e: GuideError) -> Self {
        Self::new(e.status(), e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            status: self.status.as_u16(),
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Generate guide handler
async fn generate_handler(
    State(engine): State<Arc<GuideEngine>>,
    payload: Result<Json<GenerateRequestHttp>, JsonRejection>,
) -> Result<Json<GuideResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| {
        info!("Rejected malformed generate request: {}", e);
        ApiError::from(GuideError::InvalidInput)
    })?;

    let names = req.names().ok_or(GuideError::InvalidInput)?;
    info!("Received generate request: {:?}", names);

    match engine.generate_guide(&names).await {
        Ok(response) => {
            info!(
                "Guide served: source={}, cached={}, {} chars",
                response.source.as_str(),
                response.cached,
                response.result.len()
            );
            Ok(Json(response))
        }
        Err(e) => {
            error!("Guide generation failed: {}", e);
            Err(e.into())
        }
    }
}

/// Health check handler
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "Server is running".to_string(),
    })
}

async fn not_found_handler() -> ApiError {
    ApiError::new(404, "Not found")
}

/// Create and configure the HTTP router
pub fn create_router(engine: Arc<GuideEngine>) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/generate", post(generate_handler))
        .fallback(not_found_handler)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(engine)
}

/// Run the HTTP server
pub async fn run_server(engine: Arc<GuideEngine>, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    info!("Starting guide server on {}", addr);

    let app = create_router(engine);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("✓ Server listening on {}", addr);
    info!("  API endpoint: POST http://localhost:{}/api/generate", port);

    axum::serve(listener, app).await?;

    Ok(())
}
