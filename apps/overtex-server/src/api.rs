//! API handlers for the OverTeX server
//!
//! Provides REST endpoints for:
//! - Triggering a LaTeX build
//! - Build status (placeholder)
//! - Serving the compiled PDF
//! - Liveness and readiness probes

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode, Uri},
    response::IntoResponse,
    Json,
};
use build_types::{BuildResult, BuildStatus};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::validate_build_request;

/// Build request body
///
/// Fields stay optional here so that missing ones produce the dedicated
/// "Missing required fields" response instead of a generic JSON rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildApiRequest {
    #[serde(default)]
    pub source_file: Option<String>,
    #[serde(default)]
    pub output_dir: Option<String>,
    #[serde(default)]
    pub command: Option<String>,
}

/// Handler: POST /api/build
///
/// 200 with the result on success, 500 with the result when the compiler
/// failed, 400 for anything rejected before the compiler runs.
pub async fn handle_build(
    State(state): State<AppState>,
    payload: Result<Json<BuildApiRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BuildResult>), ApiError> {
    let Json(raw) = payload.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
    let request = validate_build_request(raw)?;

    info!(
        "Build request: {} in {} ({})",
        request.source_file,
        request.output_dir,
        request.command.unwrap_or_default()
    );

    let result = state.latex.build_request(&request).await?;
    let status = if result.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    Ok((status, Json(result)))
}

/// Handler: GET /api/build/status
///
/// Builds are not tracked server-side; this always reports idle.
pub async fn handle_build_status() -> Json<BuildStatus> {
    Json(BuildStatus::default())
}

/// Handler: GET /api/pdf
pub async fn handle_pdf(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let bytes = match tokio::fs::read(&state.pdf_path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!("No PDF at {}", state.pdf_path.display());
            return Err(ApiError::PdfNotFound);
        }
        Err(err) => {
            return Err(ApiError::Internal(format!(
                "reading {}: {}",
                state.pdf_path.display(),
                err
            )))
        }
    };

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (header::CACHE_CONTROL, "no-store"),
        ],
        bytes,
    ))
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    /// Seconds since the server started
    pub uptime: f64,
    pub environment: String,
    pub version: String,
}

/// Handler: GET /health
pub async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        uptime: state.uptime_secs(),
        environment: state.environment.as_str().to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness response
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadyResponse {
    pub status: String,
    /// "available" or "unavailable"
    pub latex: String,
    pub timestamp: String,
}

/// Handler: GET /ready
///
/// Ready only when latexmk answers its version probe.
pub async fn handle_ready(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let (status, label, latex) = if state.latex.check_latex_installed().await {
        (StatusCode::OK, "ready", "available")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not ready", "unavailable")
    };

    (
        status,
        Json(ReadyResponse {
            status: label.to_string(),
            latex: latex.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }),
    )
}

/// Fallback for unknown routes
pub async fn handle_not_found(uri: Uri) -> ApiError {
    ApiError::RouteNotFound(uri.path().to_string())
}
