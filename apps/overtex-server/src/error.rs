//! Error types for the OverTeX server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use latex_engine::ValidationError;
use serde_json::json;
use thiserror::Error;

/// Request-level failures
///
/// Failed builds are not errors: they are returned as a `BuildResult` with
/// status 500 by the build handler.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Missing required fields: sourceFile, outputDir")]
    MissingFields,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    UnsafePath(#[from] ValidationError),

    #[error("PDF not found. Build the document first.")]
    PdfNotFound,

    #[error("Route {0} not found")]
    RouteNotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, body) = match &self {
            ApiError::MissingFields => (
                StatusCode::BAD_REQUEST,
                json!({ "success": false, "message": message, "logs": [] }),
            ),
            ApiError::Validation(_) | ApiError::UnsafePath(_) => (
                StatusCode::BAD_REQUEST,
                json!({ "success": false, "message": message }),
            ),
            ApiError::PdfNotFound => (StatusCode::NOT_FOUND, json!({ "error": message })),
            ApiError::RouteNotFound(_) => (
                StatusCode::NOT_FOUND,
                json!({ "success": false, "message": message }),
            ),
            ApiError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "success": false, "message": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::MissingFields.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::UnsafePath(ValidationError::UnsafePath("../etc".into()))
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::PdfNotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Internal("disk on fire".into())
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_unsafe_path_message_passes_through() {
        let err = ApiError::from(ValidationError::UnsafePath("a;b".into()));
        assert_eq!(
            err.to_string(),
            "Invalid file path: potential security risk detected"
        );
    }
}
