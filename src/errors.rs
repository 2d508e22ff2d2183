use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Standard error response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Missing query parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Unknown region: {0}")]
    UnknownRegion(String),

    #[error("No forecast location data for {0}")]
    LocationNotFound(String),

    #[error("Unexpected response structure: {0}")]
    MalformedResponse(String),

    #[error("External service error: {0}")]
    ExternalServiceError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AppError {
    /// HTTP status used for this error, shared by the JSON API and the page.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingParameter(_) | AppError::UnknownRegion(_) => StatusCode::BAD_REQUEST,
            AppError::LocationNotFound(_) => StatusCode::NOT_FOUND,
            AppError::MalformedResponse(_) | AppError::ExternalServiceError(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        (
            status,
            axum::Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

impl From<crate::services::normalizer::NormalizeError> for AppError {
    fn from(err: crate::services::normalizer::NormalizeError) -> Self {
        use crate::services::normalizer::NormalizeError;
        match err {
            NormalizeError::LocationNotFound => {
                AppError::LocationNotFound("the requested location".to_string())
            }
            NormalizeError::MissingField(path) => AppError::MalformedResponse(format!(
                "forecast payload is missing '{}'",
                path
            )),
        }
    }
}
