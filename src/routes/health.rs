use axum::extract::State;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use super::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status ("ok" when the model is loaded, "degraded" otherwise)
    pub status: String,
    /// API version
    pub version: String,
    /// Whether the temperature model artifact was loaded at startup
    pub model_loaded: bool,
}

/// Health check endpoint.
///
/// Always 200. A missing prediction model only disables the prediction
/// column, so it is reported as "degraded" rather than as a failure.
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let model_loaded = state.prediction.is_loaded();

    Json(HealthResponse {
        status: if model_loaded {
            "ok".to_string()
        } else {
            "degraded".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        model_loaded,
    })
}
