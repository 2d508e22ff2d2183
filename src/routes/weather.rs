//! Weather report JSON endpoint.
//!
//! GET /api/v1/weather?county=<name> — the same report the page renders.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use utoipa::IntoParams;

use super::AppState;
use crate::errors::{AppError, ErrorResponse};
use crate::services::report::{build_report, WeatherReport};

#[derive(Debug, Deserialize, IntoParams)]
pub struct WeatherQuery {
    /// County name (e.g. "臺北市"), see /api/v1/regions
    pub county: Option<String>,
}

/// Get the forecast, advisories and next-hour prediction for a county.
///
/// The prediction is best-effort: when the model or station observation is
/// unavailable the report still succeeds with `prediction.status =
/// "unavailable"`.
#[utoipa::path(
    get,
    path = "/api/v1/weather",
    tag = "Weather",
    params(WeatherQuery),
    responses(
        (status = 200, description = "Weather report for the county", body = WeatherReport),
        (status = 400, description = "Missing or unknown county", body = ErrorResponse),
        (status = 404, description = "No location data for the county", body = ErrorResponse),
        (status = 502, description = "CWA API unreachable or returned an unexpected structure", body = ErrorResponse),
    )
)]
pub async fn get_weather(
    State(state): State<AppState>,
    Query(params): Query<WeatherQuery>,
) -> Result<Json<WeatherReport>, AppError> {
    let county = params
        .county
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or(AppError::MissingParameter("county"))?;

    let report = build_report(&state, county).await?;
    Ok(Json(report))
}
