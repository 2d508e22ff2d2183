//! Weather report assembly.
//!
//! One request runs: region lookup → forecast fetch → normalize →
//! advisories → optional prediction. Calls are sequential; the only shared
//! state is the read-only client and model held in `AppState`.

use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

use crate::errors::AppError;
use crate::routes::AppState;
use crate::services::advisory::advisory_messages;
use crate::services::normalizer::{
    normalize_forecast, ElementKind, ElementSeries, NormalizeError, FORECAST_ELEMENTS,
};
use crate::services::prediction::Prediction;
use crate::services::regions::find_region;

/// Everything the page shows for one region.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WeatherReport {
    /// Selected county name
    pub region: String,
    /// Township name returned by the forecast API
    pub location_name: String,
    /// Up to six readings per element, keyed by canonical element name
    #[schema(value_type = Object)]
    pub elements: BTreeMap<ElementKind, ElementSeries>,
    /// Advisory messages, in rule order
    pub advisories: Vec<String>,
    /// Next-hour temperature prediction
    pub prediction: Prediction,
}

/// Build the weather report for a county name.
pub async fn build_report(state: &AppState, county: &str) -> Result<WeatherReport, AppError> {
    let region =
        find_region(county).ok_or_else(|| AppError::UnknownRegion(county.to_string()))?;

    tracing::info!(
        "Building report for {} ({})",
        region.name,
        region.location_id
    );

    let raw = state.cwa_client.fetch_town_forecast(region.location_id).await?;
    let forecast = normalize_forecast(&raw, FORECAST_ELEMENTS).map_err(|e| match e {
        NormalizeError::LocationNotFound => AppError::LocationNotFound(region.name.to_string()),
        other => other.into(),
    })?;

    let advisories = advisory_messages(
        &forecast.values(ElementKind::Temperature),
        &forecast.values(ElementKind::PrecipitationProbability),
        &forecast.values(ElementKind::RelativeHumidity),
    );

    let prediction = state
        .prediction
        .predict_for_region(&state.cwa_client, region)
        .await;

    Ok(WeatherReport {
        region: region.name.to_string(),
        location_name: forecast.location_name,
        elements: forecast.elements,
        advisories,
        prediction,
    })
}
