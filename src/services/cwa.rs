//! CWA open-data client.
//!
//! Fetches township forecasts and automatic-station observations from the
//! Central Weather Administration datastore API.
//! See: https://opendata.cwa.gov.tw/dist/opendata-swagger.html

use crate::errors::AppError;

/// Township forecast dataset; the county is selected with `locationId`.
const TOWN_FORECAST_DATASET: &str = "F-D0047-093";

/// Automatic weather station observations (10-minute data).
const OBSERVATION_DATASET: &str = "O-A0003-001";

/// Client for the CWA datastore API.
#[derive(Debug, Clone)]
pub struct CwaClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl CwaClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::InternalError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Fetch the raw township forecast for one county dataset.
    ///
    /// The payload is returned untyped; its shape varies between API
    /// versions and is handled by the normalizer.
    pub async fn fetch_town_forecast(
        &self,
        location_id: &str,
    ) -> Result<serde_json::Value, AppError> {
        self.get_json(
            TOWN_FORECAST_DATASET,
            &[
                ("Authorization", self.api_key.as_str()),
                ("format", "JSON"),
                ("locationId", location_id),
            ],
        )
        .await
    }

    /// Fetch the latest observation for a single station.
    pub async fn fetch_observation(&self, station_id: &str) -> Result<serde_json::Value, AppError> {
        self.get_json(
            OBSERVATION_DATASET,
            &[
                ("Authorization", self.api_key.as_str()),
                ("format", "JSON"),
                ("StationId", station_id),
            ],
        )
        .await
    }

    async fn get_json(
        &self,
        dataset: &str,
        params: &[(&str, &str)],
    ) -> Result<serde_json::Value, AppError> {
        let url = format!("{}/{}", self.base_url, dataset);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalServiceError(format!("CWA request to {} failed: {}", dataset, e))
            })?;

        if !response.status().is_success() {
            return Err(AppError::ExternalServiceError(format!(
                "CWA {} returned HTTP {}",
                dataset,
                response.status()
            )));
        }

        response.json().await.map_err(|e| {
            AppError::MalformedResponse(format!("CWA {} JSON parse error: {}", dataset, e))
        })
    }
}
