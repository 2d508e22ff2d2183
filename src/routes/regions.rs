use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::services::regions::{Region, REGIONS};

/// Response type for GET /api/v1/regions.
#[derive(Debug, Serialize, ToSchema)]
pub struct RegionResponse {
    /// County name, usable as the `county` query parameter
    pub name: String,
    /// CWA township forecast dataset id
    pub location_id: String,
    /// Observation station used for prediction, if any
    pub station_id: Option<String>,
}

impl From<&Region> for RegionResponse {
    fn from(r: &Region) -> Self {
        Self {
            name: r.name.to_string(),
            location_id: r.location_id.to_string(),
            station_id: r.station_id.map(str::to_string),
        }
    }
}

/// List all selectable regions, in display order.
#[utoipa::path(
    get,
    path = "/api/v1/regions",
    tag = "Regions",
    responses(
        (status = 200, description = "All selectable regions", body = Vec<RegionResponse>),
    )
)]
pub async fn list_regions() -> Json<Vec<RegionResponse>> {
    Json(REGIONS.iter().map(RegionResponse::from).collect())
}
