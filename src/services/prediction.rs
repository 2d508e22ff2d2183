//! Next-hour temperature prediction.
//!
//! A regression model trained offline is shipped as a JSON artifact and
//! loaded once at startup. Prediction needs the region's latest station
//! observation; every failure along the way (no model, no station, fetch
//! error, incomplete observation) yields `Prediction::Unavailable` rather
//! than an error, so the forecast page always renders.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use utoipa::ToSchema;

use crate::helpers::{json_field as field, json_number, round_1dp};
use crate::services::cwa::CwaClient;
use crate::services::regions::Region;

/// Feature names understood by `FeatureVector`, in training order.
pub const FEATURE_NAMES: [&str; 5] = [
    "AirPressure",
    "AirTemperature",
    "RelativeHumidity",
    "WindSpeed",
    "Precipitation",
];

const RECORDS: &[&str] = &["records", "Records"];
const STATION: &[&str] = &["Station", "station"];
const WEATHER_ELEMENT: &[&str] = &["WeatherElement", "weatherElement"];
const NOW: &[&str] = &["Now", "now"];

/// Station readings the observation API uses for "no data".
const MISSING_READINGS: [f64; 2] = [-99.0, -999.0];

/// Errors that can occur loading a model artifact.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("IO error reading model artifact: {0}")]
    Io(#[from] std::io::Error),
    #[error("Model artifact is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid model artifact: {0}")]
    Invalid(String),
}

/// The five model inputs taken from a station observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    /// Station pressure (hPa)
    pub air_pressure: f64,
    /// Air temperature (°C)
    pub air_temperature: f64,
    /// Relative humidity (%)
    pub relative_humidity: f64,
    /// Wind speed (m/s)
    pub wind_speed: f64,
    /// Precipitation since midnight (mm)
    pub precipitation: f64,
}

impl FeatureVector {
    /// Value of a feature by its training column name.
    pub fn get(&self, name: &str) -> Option<f64> {
        match name {
            "AirPressure" => Some(self.air_pressure),
            "AirTemperature" => Some(self.air_temperature),
            "RelativeHumidity" => Some(self.relative_humidity),
            "WindSpeed" => Some(self.wind_speed),
            "Precipitation" => Some(self.precipitation),
            _ => None,
        }
    }

    /// Values laid out in the order a model expects.
    pub fn ordered(&self, names: &[String]) -> Option<Vec<f64>> {
        names.iter().map(|n| self.get(n)).collect()
    }

    /// Build a feature vector from a raw observation payload.
    ///
    /// Returns `None` if any feature is missing, non-numeric, or a
    /// "no data" reading.
    pub fn from_observation(raw: &Value) -> Option<Self> {
        let element = field(raw, RECORDS)
            .and_then(|records| field(records, STATION))
            .and_then(Value::as_array)
            .and_then(|stations| stations.first())
            .and_then(|station| field(station, WEATHER_ELEMENT))?;

        let reading = |v: &Value| json_number(v).filter(|n| !MISSING_READINGS.contains(n));
        let number = |name: &str| element.get(name).and_then(reading);

        Some(Self {
            air_pressure: number("AirPressure")?,
            air_temperature: number("AirTemperature")?,
            relative_humidity: number("RelativeHumidity")?,
            wind_speed: number("WindSpeed")?,
            precipitation: field(element, NOW)
                .and_then(|now| now.get("Precipitation"))
                .and_then(reading)?,
        })
    }
}

/// A model that predicts next-hour temperature from ordered features.
pub trait TemperaturePredictor: Send + Sync {
    /// Feature names, in the order `predict` expects them.
    fn feature_names(&self) -> &[String];

    /// Predict a temperature in °C. `None` if the input is unusable.
    fn predict(&self, features: &[f64]) -> Option<f64>;
}

#[derive(Debug, Deserialize)]
struct ModelArtifact {
    model: LinearCoefficients,
    common_cols: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct LinearCoefficients {
    intercept: f64,
    coefficients: Vec<f64>,
}

/// Linear regression exported from the training notebook.
#[derive(Debug, Clone)]
pub struct LinearTemperatureModel {
    intercept: f64,
    coefficients: Vec<f64>,
    feature_names: Vec<String>,
}

impl LinearTemperatureModel {
    /// Parse and validate a model artifact.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let artifact: ModelArtifact = serde_json::from_str(json)?;

        if artifact.common_cols.is_empty() {
            return Err(ModelError::Invalid("no feature columns".to_string()));
        }
        if artifact.model.coefficients.len() != artifact.common_cols.len() {
            return Err(ModelError::Invalid(format!(
                "{} coefficients for {} feature columns",
                artifact.model.coefficients.len(),
                artifact.common_cols.len()
            )));
        }
        if let Some(unknown) = artifact
            .common_cols
            .iter()
            .find(|c| !FEATURE_NAMES.contains(&c.as_str()))
        {
            return Err(ModelError::Invalid(format!("unknown feature column '{}'", unknown)));
        }
        if !artifact.model.intercept.is_finite()
            || artifact.model.coefficients.iter().any(|c| !c.is_finite())
        {
            return Err(ModelError::Invalid("non-finite coefficient".to_string()));
        }

        Ok(Self {
            intercept: artifact.model.intercept,
            coefficients: artifact.model.coefficients,
            feature_names: artifact.common_cols,
        })
    }

    /// Load a model artifact from disk.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

impl TemperaturePredictor for LinearTemperatureModel {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(&self, features: &[f64]) -> Option<f64> {
        if features.len() != self.coefficients.len() {
            return None;
        }
        let y = self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(c, x)| c * x)
                .sum::<f64>();
        y.is_finite().then_some(y)
    }
}

/// Why a prediction could not be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    ModelNotLoaded,
    NoStation,
    ObservationFetchFailed,
    ObservationIncomplete,
    PredictionFailed,
}

/// Outcome of a prediction attempt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Prediction {
    /// Predicted next-hour temperature, rounded to one decimal
    Available { temperature_c: f64 },
    /// No prediction; the page shows the forecast without it
    Unavailable { reason: UnavailableReason },
}

impl Prediction {
    pub fn temperature_c(&self) -> Option<f64> {
        match self {
            Prediction::Available { temperature_c } => Some(*temperature_c),
            Prediction::Unavailable { .. } => None,
        }
    }
}

/// Runs the loaded model (if any) against a region's latest observation.
#[derive(Clone)]
pub struct PredictionAdapter {
    predictor: Option<Arc<dyn TemperaturePredictor>>,
}

impl PredictionAdapter {
    pub fn new(predictor: Option<Arc<dyn TemperaturePredictor>>) -> Self {
        Self { predictor }
    }

    /// Load the model artifact at `path`.
    ///
    /// A missing or invalid artifact disables prediction for the lifetime
    /// of the process; it never prevents startup.
    pub fn from_artifact(path: &Path) -> Self {
        match LinearTemperatureModel::load(path) {
            Ok(model) => {
                tracing::info!(
                    "Loaded temperature model from {} ({} features)",
                    path.display(),
                    model.feature_names().len()
                );
                Self::new(Some(Arc::new(model)))
            }
            Err(e) => {
                tracing::warn!(
                    "Temperature model unavailable ({}): {}",
                    path.display(),
                    e
                );
                Self::new(None)
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.predictor.is_some()
    }

    /// Predict the next-hour temperature for a region.
    pub async fn predict_for_region(&self, client: &CwaClient, region: &Region) -> Prediction {
        let Some(predictor) = self.predictor.as_ref() else {
            return unavailable(UnavailableReason::ModelNotLoaded);
        };
        let Some(station_id) = region.station_id else {
            return unavailable(UnavailableReason::NoStation);
        };

        let observation = match client.fetch_observation(station_id).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Observation fetch for station {} failed: {}", station_id, e);
                return unavailable(UnavailableReason::ObservationFetchFailed);
            }
        };

        let Some(features) = FeatureVector::from_observation(&observation) else {
            tracing::debug!("Observation for station {} is incomplete", station_id);
            return unavailable(UnavailableReason::ObservationIncomplete);
        };

        predict_with(predictor.as_ref(), &features)
    }
}

/// Run a predictor on a feature vector, rounding the result.
pub fn predict_with(predictor: &dyn TemperaturePredictor, features: &FeatureVector) -> Prediction {
    let Some(ordered) = features.ordered(predictor.feature_names()) else {
        return unavailable(UnavailableReason::PredictionFailed);
    };
    match predictor.predict(&ordered) {
        Some(t) => Prediction::Available {
            temperature_c: round_1dp(t),
        },
        None => unavailable(UnavailableReason::PredictionFailed),
    }
}

fn unavailable(reason: UnavailableReason) -> Prediction {
    Prediction::Unavailable { reason }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ARTIFACT: &str = r#"{
        "model": { "intercept": 1.0, "coefficients": [0.0, 1.0, 0.0, -0.5, -0.1] },
        "common_cols": ["AirPressure", "AirTemperature", "RelativeHumidity", "WindSpeed", "Precipitation"]
    }"#;

    /// Returns the same temperature for any input.
    pub(crate) struct FixedPredictor(pub(crate) f64);

    impl TemperaturePredictor for FixedPredictor {
        fn feature_names(&self) -> &[String] {
            &[]
        }

        fn predict(&self, _features: &[f64]) -> Option<f64> {
            Some(self.0)
        }
    }

    fn observation() -> Value {
        json!({
            "success": "true",
            "records": {
                "Station": [{
                    "StationName": "臺北",
                    "StationId": "466920",
                    "WeatherElement": {
                        "AirPressure": 1005.3,
                        "AirTemperature": 29.4,
                        "RelativeHumidity": 72,
                        "WindSpeed": "2.1",
                        "Now": { "Precipitation": 0.5 }
                    }
                }]
            }
        })
    }

    fn region(station_id: Option<&'static str>) -> Region {
        Region {
            name: "測試市",
            location_id: "F-D0047-000",
            station_id,
        }
    }

    #[test]
    fn test_feature_vector_from_observation() {
        let f = FeatureVector::from_observation(&observation()).unwrap();
        assert_eq!(f.air_pressure, 1005.3);
        assert_eq!(f.air_temperature, 29.4);
        assert_eq!(f.relative_humidity, 72.0);
        assert_eq!(f.wind_speed, 2.1);
        assert_eq!(f.precipitation, 0.5);
    }

    #[test]
    fn test_feature_vector_missing_field() {
        let mut raw = observation();
        raw["records"]["Station"][0]["WeatherElement"]
            .as_object_mut()
            .unwrap()
            .remove("WindSpeed");
        assert!(FeatureVector::from_observation(&raw).is_none());

        let mut raw = observation();
        raw["records"]["Station"][0]["WeatherElement"]["Now"]["Precipitation"] = json!("-");
        assert!(FeatureVector::from_observation(&raw).is_none());
    }

    #[test]
    fn test_feature_vector_no_data_readings() {
        let mut raw = observation();
        raw["records"]["Station"][0]["WeatherElement"]["AirPressure"] = json!(-99);
        assert!(FeatureVector::from_observation(&raw).is_none());

        let mut raw = observation();
        raw["records"]["Station"][0]["WeatherElement"]["RelativeHumidity"] = json!("-99.0");
        assert!(FeatureVector::from_observation(&raw).is_none());

        let mut raw = observation();
        raw["records"]["Station"][0]["WeatherElement"]["Now"]["Precipitation"] = json!(-999.0);
        assert!(FeatureVector::from_observation(&raw).is_none());

        // Ordinary negatives are real readings
        let mut raw = observation();
        raw["records"]["Station"][0]["WeatherElement"]["AirTemperature"] = json!(-2.5);
        assert_eq!(
            FeatureVector::from_observation(&raw).unwrap().air_temperature,
            -2.5
        );
    }

    #[tokio::test]
    async fn test_no_data_observation_is_unavailable() {
        let mut raw = observation();
        raw["records"]["Station"][0]["WeatherElement"]["WindSpeed"] = json!(-99);
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(raw))
            .mount(&server)
            .await;

        let client = CwaClient::new(&server.uri(), "key").unwrap();
        let adapter = PredictionAdapter::new(Some(Arc::new(FixedPredictor(25.0))));
        let p = adapter.predict_for_region(&client, &region(Some("466920"))).await;
        assert_eq!(
            p,
            Prediction::Unavailable {
                reason: UnavailableReason::ObservationIncomplete
            }
        );
    }

    #[test]
    fn test_feature_vector_ordering() {
        let f = FeatureVector::from_observation(&observation()).unwrap();
        let names = vec!["WindSpeed".to_string(), "AirTemperature".to_string()];
        assert_eq!(f.ordered(&names), Some(vec![2.1, 29.4]));
        assert_eq!(f.ordered(&["DewPoint".to_string()]), None);
    }

    #[test]
    fn test_linear_model_predicts_and_rounds() {
        let model = LinearTemperatureModel::from_json(ARTIFACT).unwrap();
        let f = FeatureVector::from_observation(&observation()).unwrap();
        // 1.0 + 29.4 - 0.5 * 2.1 - 0.1 * 0.5 = 29.3
        assert_eq!(
            predict_with(&model, &f),
            Prediction::Available {
                temperature_c: 29.3
            }
        );
    }

    #[test]
    fn test_linear_model_rejects_length_mismatch() {
        let json = r#"{
            "model": { "intercept": 0.0, "coefficients": [1.0] },
            "common_cols": ["AirPressure", "AirTemperature"]
        }"#;
        let err = LinearTemperatureModel::from_json(json).unwrap_err();
        assert!(matches!(err, ModelError::Invalid(_)));
    }

    #[test]
    fn test_linear_model_rejects_unknown_feature() {
        let json = r#"{
            "model": { "intercept": 0.0, "coefficients": [1.0] },
            "common_cols": ["DewPoint"]
        }"#;
        let err = LinearTemperatureModel::from_json(json).unwrap_err();
        assert!(err.to_string().contains("DewPoint"));
    }

    #[test]
    fn test_load_missing_artifact_disables_prediction() {
        let adapter = PredictionAdapter::from_artifact(Path::new("/nonexistent/weather_model.json"));
        assert!(!adapter.is_loaded());
    }

    #[test]
    fn test_load_artifact_from_disk() {
        let path = std::env::temp_dir().join(format!("weather_model_{}.json", std::process::id()));
        std::fs::write(&path, ARTIFACT).unwrap();
        let adapter = PredictionAdapter::from_artifact(&path);
        std::fs::remove_file(&path).ok();
        assert!(adapter.is_loaded());
    }

    #[tokio::test]
    async fn test_no_model_is_unavailable() {
        let client = CwaClient::new("http://127.0.0.1:9", "key").unwrap();
        let adapter = PredictionAdapter::new(None);
        let p = adapter.predict_for_region(&client, &region(Some("466920"))).await;
        assert_eq!(
            p,
            Prediction::Unavailable {
                reason: UnavailableReason::ModelNotLoaded
            }
        );
    }

    #[tokio::test]
    async fn test_region_without_station_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(observation()))
            .expect(0)
            .mount(&server)
            .await;

        let client = CwaClient::new(&server.uri(), "key").unwrap();
        let adapter = PredictionAdapter::new(Some(Arc::new(FixedPredictor(25.0))));
        let p = adapter.predict_for_region(&client, &region(None)).await;
        assert_eq!(
            p,
            Prediction::Unavailable {
                reason: UnavailableReason::NoStation
            }
        );
    }

    #[tokio::test]
    async fn test_predict_for_region_with_station() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/O-A0003-001"))
            .and(query_param("StationId", "466920"))
            .respond_with(ResponseTemplate::new(200).set_body_json(observation()))
            .mount(&server)
            .await;

        let client = CwaClient::new(&server.uri(), "key").unwrap();
        let model = LinearTemperatureModel::from_json(ARTIFACT).unwrap();
        let adapter = PredictionAdapter::new(Some(Arc::new(model)));
        let p = adapter.predict_for_region(&client, &region(Some("466920"))).await;
        assert_eq!(p.temperature_c(), Some(29.3));
    }

    #[tokio::test]
    async fn test_observation_fetch_failure_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = CwaClient::new(&server.uri(), "key").unwrap();
        let adapter = PredictionAdapter::new(Some(Arc::new(FixedPredictor(25.0))));
        let p = adapter.predict_for_region(&client, &region(Some("466920"))).await;
        assert_eq!(
            p,
            Prediction::Unavailable {
                reason: UnavailableReason::ObservationFetchFailed
            }
        );
    }

    #[tokio::test]
    async fn test_incomplete_observation_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "records": { "Station": [] } })),
            )
            .mount(&server)
            .await;

        let client = CwaClient::new(&server.uri(), "key").unwrap();
        let adapter = PredictionAdapter::new(Some(Arc::new(FixedPredictor(25.0))));
        let p = adapter.predict_for_region(&client, &region(Some("466920"))).await;
        assert_eq!(
            p,
            Prediction::Unavailable {
                reason: UnavailableReason::ObservationIncomplete
            }
        );
    }

    #[test]
    fn test_stub_predictor_result_is_rounded() {
        let f = FeatureVector::from_observation(&observation()).unwrap();
        assert_eq!(predict_with(&FixedPredictor(24.96), &f).temperature_c(), Some(25.0));
    }
}
