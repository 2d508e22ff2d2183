//! Forecast normalizer.
//!
//! Reshapes a raw CWA township forecast into short per-element series.
//! The API has shipped the same document with different key casing
//! (`Locations` vs `locations`, `WeatherElement` vs `weatherElement`, ...),
//! so every lookup goes through an ordered alias list.
//!
//! Individual readings that are not numeric (the API uses `"-"` for gaps)
//! become `0.0`. This understates precipitation chance when a reading is
//! missing; it matches how the page has always displayed these values.

use std::collections::BTreeMap;

use chrono::DateTime;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use utoipa::ToSchema;

use crate::helpers::{json_field as field, json_number};

/// Maximum number of time entries kept per element.
pub const MAX_SAMPLES: usize = 6;

/// Element names requested from the township forecast.
pub const FORECAST_ELEMENTS: &[&str] = &[
    "溫度",
    "3小時降雨機率",
    "6小時降雨機率",
    "12小時降雨機率",
    "相對濕度",
];

const RECORDS: &[&str] = &["records", "Records"];
const LOCATIONS: &[&str] = &["Locations", "locations"];
const LOCATION: &[&str] = &["Location", "location"];
const LOCATION_NAME: &[&str] = &["LocationName", "locationName"];
const WEATHER_ELEMENT: &[&str] = &["WeatherElement", "weatherElement"];
const ELEMENT_NAME: &[&str] = &["ElementName", "elementName"];
const TIME: &[&str] = &["Time", "time"];
const TIMESTAMP: &[&str] = &["DataTime", "dataTime", "StartTime", "startTime"];
const ELEMENT_VALUE: &[&str] = &["ElementValue", "elementValue"];

/// Display format for parsed timestamps.
const TIME_LABEL_FORMAT: &str = "%m-%d %H:%M";

/// Errors that abort normalization of a forecast payload.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("missing or invalid field: {0}")]
    MissingField(&'static str),
    #[error("forecast contains no location data")]
    LocationNotFound,
}

/// Canonical weather element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Temperature,
    PrecipitationProbability,
    RelativeHumidity,
}

impl ElementKind {
    /// Map an API element name onto its canonical element.
    ///
    /// All precipitation-probability windows (3h/6h/12h) share one series.
    pub fn from_element_name(name: &str) -> Option<Self> {
        match name {
            "溫度" => Some(Self::Temperature),
            "3小時降雨機率" | "6小時降雨機率" | "12小時降雨機率" => {
                Some(Self::PrecipitationProbability)
            }
            "相對濕度" => Some(Self::RelativeHumidity),
            _ => None,
        }
    }

    /// Human-readable label used on the page.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Temperature => "溫度",
            Self::PrecipitationProbability => "降雨機率",
            Self::RelativeHumidity => "相對濕度",
        }
    }

    /// Unit suffix for display.
    pub fn unit(&self) -> &'static str {
        match self {
            Self::Temperature => "°C",
            Self::PrecipitationProbability | Self::RelativeHumidity => "%",
        }
    }
}

/// One reading of one element at one forecast time.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TimeSample {
    /// `MM-DD HH:MM` when the API timestamp parses, otherwise the raw string
    pub time: String,
    /// Measured or forecast value; non-numeric readings are reported as 0
    pub value: f64,
}

/// Ordered readings for one element, in API order.
pub type ElementSeries = Vec<TimeSample>;

/// A normalized forecast for one location.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedForecast {
    /// `LocationName` of the first location in the payload
    pub location_name: String,
    /// One entry per allowlisted canonical element, possibly empty
    pub elements: BTreeMap<ElementKind, ElementSeries>,
}

impl NormalizedForecast {
    /// Values of one element's series, in order.
    pub fn values(&self, kind: ElementKind) -> Vec<f64> {
        self.elements
            .get(&kind)
            .map(|series| series.iter().map(|s| s.value).collect())
            .unwrap_or_default()
    }
}

fn array_field<'a>(
    obj: &'a Value,
    aliases: &[&str],
    name: &'static str,
) -> Result<&'a Vec<Value>, NormalizeError> {
    field(obj, aliases)
        .and_then(Value::as_array)
        .ok_or(NormalizeError::MissingField(name))
}

/// Normalize a raw township forecast.
///
/// Only elements named in `allowlist` are kept. Every allowlisted element
/// that maps to a canonical element appears in the result, with an empty
/// series if the payload did not contain it.
pub fn normalize_forecast(
    raw: &Value,
    allowlist: &[&str],
) -> Result<NormalizedForecast, NormalizeError> {
    let records = field(raw, RECORDS).ok_or(NormalizeError::MissingField("records"))?;
    let locations = array_field(records, LOCATIONS, "records.Locations")?;
    let county = locations.first().ok_or(NormalizeError::LocationNotFound)?;
    let towns = array_field(county, LOCATION, "Locations[0].Location")?;
    let location = towns.first().ok_or(NormalizeError::LocationNotFound)?;

    let location_name = field(location, LOCATION_NAME)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let weather_elements = array_field(location, WEATHER_ELEMENT, "Location[0].WeatherElement")?;

    let mut elements: BTreeMap<ElementKind, ElementSeries> = allowlist
        .iter()
        .filter_map(|name| ElementKind::from_element_name(name))
        .map(|kind| (kind, Vec::new()))
        .collect();

    for element in weather_elements {
        let Some(name) = field(element, ELEMENT_NAME).and_then(Value::as_str) else {
            continue;
        };
        if !allowlist.contains(&name) {
            continue;
        }
        let Some(kind) = ElementKind::from_element_name(name) else {
            continue;
        };

        let series = field(element, TIME)
            .and_then(Value::as_array)
            .map(|times| parse_time_entries(name, times))
            .unwrap_or_default();

        // Later windows (e.g. 6h after 3h) replace earlier ones.
        elements.insert(kind, series);
    }

    Ok(NormalizedForecast {
        location_name,
        elements,
    })
}

fn parse_time_entries(element_name: &str, times: &[Value]) -> ElementSeries {
    times
        .iter()
        .take(MAX_SAMPLES)
        .filter_map(|entry| {
            let raw_time = TIMESTAMP.iter().find_map(|key| {
                entry
                    .get(*key)
                    .and_then(Value::as_str)
                    .filter(|s| !s.trim().is_empty())
            })?;
            let first_value = field(entry, ELEMENT_VALUE)
                .and_then(Value::as_array)
                .and_then(|values| values.first())?;

            Some(TimeSample {
                time: format_time_label(raw_time),
                value: reading_value(element_name, first_value),
            })
        })
        .collect()
}

/// Take the first value of an `ElementValue` entry, whatever its key.
///
/// Each element nests its reading under a different key (`Temperature`,
/// `ProbabilityOfPrecipitation`, `RelativeHumidity`, ...).
fn reading_value(element_name: &str, element_value: &Value) -> f64 {
    let raw = match element_value {
        Value::Object(map) => map.values().next(),
        other => Some(other),
    };

    match raw.and_then(json_number) {
        Some(v) => v,
        None => {
            tracing::debug!(
                "Non-numeric reading {:?} for {}, using 0",
                raw,
                element_name
            );
            0.0
        }
    }
}

fn format_time_label(raw: &str) -> String {
    DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|dt| dt.format(TIME_LABEL_FORMAT).to_string())
        .unwrap_or_else(|_| raw.to_string())
}
