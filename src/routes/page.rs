//! Forecast page.
//!
//! GET /?county=<name> — server-rendered HTML. Without a county the page
//! only shows the selector. Request-fatal errors are returned as plain text.

use askama::Template;
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;

use super::AppState;
use crate::errors::AppError;
use crate::services::normalizer::ElementKind;
use crate::services::prediction::Prediction;
use crate::services::regions::REGIONS;
use crate::services::report::{build_report, WeatherReport};

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub county: Option<String>,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub options: Vec<RegionOption>,
    pub report: Option<ReportView>,
}

pub struct RegionOption {
    pub name: &'static str,
    pub selected: bool,
}

/// Display-ready copy of a `WeatherReport`.
pub struct ReportView {
    pub region: String,
    pub location_name: String,
    pub elements: Vec<ElementView>,
    pub advisories: Vec<String>,
    /// Formatted temperature, `None` when no prediction is available
    pub prediction: Option<String>,
}

pub struct ElementView {
    pub label: &'static str,
    pub rows: Vec<ReadingRow>,
}

pub struct ReadingRow {
    pub time: String,
    pub value: String,
}

impl IndexTemplate {
    pub fn new(selected: Option<&str>, report: Option<&WeatherReport>) -> Self {
        let options = REGIONS
            .iter()
            .map(|r| RegionOption {
                name: r.name,
                selected: Some(r.name) == selected,
            })
            .collect();

        Self {
            options,
            report: report.map(ReportView::from),
        }
    }
}

impl From<&WeatherReport> for ReportView {
    fn from(report: &WeatherReport) -> Self {
        let elements = report
            .elements
            .iter()
            .map(|(kind, series)| ElementView {
                label: kind.label(),
                rows: series
                    .iter()
                    .map(|sample| ReadingRow {
                        time: sample.time.clone(),
                        value: format!("{}{}", format_value(*kind, sample.value), kind.unit()),
                    })
                    .collect(),
            })
            .collect();

        Self {
            region: report.region.clone(),
            location_name: report.location_name.clone(),
            elements,
            advisories: report.advisories.clone(),
            prediction: match report.prediction {
                Prediction::Available { temperature_c } => Some(format!("{:.1}°C", temperature_c)),
                Prediction::Unavailable { .. } => None,
            },
        }
    }
}

/// Render the forecast page.
pub async fn index(State(state): State<AppState>, Query(params): Query<PageQuery>) -> Response {
    let county = params
        .county
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let Some(county) = county else {
        return render(IndexTemplate::new(None, None));
    };

    match build_report(&state, county).await {
        Ok(report) => render(IndexTemplate::new(Some(county), Some(&report))),
        Err(e) => {
            tracing::warn!("Page request for {} failed: {}", county, e);
            (e.status_code(), error_text(county, &e)).into_response()
        }
    }
}

fn render(template: IndexTemplate) -> Response {
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Failed to render page template: {}", e);
            let err = AppError::InternalError(e.to_string());
            (err.status_code(), format!("❌ 錯誤發生：{}", err)).into_response()
        }
    }
}

/// Plain-text message shown when the page cannot be rendered.
pub fn error_text(county: &str, err: &AppError) -> String {
    match err {
        AppError::LocationNotFound(_) => format!("❌ 找不到 {} 對應的鄉鎮天氣資料", county),
        AppError::UnknownRegion(_) => format!("❌ 不支援的縣市：{}", county),
        other => format!("❌ 錯誤發生：{}", other),
    }
}

fn format_value(kind: ElementKind, value: f64) -> String {
    match kind {
        ElementKind::Temperature if value.fract() != 0.0 => format!("{:.1}", value),
        _ => format!("{}", value.round() as i64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::normalizer::TimeSample;
    use crate::services::prediction::UnavailableReason;
    use std::collections::BTreeMap;

    fn render_page(selected: Option<&str>, report: Option<&WeatherReport>) -> String {
        IndexTemplate::new(selected, report).render().unwrap()
    }

    fn report(prediction: Prediction) -> WeatherReport {
        let mut elements = BTreeMap::new();
        elements.insert(
            ElementKind::Temperature,
            vec![TimeSample {
                time: "07-01 12:00".to_string(),
                value: 31.0,
            }],
        );
        elements.insert(ElementKind::PrecipitationProbability, Vec::new());
        WeatherReport {
            region: "臺北市".to_string(),
            location_name: "<中正區>".to_string(),
            elements,
            advisories: vec!["天氣偏熱，外出注意多喝水。".to_string()],
            prediction,
        }
    }

    #[test]
    fn test_render_without_report_has_selector_only() {
        let html = render_page(None, None);
        assert!(html.contains("<option value=\"臺北市\">臺北市</option>"));
        assert!(!html.contains("<section>"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn test_render_marks_selected_region() {
        let html = render_page(Some("高雄市"), None);
        assert!(html.contains("<option value=\"高雄市\" selected>高雄市</option>"));
    }

    #[test]
    fn test_render_report() {
        let html = render_page(
            Some("臺北市"),
            Some(&report(Prediction::Available {
                temperature_c: 30.2,
            })),
        );
        assert!(html.contains("&lt;中正區&gt;"));
        assert!(html.contains("<td>07-01 12:00</td><td>31°C</td>"));
        assert!(html.contains("無資料"));
        assert!(html.contains("<li>天氣偏熱，外出注意多喝水。</li>"));
        assert!(html.contains("30.2°C"));
    }

    #[test]
    fn test_render_unavailable_prediction() {
        let html = render_page(
            Some("臺北市"),
            Some(&report(Prediction::Unavailable {
                reason: UnavailableReason::NoStation,
            })),
        );
        assert!(html.contains("AI 預測暫不可用"));
        // Forecast data still present
        assert!(html.contains("31°C"));
    }

    #[test]
    fn test_error_text() {
        assert_eq!(
            error_text("高雄市", &AppError::LocationNotFound("高雄市".into())),
            "❌ 找不到 高雄市 對應的鄉鎮天氣資料"
        );
        assert!(
            error_text("臺北市", &AppError::ExternalServiceError("timeout".into()))
                .starts_with("❌ 錯誤發生：")
        );
    }

    #[test]
    fn test_render_escapes_upstream_text() {
        let mut r = report(Prediction::Unavailable {
            reason: UnavailableReason::ModelNotLoaded,
        });
        r.advisories = vec!["<script>alert(1)</script>".to_string()];
        let html = render_page(Some("臺北市"), Some(&r));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
