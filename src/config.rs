/// Default CWA datastore base URL.
const DEFAULT_CWA_BASE_URL: &str = "https://opendata.cwa.gov.tw/api/v1/rest/datastore";

/// Application configuration, parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// CWA open-data authorization key.
    pub cwa_api_key: String,
    pub cwa_base_url: String,
    /// Path of the JSON temperature model artifact.
    pub model_path: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            cwa_api_key: std::env::var("CWA_API_KEY").expect("CWA_API_KEY must be set"),
            cwa_base_url: std::env::var("CWA_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_CWA_BASE_URL.to_string()),
            model_path: std::env::var("MODEL_PATH")
                .unwrap_or_else(|_| "./weather_model.json".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("PORT must be a valid u16"),
        }
    }
}
