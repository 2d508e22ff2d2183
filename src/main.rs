// Weather Advisor v0.1
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::path::Path;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod errors;
mod helpers;
mod routes;
mod services;

use config::AppConfig;
use routes::AppState;
use services::cwa::CwaClient;
use services::prediction::PredictionAdapter;

/// Weather Advisor API — OpenAPI specification.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Weather Advisor API",
        version = "0.1.0",
        description = "County weather forecasts from the CWA open-data API. \
            Normalizes temperature, precipitation probability and humidity into \
            short series, derives threshold advisories, and predicts next-hour \
            temperature from the latest station observation when a model is loaded.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Regions", description = "Selectable counties"),
        (name = "Weather", description = "Forecast, advisories and prediction"),
    ),
    paths(
        routes::health::health_check,
        routes::regions::list_regions,
        routes::weather::get_weather,
    ),
    components(
        schemas(
            routes::health::HealthResponse,
            routes::regions::RegionResponse,
            services::report::WeatherReport,
            services::normalizer::TimeSample,
            services::normalizer::ElementKind,
            services::prediction::Prediction,
            services::prediction::UnavailableReason,
            errors::ErrorResponse,
        )
    )
)]
struct ApiDoc;

/// Build the router with all routes and middleware.
fn build_router(state: AppState) -> Router {
    // Read-only service: GET only
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET])
        .allow_headers(Any);

    Router::new()
        .route("/", get(routes::page::index))
        .route("/api/v1/health", get(routes::health::health_check))
        .route("/api/v1/regions", get(routes::regions::list_regions))
        .route("/api/v1/weather", get(routes::weather::get_weather))
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[tokio::main]
async fn main() {
    // A missing .env file is fine; variables may come from the environment.
    let _ = dotenv::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weather_advisor=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();

    let cwa_client = CwaClient::new(&config.cwa_base_url, &config.cwa_api_key)
        .expect("Failed to create CWA client");

    // Loaded once; a missing artifact only disables prediction
    let prediction = PredictionAdapter::from_artifact(Path::new(&config.model_path));

    let app = build_router(AppState {
        cwa_client,
        prediction,
    });

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on {}", addr);
    tracing::info!(
        "Swagger UI available at http://localhost:{}/swagger-ui/",
        config.port
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");
    axum::serve(listener, app)
        .await
        .expect("Server terminated unexpectedly");
}
