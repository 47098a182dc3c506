//! HTTP boundary: routes, error-to-status mapping, CORS and static files.

use std::{net::SocketAddr, path::Path};

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{info, warn};
use weather_core::{ErrorKind, WeatherEnvelope, WeatherError, WeatherService};

#[derive(Debug, Deserialize)]
struct CoordinatesQuery {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct CityRequest {
    city: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

/// A request failure on its way out to the client. Always rendered as a JSON `ErrorBody`.
enum ApiError {
    /// The lookup itself failed.
    Lookup(WeatherError),
    /// The request could not be decoded into its parameters.
    Rejected { error: &'static str, message: String },
}

impl From<WeatherError> for ApiError {
    fn from(err: WeatherError) -> Self {
        Self::Lookup(err)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Rejected { error: "invalid_coordinates", message: rejection.body_text() }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Rejected { error: "invalid_request", message: rejection.body_text() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = match self {
            ApiError::Lookup(err) => err,
            ApiError::Rejected { error, message } => {
                let body = ErrorBody { error, message };
                return (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response();
            }
        };

        let (status, error) = match err.kind() {
            ErrorKind::InvalidCoordinates => {
                (StatusCode::UNPROCESSABLE_ENTITY, "invalid_coordinates")
            }
            ErrorKind::LocationNotFound => (StatusCode::NOT_FOUND, "location_not_found"),
            ErrorKind::Provider => (StatusCode::SERVICE_UNAVAILABLE, "weather_api_error"),
        };
        if status.is_server_error() {
            warn!(error = %err, "lookup failed");
        }

        let body = ErrorBody { error, message: err.to_string() };
        (status, Json(body)).into_response()
    }
}

/// Build the application router around `service`.
pub fn router(
    service: WeatherService,
    cors_origins: &[String],
    static_dir: Option<&Path>,
) -> Router {
    let api = Router::new()
        .route("/weather/current", get(current_weather))
        .route("/weather/by-city", post(weather_by_city))
        .route("/location/detect", get(detect_location));

    let mut app = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api/v1", api);

    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Bind `addr` and serve `app` until Ctrl-C.
pub async fn run(addr: SocketAddr, app: Router) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Weather dashboard API running at http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| {
            // A wildcard cannot be listed alongside credentials.
            if o.trim() == "*" {
                warn!("ignoring wildcard CORS origin; list origins explicitly");
                return None;
            }
            match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!(origin = %o, "ignoring invalid CORS origin");
                    None
                }
            }
        })
        .collect();

    // Credentials cannot be combined with wildcards, so methods and headers are mirrored.
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({"message": "Weather Dashboard API", "status": "running"}))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({"status": "healthy"}))
}

async fn current_weather(
    State(service): State<WeatherService>,
    query: Result<Query<CoordinatesQuery>, QueryRejection>,
) -> Result<Json<WeatherEnvelope>, ApiError> {
    let Query(q) = query?;
    let record = service.get_weather_by_coordinates(q.lat, q.lon).await?;
    Ok(Json(WeatherEnvelope::new(record)))
}

async fn weather_by_city(
    State(service): State<WeatherService>,
    payload: Result<Json<CityRequest>, JsonRejection>,
) -> Result<Json<WeatherEnvelope>, ApiError> {
    let Json(req) = payload?;
    let record = service.get_weather_by_city(&req.city).await?;
    Ok(Json(WeatherEnvelope::new(record)))
}

async fn detect_location() -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::NOT_IMPLEMENTED,
        Json(ErrorBody {
            error: "not_implemented",
            message: "Location detection not yet implemented. Use coordinates or city name."
                .to_string(),
        }),
    )
}
