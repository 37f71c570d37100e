//! API Routes
//!
//! Configures the Axum router with all weather endpoints.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    create_weather_handler, get_weather_handler, health_handler, monitor_cache_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /weather` - All records, cache-aside
/// - `POST /weather` - Insert a batch, skipping duplicates
/// - `GET /weather/monitor-redis` - Raw cache backend INFO
/// - `GET /health` - Health check endpoint
///
/// The weather routes are also served under `/api/weather`.
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/weather", get(get_weather_handler).post(create_weather_handler))
        .route("/weather/monitor-redis", get(monitor_cache_handler))
        .route("/api/weather", get(get_weather_handler).post(create_weather_handler))
        .route("/api/weather/monitor-redis", get(monitor_cache_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
