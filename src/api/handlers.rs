//! API Handlers
//!
//! HTTP request handlers for each weather endpoint.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
    Json,
};

use crate::cache::{CacheBackend, CacheKeys};
use crate::config::Config;
use crate::error::{Result, WeatherError};
use crate::models::{HealthResponse, InsertResponse, NewWeatherRecord};
use crate::service::WeatherService;
use crate::store::RecordStore;

/// Response header naming where a read was served from
pub const CACHE_STATUS_HEADER: &str = "x-cache";

/// Application state shared across all handlers.
///
/// Holds the weather service; its backends are shared behind `Arc`s and
/// carry their own synchronisation.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<WeatherService>,
}

impl AppState {
    /// Creates a new AppState around a wired service.
    pub fn new(service: WeatherService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    /// Creates a new AppState from backends and configuration.
    pub fn from_backends(
        cache: Arc<dyn CacheBackend>,
        store: Arc<dyn RecordStore>,
        config: &Config,
    ) -> Self {
        let keys = CacheKeys::with_prefix(&config.cache_key_prefix);
        Self::new(WeatherService::new(cache, store, keys, config.ttl()))
    }
}

/// Handler for GET /weather
///
/// Returns every record, from the cached snapshot when possible.
pub async fn get_weather_handler(State(state): State<AppState>) -> Result<Response> {
    let read = state.service.reader.get_all().await?;

    Ok((
        [(CACHE_STATUS_HEADER, read.status.to_string())],
        Json(read.value),
    )
        .into_response())
}

/// Handler for POST /weather
///
/// Body is a JSON array of candidate records. The body is read raw so an
/// empty or absent body is a plain 400 rather than an extractor rejection.
pub async fn create_weather_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<InsertResponse>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(WeatherError::InvalidInput(
            "No weather data provided.".to_string(),
        ));
    }

    let candidates: Vec<NewWeatherRecord> = serde_json::from_slice(&body)
        .map_err(|e| WeatherError::InvalidInput(format!("Malformed weather data: {}", e)))?;

    let inserted = state.service.writer.insert_new(candidates).await?;

    Ok(Json(InsertResponse::new(inserted)))
}

/// Handler for GET /weather/monitor-redis
///
/// Returns the cache backend's raw INFO text.
pub async fn monitor_cache_handler(State(state): State<AppState>) -> Result<String> {
    state.service.probe.check_cache_health().await
}

/// Handler for GET /health
///
/// Process liveness only; says nothing about the backends.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
