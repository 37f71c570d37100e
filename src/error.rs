//! Error types for the weather service
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Failure talking to the cache backend.
///
/// Reads and writes treat every variant as "cache unavailable" and fall back
/// to the record store.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Backend unreachable or returned a protocol error
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    /// Backend did not answer within the configured timeout
    #[error("Cache timed out after {0}ms")]
    Timeout(u64),
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        CacheError::Unavailable(err.to_string())
    }
}

// == Store Error Enum ==
/// Failure talking to the record store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Store unreachable, query failed, or the worker thread died
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A record with the same dedup key is already stored
    #[error("Duplicate weather record: {0}")]
    Conflict(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, msg)
                if code.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StoreError::Conflict(msg.clone().unwrap_or_else(|| err.to_string()))
            }
            _ => StoreError::Unavailable(err.to_string()),
        }
    }
}

// == Weather Error Enum ==
/// Request-level error returned by the service components and handlers.
#[derive(Error, Debug)]
pub enum WeatherError {
    /// Candidate batch empty, absent, or malformed
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Cache backend unreachable (only surfaced by the availability probe)
    #[error(transparent)]
    CacheUnavailable(#[from] CacheError),

    /// Record store failure
    #[error("{0}")]
    StoreUnavailable(String),

    /// Insert rejected by the store's uniqueness constraint
    #[error("{0}")]
    Conflict(String),
}

impl From<StoreError> for WeatherError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(_) => WeatherError::StoreUnavailable(err.to_string()),
            StoreError::Conflict(_) => WeatherError::Conflict(err.to_string()),
        }
    }
}

/// Client-facing body for store failures; the detail only goes to the log
pub const STORE_UNAVAILABLE_MESSAGE: &str = "Weather data is not available.";

// == IntoResponse Implementation ==
impl IntoResponse for WeatherError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            WeatherError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            WeatherError::CacheUnavailable(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Redis is not available.".to_string(),
            ),
            WeatherError::StoreUnavailable(detail) => {
                error!(error = %detail, "Record store request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    STORE_UNAVAILABLE_MESSAGE.to_string(),
                )
            }
            WeatherError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the weather service.
pub type Result<T> = std::result::Result<T, WeatherError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_conflict_maps_to_conflict() {
        let err: WeatherError = StoreError::Conflict("Paris_20240101".to_string()).into();
        assert!(matches!(err, WeatherError::Conflict(_)));
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_store_unavailable_hides_detail() {
        let err: WeatherError = StoreError::Unavailable("disk I/O error at /var/lib".to_string()).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], STORE_UNAVAILABLE_MESSAGE);
        assert!(!String::from_utf8_lossy(&bytes).contains("/var/lib"));
    }

    #[test]
    fn test_invalid_input_is_bad_request() {
        let err = WeatherError::InvalidInput("No weather data provided.".to_string());
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_cache_unavailable_is_server_error() {
        let err: WeatherError = CacheError::Timeout(500).into();
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
