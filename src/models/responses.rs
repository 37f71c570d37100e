//! Response DTOs for the weather API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

/// Response body for a write batch (POST /weather)
#[derive(Debug, Clone, Serialize)]
pub struct InsertResponse {
    /// Human readable outcome
    pub message: String,
    /// Number of records actually stored
    pub inserted: usize,
}

impl InsertResponse {
    /// Creates a new InsertResponse for the given inserted count
    pub fn new(inserted: usize) -> Self {
        let message = if inserted == 0 {
            "No new records to insert.".to_string()
        } else {
            format!("{} new records inserted.", inserted)
        };
        Self { message, inserted }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
