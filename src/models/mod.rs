//! Weather record types and HTTP DTOs
//!
//! This module defines the stored record, the incoming candidate, and the
//! serialized response bodies.

pub mod candidate;
pub mod record;
pub mod responses;

// Re-export commonly used types
pub use candidate::NewWeatherRecord;
pub use record::{dedup_key, WeatherRecord};
pub use responses::{ErrorResponse, HealthResponse, InsertResponse};
