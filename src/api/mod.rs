//! API Module
//!
//! HTTP handlers and routing for the weather REST API.
//!
//! # Endpoints
//! - `GET /weather` - All weather records
//! - `POST /weather` - Insert new weather records
//! - `GET /weather/monitor-redis` - Cache backend diagnostics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
