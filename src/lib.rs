//! Weather Cache - weather records API with a fail-open cache-aside layer
//!
//! Reads are served from a cached snapshot when possible; writes skip
//! records whose `city_YYYYMMDD` key is already stored. The cache backend
//! may disappear at any time without failing either path.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use service::WeatherService;
pub use tasks::spawn_cleanup_task;
