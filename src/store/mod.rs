//! Record Store Module
//!
//! The durable, authoritative home of weather records. The cache layer is
//! only ever an optimisation over what this trait returns.

mod sqlite;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{NewWeatherRecord, WeatherRecord};

pub use sqlite::SqliteStore;

// == Record Store Trait ==
/// Durable storage of weather records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Inserts every record or none of them.
    ///
    /// Returns the stored records with their assigned ids, in input order.
    /// Fails with [`StoreError::Conflict`] if any dedup key is already stored.
    async fn insert_many(
        &self,
        records: Vec<NewWeatherRecord>,
    ) -> Result<Vec<WeatherRecord>, StoreError>;

    /// Returns every stored record in insertion order.
    async fn select_all(&self) -> Result<Vec<WeatherRecord>, StoreError>;

    /// Returns the dedup key of every stored record.
    async fn select_dedup_keys(&self) -> Result<Vec<String>, StoreError>;
}
