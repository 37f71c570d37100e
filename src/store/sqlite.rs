//! SQLite record store
//!
//! One table, one connection behind a mutex. Queries run on the blocking
//! pool so request tasks never block a runtime worker.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::models::{NewWeatherRecord, WeatherRecord};
use crate::store::RecordStore;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS weather (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    city          TEXT    NOT NULL,
    temperature_c INTEGER NOT NULL,
    date          TEXT    NOT NULL,
    dedup_key     TEXT    NOT NULL UNIQUE
);
";

/// SQLite-backed [`RecordStore`].
///
/// The `dedup_key` column carries a unique index, so two writers racing past
/// a stale membership set cannot both store the same observation.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open or create the database file and ensure the schema exists
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        info!("Opening SQLite database at {:?}", path);

        let conn = Connection::open(path)?;
        // WAL lets readers proceed while a batch insert commits
        let mode: String = conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;
        conn.execute_batch("PRAGMA synchronous=NORMAL;")?;
        debug!("SQLite journal mode: {}", mode);

        Self::from_connection(conn)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self, StoreError> {
        debug!("Opening in-memory SQLite database");
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Runs `f` against the connection on the blocking pool.
    async fn with_conn<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|e| StoreError::Unavailable(format!("Lock poisoned: {}", e)))?;
            f(&mut guard)
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("Store worker failed: {}", e)))?
    }

    /// Number of stored records.
    #[cfg(test)]
    pub(crate) async fn count(&self) -> Result<usize, StoreError> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM weather", [], |row| row.get(0))?;
            Ok(count as usize)
        })
        .await
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn insert_many(
        &self,
        records: Vec<NewWeatherRecord>,
    ) -> Result<Vec<WeatherRecord>, StoreError> {
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            let mut stored = Vec::with_capacity(records.len());
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO weather (city, temperature_c, date, dedup_key) VALUES (?1, ?2, ?3, ?4)",
                )?;
                for record in records {
                    let key = record.dedup_key();
                    stmt.execute(params![record.city, record.temperature_c, record.date, key])?;
                    stored.push(WeatherRecord {
                        id: tx.last_insert_rowid(),
                        city: record.city,
                        temperature_c: record.temperature_c,
                        date: record.date,
                    });
                }
            }
            // Dropping an uncommitted transaction rolls it back
            tx.commit()?;
            debug!("Inserted {} weather records", stored.len());
            Ok(stored)
        })
        .await
    }

    async fn select_all(&self) -> Result<Vec<WeatherRecord>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, city, temperature_c, date FROM weather ORDER BY id")?;
            let rows = stmt.query_map([], |row| {
                Ok(WeatherRecord {
                    id: row.get(0)?,
                    city: row.get(1)?,
                    temperature_c: row.get(2)?,
                    date: row.get(3)?,
                })
            })?;
            let records = rows.collect::<Result<Vec<_>, _>>()?;
            Ok(records)
        })
        .await
    }

    async fn select_dedup_keys(&self) -> Result<Vec<String>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT dedup_key FROM weather ORDER BY id")?;
            let keys = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(keys)
        })
        .await
    }
}
