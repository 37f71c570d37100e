//! Redis Backend Module
//!
//! Cache backend talking to a Redis server through a lazily established
//! `ConnectionManager`. Every command is bounded by a timeout so a hung
//! server degrades to a cache failure instead of stalling the request.

use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, RedisResult};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::cache::CacheBackend;
use crate::error::CacheError;

// == Redis Backend ==
/// Cache backend backed by a Redis server.
pub struct RedisBackend {
    client: redis::Client,
    /// Established on first use, so startup never depends on Redis
    connection: OnceCell<ConnectionManager>,
    /// Upper bound on each command, connection included
    timeout: Duration,
}

impl RedisBackend {
    // == Constructor ==
    /// Creates a backend for `url` without connecting.
    ///
    /// Fails only when the URL itself is malformed.
    pub fn new(url: &str, timeout: Duration) -> Result<Self, CacheError> {
        let client = redis::Client::open(url)?;
        Ok(Self {
            client,
            connection: OnceCell::new(),
            timeout,
        })
    }

    /// Returns a handle to the shared connection, connecting if needed.
    ///
    /// A failed connect leaves the cell empty so the next call tries again.
    async fn connection(&self) -> Result<ConnectionManager, CacheError> {
        let manager = self
            .connection
            .get_or_try_init(|| async {
                debug!("Connecting to Redis");
                let manager = self
                    .bounded(ConnectionManager::new(self.client.clone()))
                    .await?;
                info!("Redis connection established");
                Ok::<_, CacheError>(manager)
            })
            .await?;
        Ok(manager.clone())
    }

    /// Runs a Redis future under the configured timeout.
    async fn bounded<T, F>(&self, fut: F) -> Result<T, CacheError>
    where
        F: Future<Output = RedisResult<T>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(CacheError::from),
            Err(_) => Err(CacheError::Timeout(self.timeout.as_millis() as u64)),
        }
    }
}

#[async_trait]
impl CacheBackend for RedisBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn = self.connection().await?;
        let value: Option<Vec<u8>> = self.bounded(conn.get(key)).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        // SET EX rejects zero
        let seconds = ttl.as_secs().max(1);
        let _: () = self.bounded(conn.set_ex(key, value, seconds)).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let _: () = self.bounded(conn.del(key)).await?;
        Ok(())
    }

    async fn set_members(&self, key: &str) -> Result<HashSet<String>, CacheError> {
        let mut conn = self.connection().await?;
        let members: HashSet<String> = self.bounded(conn.smembers(key)).await?;
        Ok(members)
    }

    async fn set_add(&self, key: &str, members: &[String]) -> Result<(), CacheError> {
        // SADD with no members is a syntax error
        if members.is_empty() {
            return Ok(());
        }
        let mut conn = self.connection().await?;
        let _: () = self.bounded(conn.sadd(key, members.to_vec())).await?;
        Ok(())
    }

    async fn info(&self) -> Result<String, CacheError> {
        let mut conn = self.connection().await?;
        let info: String = self
            .bounded(redis::cmd("INFO").query_async(&mut conn))
            .await?;
        Ok(info)
    }
}
