//! Redis Store Module
//!
//! `BackingStore` over a shared Redis instance. Records are plain string
//! values holding the JSON record, readable by any other client of the
//! same keyspace.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::{info, warn};

use crate::cache::{BackingStore, CacheEntry};
use crate::error::Result;

// == Redis Store ==
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    ttl: Option<Duration>,
}

impl RedisStore {
    /// Connects to `url` (`redis://[:password@]host:port/`).
    ///
    /// # Arguments
    /// * `url` - Redis connection URL
    /// * `ttl` - Optional store-side expiration applied with `SET EX`
    pub async fn connect(url: &str, ttl: Option<Duration>) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = client.get_connection_manager().await?;
        info!(
            addr = %client.get_connection_info().addr,
            "Connected to Redis backing store"
        );
        Ok(Self { conn, ttl })
    }

    fn ttl_secs(&self) -> Option<u64> {
        self.ttl
            .map(|ttl| ttl.num_seconds())
            .filter(|secs| *secs > 0)
            .map(|secs| secs as u64)
    }
}

#[async_trait]
impl BackingStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        let mut conn = self.conn.clone();
        let raw = conn
            .get::<_, Option<String>>(key)
            .await
            .inspect_err(|e| warn!(key, error = %e, "Redis GET failed"))?;

        raw.map(|record| CacheEntry::from_record_json(key, &record))
            .transpose()
    }

    async fn set(&self, key: &str, timestamp: DateTime<Utc>, payload: &str) -> Result<()> {
        let record = CacheEntry::new(key, timestamp, payload).to_record_json()?;
        let mut conn = self.conn.clone();

        let written = match self.ttl_secs() {
            Some(secs) => conn.set_ex::<_, _, ()>(key, record, secs).await,
            None => conn.set::<_, _, ()>(key, record).await,
        };
        written.inspect_err(|e| warn!(key, error = %e, "Redis SET failed"))?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
