//! Redis publisher used to fan events out to other processes
//!
//! Redis is optional: when `REDIS_URL` is not configured, events stay inside
//! the process that produced them.

use anyhow::Result;
use redis::{AsyncCommands, Client};
use tracing::info;

/// Configuration for Redis connection
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis connection URL (e.g., "redis://localhost:6379")
    pub url: String,
}

impl RedisConfig {
    /// Read `REDIS_URL`; `None` when it is unset or empty
    pub fn from_env() -> Option<Self> {
        std::env::var("REDIS_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .map(|url| RedisConfig { url })
    }
}

/// Publishes payloads on Redis channels
#[derive(Clone)]
pub struct RedisPublisher {
    client: Client,
}

impl RedisPublisher {
    /// Create a publisher; no connection is made until first use
    pub fn new(config: &RedisConfig) -> Result<Self> {
        let client = Client::open(config.url.clone())?;
        info!("Redis client initialized with URL: {}", config.url);
        Ok(RedisPublisher { client })
    }

    async fn get_connection(&self) -> Result<redis::aio::MultiplexedConnection> {
        let conn = self.client.get_multiplexed_async_connection().await?;
        Ok(conn)
    }

    /// Publish a payload, returning how many subscribers received it
    pub async fn publish(&self, channel: &str, payload: &str) -> Result<i64> {
        let mut conn = self.get_connection().await?;
        let receivers: i64 = conn.publish(channel, payload).await?;
        Ok(receivers)
    }

    /// Check if Redis is reachable
    pub async fn health_check(&self) -> Result<bool> {
        let mut conn = self.get_connection().await?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(pong == "PONG")
    }
}
