//! Page-cache invalidation notices.
//!
//! The web tier caches rendered pages; after a profile or resume write we
//! publish the affected path so it re-renders. Notices are sent after the
//! database commit and are best-effort: a failure is logged, never returned.

use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::{debug, warn};

pub const REVALIDATE_CHANNEL: &str = "careerlift:revalidate";

#[async_trait]
pub trait CacheInvalidator: Send + Sync {
    async fn invalidate(&self, path: &str);
}

/// Publishes invalidated paths on a Redis channel.
pub struct RedisInvalidator {
    client: redis::Client,
}

impl RedisInvalidator {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    async fn publish(&self, path: &str) -> redis::RedisResult<i64> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.publish(REVALIDATE_CHANNEL, path).await
    }
}

#[async_trait]
impl CacheInvalidator for RedisInvalidator {
    async fn invalidate(&self, path: &str) {
        match self.publish(path).await {
            Ok(receivers) => debug!("Invalidated {path} ({receivers} subscribers)"),
            Err(e) => warn!("Failed to publish cache invalidation for {path}: {e}"),
        }
    }
}
