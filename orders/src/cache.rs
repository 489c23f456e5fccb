use crate::error::CacheError;
use crate::model::ModelId;
use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tracing::debug;

/// Collection snapshot key. Invalidated by every write.
pub const ORDERS_LIST_KEY: &str = "orders:all";

/// TTL for the collection snapshot.
pub const ORDERS_LIST_TTL_SECS: u64 = 120;

/// TTL for a single-order snapshot. Longer than the list TTL: a
/// single order changes less often than the aggregate list.
pub const ORDER_DETAIL_TTL_SECS: u64 = 300;

pub fn order_key(id: ModelId) -> String {
    format!("order:{id}")
}

/// Key-value cache seam: get / set-with-TTL / delete. Entries are
/// ephemeral derived state, never the source of truth.
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl_secs: u64,
    ) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

/// Redis-backed cache over a multiplexed connection manager, which
/// reconnects on its own after broken connections.
#[derive(Clone)]
pub struct RedisCache {
    manager: ConnectionManager,
}

impl RedisCache {
    pub async fn connect(redis_url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let manager = client.get_connection_manager().await?;
        Ok(Self { manager })
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.manager.clone();
        let value: Option<String> = conn.get(key).await?;
        debug!(key, hit = value.is_some(), "Cache lookup");
        Ok(value)
    }

    async fn set_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl_secs: u64,
    ) -> Result<(), CacheError> {
        let mut conn = self.manager.clone();
        let _: () = conn.set_ex(key, value, ttl_secs).await?;
        debug!(key, ttl_secs, "Cache entry written");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.manager.clone();
        let _: () = conn.del(key).await?;
        debug!(key, "Cache entry invalidated");
        Ok(())
    }
}
