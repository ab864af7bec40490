//! Redis 缓存后端，所有网络调用都有超时上限

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;

use super::CacheBackend;
use crate::cache::CacheError;

#[derive(Clone)]
pub struct RedisCache {
    conn: MultiplexedConnection,
    io_timeout: Duration,
}

impl RedisCache {
    /// 建立多路复用连接；连接本身受 `connect_timeout` 限制
    pub async fn connect(
        redis_url: &str,
        connect_timeout: Duration,
        io_timeout: Duration,
    ) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let conn = tokio::time::timeout(connect_timeout, client.get_multiplexed_async_connection())
            .await
            .map_err(|_| CacheError::Timeout("connect"))??;

        tracing::info!("Redis cache connected: {}", redis_url);
        Ok(Self { conn, io_timeout })
    }

    async fn bounded<T, F>(&self, op: &'static str, fut: F) -> Result<T, CacheError>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        tokio::time::timeout(self.io_timeout, fut)
            .await
            .map_err(|_| CacheError::Timeout(op))?
            .map_err(CacheError::from)
    }
}

#[async_trait]
impl CacheBackend for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn = self.conn.clone();
        self.bounded("get", conn.get(key)).await
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        self.bounded("set", conn.set_ex(key, value, ttl.as_secs().max(1)))
            .await
    }

    async fn delete(&self, keys: &[String]) -> Result<(), CacheError> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut conn = self.conn.clone();
        self.bounded("delete", conn.del(keys.to_vec())).await
    }
}
