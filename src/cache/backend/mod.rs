//! 缓存后端实现

use std::time::Duration;

use async_trait::async_trait;

use super::CacheError;

pub mod memory;
pub mod redis;

pub use self::memory::InMemoryCache;
pub use self::redis::RedisCache;

/// 键值缓存后端
///
/// 所有方法使用 `&self`，实现方自行处理内部可变性。
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// `Ok(None)` 表示未命中
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError>;

    async fn delete(&self, keys: &[String]) -> Result<(), CacheError>;
}

/// 关闭缓存时使用，永远未命中
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCache;

#[async_trait]
impl CacheBackend for NoopCache {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> Result<(), CacheError> {
        Ok(())
    }

    async fn delete(&self, _keys: &[String]) -> Result<(), CacheError> {
        Ok(())
    }
}
