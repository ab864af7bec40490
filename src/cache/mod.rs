// 缓存模块
// 缓存后端抽象与用户读穿透缓存，缓存失败一律降级为未命中

pub mod backend;
pub mod keys;
pub mod operations;

use thiserror::Error;

pub use backend::{CacheBackend, InMemoryCache, NoopCache, RedisCache};
pub use operations::user::UserCache;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("cache {0} timed out")]
    Timeout(&'static str),

    #[error("cache payload error: {0}")]
    Codec(#[from] serde_json::Error),
}
