//! 进程内缓存，按条目记录过期时间；读取时清理该键，写入时清理全部过期条目

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use super::CacheBackend;
use crate::cache::CacheError;

struct Entry {
    data: Vec<u8>,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

#[derive(Clone, Default)]
pub struct InMemoryCache {
    store: Arc<DashMap<String, Entry>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

#[async_trait]
impl CacheBackend for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        if let Some(entry) = self.store.get(key) {
            if !entry.is_expired() {
                return Ok(Some(entry.data.clone()));
            }
        }

        // 读锁已释放，再移除过期条目
        self.store.remove_if(key, |_, entry| entry.is_expired());
        Ok(None)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        self.store.retain(|_, entry| !entry.is_expired());
        self.store.insert(
            key.to_string(),
            Entry {
                data: value,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<(), CacheError> {
        for key in keys {
            self.store.remove(key);
        }
        Ok(())
    }
}
