use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::backend::CacheBackend;
use crate::cache::keys::user_key;
use crate::database::StoreError;
use crate::models::User;

/// 用户读穿透缓存
///
/// 缓存只是加速手段：任何缓存错误（连接失败、超时、数据损坏）都按未命中处理，
/// 不会传递给调用方。
#[derive(Clone)]
pub struct UserCache {
    backend: Arc<dyn CacheBackend>,
    ttl: Duration,
}

impl UserCache {
    pub fn new(backend: Arc<dyn CacheBackend>, ttl: Duration) -> Self {
        Self { backend, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// 先查缓存，未命中时调用 `loader` 回源并写回缓存
    ///
    /// 回源失败（不存在或数据库错误）直接返回，不写缓存。
    pub async fn read_through<F, Fut>(&self, id: i64, loader: F) -> Result<User, StoreError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<User, StoreError>>,
    {
        let key = user_key(id);

        match self.backend.get(&key).await {
            Ok(Some(bytes)) => match serde_json::from_slice::<User>(&bytes) {
                Ok(user) => {
                    tracing::debug!("Get user from cache: {}", key);
                    return Ok(user);
                }
                Err(e) => tracing::warn!("Corrupt cache entry {}: {}", key, e),
            },
            Ok(None) => {}
            Err(e) => tracing::warn!("Cache read failed for {}: {}", key, e),
        }

        let user = loader().await?;

        match serde_json::to_vec(&user) {
            Ok(bytes) => {
                if let Err(e) = self.backend.set(&key, bytes, self.ttl).await {
                    tracing::warn!("Cache write failed for {}: {}", key, e);
                } else {
                    tracing::debug!("Set user to cache: {}", key);
                }
            }
            Err(e) => tracing::warn!("Failed to serialize user {}: {}", id, e),
        }

        Ok(user)
    }

    /// 写操作后删除对应缓存，失败只记录日志。
    ///
    /// 尽力而为：与之并发的 `read_through` 若在写入前已读到旧记录，
    /// 可能在删除之后把旧值写回，该条目会保持过期数据直到 TTL 到期。
    pub async fn invalidate(&self, ids: &[i64]) {
        if ids.is_empty() {
            return;
        }
        let keys: Vec<String> = ids.iter().map(|id| user_key(*id)).collect();
        if let Err(e) = self.backend.delete(&keys).await {
            tracing::warn!("Cache invalidation failed for {:?}: {}", keys, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::cache::{CacheError, InMemoryCache};
    use crate::database::{MemoryUserStore, UserStore};
    use crate::models::NewUser;

    /// 统计回源次数
    struct CountingStore {
        inner: MemoryUserStore,
        lookups: AtomicUsize,
    }

    impl CountingStore {
        fn with_alice() -> Self {
            Self {
                inner: MemoryUserStore::seeded(),
                lookups: AtomicUsize::new(0),
            }
        }

        async fn get(&self, id: i64) -> Result<User, StoreError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.get(id).await
        }

        fn lookups(&self) -> usize {
            self.lookups.load(Ordering::SeqCst)
        }
    }

    /// 所有操作都失败的后端
    struct BrokenCache;

    #[async_trait]
    impl CacheBackend for BrokenCache {
        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
            Err(CacheError::Timeout("get"))
        }

        async fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> Result<(), CacheError> {
            Err(CacheError::Timeout("set"))
        }

        async fn delete(&self, _keys: &[String]) -> Result<(), CacheError> {
            Err(CacheError::Timeout("delete"))
        }
    }

    fn memory_cache() -> (InMemoryCache, UserCache) {
        let backend = InMemoryCache::new();
        let cache = UserCache::new(Arc::new(backend.clone()), Duration::from_secs(300));
        (backend, cache)
    }

    #[tokio::test]
    async fn test_second_read_is_served_from_cache() {
        let store = CountingStore::with_alice();
        let (_, cache) = memory_cache();

        let first = cache.read_through(1, || store.get(1)).await.unwrap();
        assert_eq!(store.lookups(), 1);

        let second = cache.read_through(1, || store.get(1)).await.unwrap();
        assert_eq!(store.lookups(), 1);
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn test_not_found_is_not_cached() {
        let store = CountingStore::with_alice();
        let (backend, cache) = memory_cache();

        for _ in 0..2 {
            let err = cache.read_through(999, || store.get(999)).await.unwrap_err();
            assert!(matches!(err, StoreError::NotFound(999)));
        }
        assert_eq!(store.lookups(), 2);
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_entry_falls_back_to_store() {
        let store = CountingStore::with_alice();
        let (backend, cache) = memory_cache();
        backend
            .set("user:1", b"not json".to_vec(), Duration::from_secs(300))
            .await
            .unwrap();

        let user = cache.read_through(1, || store.get(1)).await.unwrap();
        assert_eq!(user.name, "Alice");
        assert_eq!(store.lookups(), 1);

        // 回源后已用正确数据覆盖
        cache.read_through(1, || store.get(1)).await.unwrap();
        assert_eq!(store.lookups(), 1);
    }

    #[tokio::test]
    async fn test_broken_backend_never_surfaces() {
        let store = CountingStore::with_alice();
        let cache = UserCache::new(Arc::new(BrokenCache), Duration::from_secs(300));

        let user = cache.read_through(1, || store.get(1)).await.unwrap();
        assert_eq!(user.id, 1);
        cache.invalidate(&[1]).await;
    }

    #[tokio::test]
    async fn test_invalidate_forces_reload() {
        let store = CountingStore::with_alice();
        let (_, cache) = memory_cache();

        cache.read_through(1, || store.get(1)).await.unwrap();
        cache.invalidate(&[1]).await;
        cache.read_through(1, || store.get(1)).await.unwrap();

        assert_eq!(store.lookups(), 2);
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let store = CountingStore::with_alice();
        store
            .inner
            .create_many(vec![NewUser {
                name: "Bob".to_string(),
                email: "bob@x.com".to_string(),
            }])
            .await
            .unwrap();
        let cache = UserCache::new(Arc::new(InMemoryCache::new()), Duration::from_millis(10));

        cache.read_through(2, || store.get(2)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        cache.read_through(2, || store.get(2)).await.unwrap();

        assert_eq!(store.lookups(), 2);
    }
}
