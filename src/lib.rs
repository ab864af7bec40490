use std::sync::Arc;

use cache::{CacheBackend, InMemoryCache, NoopCache, RedisCache, UserCache};
use config::{CacheBackendKind, Config, StoreBackend};
use database::{MemoryUserStore, PgUserStore, UserStore};
use error::StartupError;

pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod middleware;
pub mod models;
pub mod router;
pub mod routes;

pub use router::create_router;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UserStore>,
    pub cache: UserCache,
}

impl AppState {
    pub fn new(store: Arc<dyn UserStore>, cache: UserCache) -> Self {
        Self { store, cache }
    }

    /// 按配置创建存储与缓存
    pub async fn from_config(config: &Config) -> Result<Self, StartupError> {
        config.validate()?;

        let store: Arc<dyn UserStore> = match config.store_backend {
            StoreBackend::Memory => {
                tracing::info!("Using in-memory user store");
                if config.seed_demo_user {
                    Arc::new(MemoryUserStore::seeded())
                } else {
                    Arc::new(MemoryUserStore::new())
                }
            }
            StoreBackend::Postgres => {
                let url = config.database_url.as_deref().unwrap_or_default();
                Arc::new(PgUserStore::connect(url, config).await?)
            }
        };

        let backend: Arc<dyn CacheBackend> = match config.cache_backend {
            CacheBackendKind::None => Arc::new(NoopCache),
            CacheBackendKind::Memory => Arc::new(InMemoryCache::new()),
            CacheBackendKind::Redis => {
                let url = config.redis_url.as_deref().unwrap_or_default();
                match RedisCache::connect(
                    url,
                    config.cache_connect_timeout(),
                    config.cache_io_timeout(),
                )
                .await
                {
                    Ok(redis) => Arc::new(redis),
                    Err(e) => {
                        // 缓存不可用不影响服务，降级为无缓存
                        tracing::warn!("Redis unavailable, cache disabled: {}", e);
                        Arc::new(NoopCache)
                    }
                }
            }
        };

        Ok(Self::new(store, UserCache::new(backend, config.cache_ttl())))
    }
}
