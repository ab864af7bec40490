use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },

    #[error("{0} must be set for the selected backend")]
    Missing(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Postgres,
}

impl FromStr for StoreBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackendKind {
    Memory,
    Redis,
    None,
}

impl FromStr for CacheBackendKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "redis" => Ok(Self::Redis),
            "none" | "off" => Ok(Self::None),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_max_lifetime_secs: u64,
    pub cache_backend: CacheBackendKind,
    pub redis_url: Option<String>,
    pub cache_ttl_secs: u64,
    pub cache_connect_timeout_ms: u64,
    pub cache_io_timeout_ms: u64,
    pub seed_demo_user: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 8080,
            store_backend: StoreBackend::Memory,
            database_url: None,
            db_max_connections: 25,
            db_min_connections: 5,
            db_max_lifetime_secs: 180,
            cache_backend: CacheBackendKind::Memory,
            redis_url: None,
            cache_ttl_secs: 300,
            cache_connect_timeout_ms: 5000,
            cache_io_timeout_ms: 3000,
            seed_demo_user: true,
        }
    }
}

fn parse_var<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => {
            let parsed = value.trim().parse();
            parsed.map_err(|_| ConfigError::Invalid { key, value })
        }
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let defaults = Config::default();
        let config = Config {
            server_host: env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: parse_var("SERVER_PORT", defaults.server_port)?,
            store_backend: parse_var("STORE_BACKEND", defaults.store_backend)?,
            database_url: env::var("DATABASE_URL").ok(),
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            db_min_connections: parse_var("DB_MIN_CONNECTIONS", defaults.db_min_connections)?,
            db_max_lifetime_secs: parse_var("DB_MAX_LIFETIME_SECS", defaults.db_max_lifetime_secs)?,
            cache_backend: parse_var("CACHE_BACKEND", defaults.cache_backend)?,
            redis_url: env::var("REDIS_URL").ok(),
            cache_ttl_secs: parse_var("CACHE_TTL_SECS", defaults.cache_ttl_secs)?,
            cache_connect_timeout_ms: parse_var(
                "CACHE_CONNECT_TIMEOUT_MS",
                defaults.cache_connect_timeout_ms,
            )?,
            cache_io_timeout_ms: parse_var("CACHE_IO_TIMEOUT_MS", defaults.cache_io_timeout_ms)?,
            seed_demo_user: parse_var("SEED_DEMO_USER", defaults.seed_demo_user)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// 检查所选后端所需的连接串是否存在
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store_backend == StoreBackend::Postgres && self.database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }
        if self.cache_backend == CacheBackendKind::Redis && self.redis_url.is_none() {
            return Err(ConfigError::Missing("REDIS_URL"));
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn cache_connect_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_connect_timeout_ms)
    }

    pub fn cache_io_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_io_timeout_ms)
    }
}
