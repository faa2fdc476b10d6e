//! Cache
//!
//! Redis es opcional: solo guarda las ventanas de historial del chatbot.

use anyhow::Result;
use serde::{de::DeserializeOwned, Serialize};

pub mod cache_config;
pub mod chat_history_cache;
pub mod redis_client;

pub use cache_config::CacheConfig;
pub use chat_history_cache::ChatHistoryCache;
pub use redis_client::RedisClient;

/// Operaciones básicas de cache con valores JSON
#[async_trait::async_trait]
pub trait CacheOperations: Send + Sync {
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>>;
    async fn set<T: Serialize + Send + Sync>(&self, key: &str, value: &T, ttl: u64) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<()>;
}
