//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use anyhow::{Context, Result};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::cache::{ChatHistoryCache, RedisClient};
use crate::config::environment::{ChatbotMode, EnvironmentConfig, StorageBackend};
use crate::middleware::rate_limit::RateLimitState;
use crate::repositories::Repositories;
use crate::services::{ChatResponder, KeywordResponder, LlmResponder, PaymentService};
use crate::utils::metrics::Metrics;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub repos: Repositories,
    pub metrics: Metrics,
    /// Cupo de login y registro
    pub auth_limiter: RateLimitState,
    /// Cupo del chatbot, independiente del de login
    pub chat_limiter: RateLimitState,
    pub http_client: Client,
    pub chat_history: ChatHistoryCache,
    pub chatbot: Arc<dyn ChatResponder>,
    pub redis: Option<RedisClient>,
}

impl AppState {
    pub fn new(config: EnvironmentConfig, repos: Repositories, redis: Option<RedisClient>) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .context("No se pudo crear el cliente HTTP")?;

        let chatbot: Arc<dyn ChatResponder> = match config.chatbot_mode {
            ChatbotMode::Keyword => Arc::new(KeywordResponder),
            ChatbotMode::Llm => Arc::new(LlmResponder::new(
                http_client.clone(),
                config.openai_api_url.clone(),
                config.openai_api_key.clone(),
                config.openai_model.clone(),
            )),
        };
        info!("🤖 Chatbot en modo {:?}", config.chatbot_mode);

        Ok(Self {
            metrics: Metrics::new().context("No se pudieron registrar las métricas")?,
            auth_limiter: RateLimitState::new(&config),
            chat_limiter: RateLimitState::new(&config),
            chat_history: ChatHistoryCache::new(redis.clone(), config.chat_history_turns),
            http_client,
            chatbot,
            redis,
            repos,
            config,
        })
    }

    /// Estado sobre el almacenamiento en memoria y sin Redis
    pub fn in_memory(mut config: EnvironmentConfig) -> Result<Self> {
        config.storage_backend = StorageBackend::Memory;
        Self::new(config, Repositories::in_memory(), None)
    }

    /// Servicio de pagos con la pasarela configurada
    pub fn payments(&self) -> PaymentService {
        PaymentService::new(self.http_client.clone(), self.config.wompi_api_url.clone())
    }

    /// Reemplazar el chatbot (útil para tests)
    pub fn with_chatbot(mut self, chatbot: Arc<dyn ChatResponder>) -> Self {
        self.chatbot = chatbot;
        self
    }
}
