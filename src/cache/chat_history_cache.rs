//! Historial de conversaciones del chatbot
//!
//! Sin Redis configurado el historial es solo el que envía el cliente.

use tracing::warn;
use uuid::Uuid;

use super::{redis_client::RedisClient, CacheOperations};
use crate::models::chat::{trim_history, ChatMessage};

#[derive(Clone)]
pub struct ChatHistoryCache {
    redis: Option<RedisClient>,
    max_turns: usize,
}

impl ChatHistoryCache {
    pub fn new(redis: Option<RedisClient>, max_turns: usize) -> Self {
        Self { redis, max_turns }
    }

    /// El historial se guarda en Redis entre peticiones
    pub fn is_enabled(&self) -> bool {
        self.redis.is_some()
    }

    /// Ventana de historial para la petición actual
    pub async fn window(
        &self,
        conversation_id: Option<Uuid>,
        client_history: Vec<ChatMessage>,
    ) -> Vec<ChatMessage> {
        let stored = match (&self.redis, conversation_id) {
            (Some(redis), Some(id)) => redis
                .get::<Vec<ChatMessage>>(&redis.chat_key(&id.to_string()))
                .await
                .unwrap_or_else(|e| {
                    warn!("⚠️ No se pudo leer el historial {}: {}", id, e);
                    None
                }),
            _ => None,
        };

        // Si el cliente envía historial, ese manda
        let history = if client_history.is_empty() {
            stored.unwrap_or_default()
        } else {
            client_history
        };
        trim_history(history, self.max_turns)
    }

    /// Guardar la ventana con el último intercambio añadido
    pub async fn store(&self, conversation_id: Option<Uuid>, mut history: Vec<ChatMessage>, exchange: [ChatMessage; 2]) {
        let (Some(redis), Some(id)) = (&self.redis, conversation_id) else {
            return;
        };

        history.extend(exchange);
        let history = trim_history(history, self.max_turns);

        if let Err(e) = redis.set(&redis.chat_key(&id.to_string()), &history, redis.default_ttl()).await {
            warn!("⚠️ No se pudo guardar el historial {}: {}", id, e);
        }
    }

    /// Borrar el historial guardado de una conversación
    pub async fn clear(&self, conversation_id: Uuid) {
        if let Some(redis) = &self.redis {
            if let Err(e) = redis.delete(&redis.chat_key(&conversation_id.to_string())).await {
                warn!("⚠️ No se pudo borrar el historial {}: {}", conversation_id, e);
            }
        }
    }
}
