//! Controlador del chatbot
//!
//! `/chat` siempre responde `{reply}`, también en los errores, porque el
//! widget del front solo pinta ese campo.
//!
//! Los ids de conversación los emite el servidor (UUID v4) y solo cuando el
//! historial se guarda en Redis.

use std::sync::Arc;

use axum::http::StatusCode;
use tracing::{error, info};
use uuid::Uuid;

use crate::cache::ChatHistoryCache;
use crate::dto::api_response::ApiResponse;
use crate::dto::chat_dto::{ChatRequest, ChatResponse};
use crate::models::chat::ChatMessage;
use crate::services::chatbot_service::{
    EMPTY_MESSAGE_REPLY, INVALID_CONVERSATION_REPLY, UPSTREAM_ERROR_REPLY,
};
use crate::services::{ChatOutcome, ChatResponder};
use crate::state::AppState;
use crate::utils::metrics::Metrics;

pub struct ChatController {
    chatbot: Arc<dyn ChatResponder>,
    history: ChatHistoryCache,
    metrics: Metrics,
}

impl ChatController {
    pub fn new(state: &AppState) -> Self {
        Self {
            chatbot: state.chatbot.clone(),
            history: state.chat_history.clone(),
            metrics: state.metrics.clone(),
        }
    }

    pub async fn send(&self, request: ChatRequest) -> (StatusCode, ChatResponse) {
        let message = request
            .message
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string();

        if message.is_empty() {
            return (StatusCode::BAD_REQUEST, reply(EMPTY_MESSAGE_REPLY));
        }

        let requested = request
            .conversation_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty());
        let conversation_id = match requested {
            Some(raw) => match Uuid::parse_str(raw) {
                Ok(id) => Some(id),
                Err(_) => return (StatusCode::BAD_REQUEST, reply(INVALID_CONVERSATION_REPLY)),
            },
            None if self.history.is_enabled() => Some(Uuid::new_v4()),
            None => None,
        };
        let window = self.history.window(conversation_id, request.history).await;

        let outcome = match self.chatbot.respond(&message, &window).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("❌ Error del asistente: {}", e);
                return (StatusCode::BAD_GATEWAY, reply(UPSTREAM_ERROR_REPLY));
            }
        };

        match &outcome {
            ChatOutcome::Answered(_) => self.metrics.chat_answered.inc(),
            ChatOutcome::Refused(_) => self.metrics.chat_refused.inc(),
        }

        let answer = outcome.reply().to_string();
        self.history
            .store(
                conversation_id,
                window,
                [ChatMessage::user(message), ChatMessage::assistant(answer.clone())],
            )
            .await;

        (
            StatusCode::OK,
            ChatResponse {
                reply: answer,
                conversation_id: conversation_id.filter(|_| self.history.is_enabled()),
            },
        )
    }

    pub async fn clear(&self, conversation_id: Uuid) -> ApiResponse<Uuid> {
        self.history.clear(conversation_id).await;
        info!("🧹 Historial de chat {} borrado", conversation_id);
        ApiResponse::success_with_message(conversation_id, "Conversation cleared")
    }
}

fn reply(text: &str) -> ChatResponse {
    ChatResponse {
        reply: text.to_string(),
        conversation_id: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnvironmentConfig;
    use crate::services::chatbot_service::OUT_OF_DOMAIN_REPLY;
    use crate::services::LlmResponder;
    use crate::utils::errors::AppResult;
    use async_trait::async_trait;

    struct EchoResponder;

    #[async_trait]
    impl ChatResponder for EchoResponder {
        async fn respond(&self, message: &str, history: &[ChatMessage]) -> AppResult<ChatOutcome> {
            Ok(ChatOutcome::Answered(format!("{} ({} previos)", message, history.len())))
        }
    }

    fn state() -> AppState {
        AppState::in_memory(EnvironmentConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_empty_message_is_bad_request() {
        let controller = ChatController::new(&state());
        let (status, body) = controller
            .send(ChatRequest {
                message: Some("   ".to_string()),
                ..ChatRequest::default()
            })
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.reply, EMPTY_MESSAGE_REPLY);
    }

    #[tokio::test]
    async fn test_conversation_ids_must_be_server_issued() {
        let state = state().with_chatbot(Arc::new(EchoResponder));
        let controller = ChatController::new(&state);

        let (status, body) = controller
            .send(ChatRequest {
                message: Some("hola".to_string()),
                conversation_id: Some("abc-123".to_string()),
                ..ChatRequest::default()
            })
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.reply, INVALID_CONVERSATION_REPLY);

        // Sin Redis no se emite id
        let (status, body) = controller
            .send(ChatRequest {
                message: Some("hola".to_string()),
                conversation_id: Some(Uuid::new_v4().to_string()),
                ..ChatRequest::default()
            })
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.conversation_id.is_none());
    }

    #[tokio::test]
    async fn test_history_window_reaches_responder() {
        let state = state().with_chatbot(Arc::new(EchoResponder));
        let controller = ChatController::new(&state);
        let (status, body) = controller
            .send(ChatRequest {
                message: Some("hola".to_string()),
                history: vec![ChatMessage::user("a"), ChatMessage::assistant("b")],
                conversation_id: None,
            })
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.reply, "hola (2 previos)");
        assert_eq!(state.metrics.chat_answered.get(), 1);
    }

    #[tokio::test]
    async fn test_llm_mode_refuses_and_fails_upstream() {
        let llm = LlmResponder::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9/v1/chat/completions".to_string(),
            None,
            "test-model".to_string(),
        );
        let state = state().with_chatbot(Arc::new(llm));
        let controller = ChatController::new(&state);

        let (status, body) = controller
            .send(ChatRequest {
                message: Some("¿Cuál es la capital de Francia?".to_string()),
                ..ChatRequest::default()
            })
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.reply, OUT_OF_DOMAIN_REPLY);
        assert_eq!(state.metrics.chat_refused.get(), 1);

        let (status, body) = controller
            .send(ChatRequest {
                message: Some("Quiero cancelar mi reserva".to_string()),
                ..ChatRequest::default()
            })
            .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body.reply, UPSTREAM_ERROR_REPLY);
    }
}
