use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::chat::ChatMessage;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ChatRequest {
    pub message: Option<String>,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
    /// Id emitido por el servidor en una respuesta anterior
    pub conversation_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    /// Solo presente cuando el historial se guarda en el servidor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<Uuid>,
}
