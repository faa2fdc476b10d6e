//! Modelos del chatbot

use serde::{Deserialize, Serialize};

/// Rol de un mensaje en la conversación
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: ChatRole::Assistant, content: content.into() }
    }
}

/// Quedarse con los últimos `max_turns` mensajes
pub fn trim_history(mut history: Vec<ChatMessage>, max_turns: usize) -> Vec<ChatMessage> {
    if history.len() > max_turns {
        history.drain(..history.len() - max_turns);
    }
    history
}
