//! Chatbot de soporte
//!
//! Dos modos intercambiables detrás de `ChatResponder`:
//! - `KeywordResponder`: tabla estática de palabras clave, gana la primera
//!   entrada que coincide.
//! - `LlmResponder`: clasifica la intención con expresiones regulares y solo
//!   consulta el modelo si el mensaje es del dominio de Parkly.

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::models::chat::ChatMessage;
use crate::utils::errors::{AppError, AppResult};

pub const EMPTY_MESSAGE_REPLY: &str = "Debes enviar un mensaje.";
pub const OUT_OF_DOMAIN_REPLY: &str =
    "Este asistente solo responde consultas relacionadas con la aplicación Parkly.";
pub const UPSTREAM_ERROR_REPLY: &str = "Error al conectar con el asistente.";
pub const INVALID_CONVERSATION_REPLY: &str = "La conversación no es válida.";
const EMPTY_COMPLETION_REPLY: &str = "No se pudo generar respuesta.";

pub const DEFAULT_KEYWORD_REPLY: &str = "🤖 I'm not sure about that yet. A human agent will follow up shortly. Is there anything else I can help you with?";

const SYSTEM_PROMPT: &str = "Eres el asistente oficial de Parkly.

Solo puedes hablar sobre:
1. Reservas de parqueadero
2. Pagos dentro de la aplicación
3. Soporte técnico y uso de la plataforma

Está estrictamente prohibido responder temas externos como recetas, historia, tareas, programación externa, cultura general u otros.

Si el usuario intenta salir del contexto, debes rechazarlo.
Responde de forma clara y profesional.";

/// Entrada de la base de conocimiento: palabras clave en minúsculas y respuesta HTML
struct KnowledgeEntry {
    keywords: &'static [&'static str],
    reply: &'static str,
}

const KNOWLEDGE_BASE: &[KnowledgeEntry] = &[
    KnowledgeEntry {
        keywords: &["find", "spot", "available", "parking", "buscar", "disponible", "parqueadero"],
        reply: "🅿️ Use the <strong>search bar</strong> at the top or activate the <strong>\"Available\"</strong> filter to see free spots near you in real time.",
    },
    KnowledgeEntry {
        keywords: &["reserve", "book", "reservar", "apartar", "how"],
        reply: "📋 Easy! Find a spot → click <strong>\"Reserve\"</strong> → choose your date & time → confirm. You'll receive a confirmation right away.",
    },
    KnowledgeEntry {
        keywords: &["ev", "electric", "charging", "carga", "eléctrico", "cargador"],
        reply: "⚡ We have <strong>14 EV charging stations</strong> in Bogotá and <strong>6 in Medellín</strong>. Use the <strong>⚡ EV Charging</strong> filter to locate them.",
    },
    KnowledgeEntry {
        keywords: &["price", "cost", "pricing", "rate", "precio", "costo", "tarifa", "valor"],
        reply: "💳 Rates start at <strong>$3,500 COP/hr</strong>. Monthly plans from <strong>$180,000 COP</strong>. Check each spot card for exact pricing.",
    },
    KnowledgeEntry {
        keywords: &["security", "safe", "secure", "seguro", "seguridad", "camara", "camera"],
        reply: "🔒 All <strong>verified spots</strong> include 24/7 CCTV and on-site security. Look for the <strong>🛡 Verified</strong> badge when searching.",
    },
    KnowledgeEntry {
        keywords: &["24h", "24 hour", "24 horas", "overnight", "all night", "toda la noche"],
        reply: "🕐 Many spots operate <strong>24 hours</strong>. Use the <strong>\"24 Hours\"</strong> filter to show only those locations.",
    },
    KnowledgeEntry {
        keywords: &["cancel", "cancelar", "refund", "reembolso", "devolucion", "devolución"],
        reply: "↩️ Cancellations made <strong>more than 2 hours before</strong> your reservation are fully refunded. Contact support for exceptions.",
    },
    KnowledgeEntry {
        keywords: &["contact", "human", "agent", "support", "help", "ayuda", "soporte", "contacto", "persona"],
        reply: "🙋 A human agent will reach you shortly! You can also email us at <strong>support@parkly.co</strong> or call <strong>+57 601 123 4567</strong>.",
    },
    KnowledgeEntry {
        keywords: &["bogota", "bogotá", "medellin", "medellín", "city", "ciudad", "location", "ubicación"],
        reply: "📍 PARKLY currently operates in <strong>Bogotá</strong> and <strong>Medellín</strong>. More cities coming soon!",
    },
    KnowledgeEntry {
        keywords: &["illuminated", "iluminado", "luz", "light", "bright"],
        reply: "💡 Filter by <strong>\"Illuminated\"</strong> to find well-lit spots, ideal for night parking.",
    },
    KnowledgeEntry {
        keywords: &["hello", "hi", "hey", "hola", "buenos", "buenas", "buen dia"],
        reply: "👋 Hey there! How can I help you with your parking today?",
    },
    KnowledgeEntry {
        keywords: &["thanks", "thank", "gracias", "ok", "perfect", "perfecto", "great", "genial"],
        reply: "😊 You're welcome! Let me know if there's anything else I can help you with.",
    },
];

/// Categorías de consulta que el asistente acepta
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Reservas,
    Pagos,
    Asistencia,
}

lazy_static! {
    static ref INTENT_PATTERNS: Vec<(Intent, Regex)> = vec![
        (
            Intent::Reservas,
            Regex::new(r"(?i)reserva|disponibilidad|espacio|horario|buscar parqueadero|estacionamiento")
                .expect("patrón de reservas válido"),
        ),
        (
            Intent::Pagos,
            Regex::new(r"(?i)pago|pagar|tarjeta|m[eé]todo de pago|cancelar reserva|factura|precio")
                .expect("patrón de pagos válido"),
        ),
        (
            Intent::Asistencia,
            Regex::new(r"(?i)ayuda|soporte|problema|error|no funciona|asistencia|c[oó]mo usar|configuraci[oó]n|cuenta")
                .expect("patrón de asistencia válido"),
        ),
    ];
}

/// Clasificar un mensaje; `None` si está fuera del dominio
pub fn classify(message: &str) -> Option<Intent> {
    INTENT_PATTERNS
        .iter()
        .find(|(_, pattern)| pattern.is_match(message))
        .map(|(intent, _)| *intent)
}

/// Respuesta del chatbot y si fue un rechazo por dominio
#[derive(Debug, Clone, PartialEq)]
pub enum ChatOutcome {
    Answered(String),
    Refused(String),
}

impl ChatOutcome {
    pub fn reply(&self) -> &str {
        match self {
            ChatOutcome::Answered(reply) | ChatOutcome::Refused(reply) => reply,
        }
    }
}

#[async_trait]
pub trait ChatResponder: Send + Sync {
    async fn respond(&self, message: &str, history: &[ChatMessage]) -> AppResult<ChatOutcome>;
}

pub struct KeywordResponder;

impl KeywordResponder {
    pub fn find_reply(message: &str) -> &'static str {
        let normalized = message.to_lowercase();
        KNOWLEDGE_BASE
            .iter()
            .find(|entry| entry.keywords.iter().any(|kw| normalized.contains(kw)))
            .map(|entry| entry.reply)
            .unwrap_or(DEFAULT_KEYWORD_REPLY)
    }
}

#[async_trait]
impl ChatResponder for KeywordResponder {
    async fn respond(&self, message: &str, _history: &[ChatMessage]) -> AppResult<ChatOutcome> {
        Ok(ChatOutcome::Answered(Self::find_reply(message).to_string()))
    }
}

#[derive(Debug, Serialize)]
struct CompletionMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionChoiceMessage {
    content: Option<String>,
}

/// Proxy a un endpoint de chat-completions compatible con OpenAI
pub struct LlmResponder {
    client: Client,
    api_url: String,
    api_key: Option<String>,
    model: String,
}

impl LlmResponder {
    pub fn new(client: Client, api_url: String, api_key: Option<String>, model: String) -> Self {
        Self { client, api_url, api_key, model }
    }

    async fn complete(&self, message: &str, history: &[ChatMessage]) -> AppResult<String> {
        let mut messages = vec![CompletionMessage { role: "system", content: SYSTEM_PROMPT }];
        messages.extend(history.iter().map(|m| CompletionMessage {
            role: m.role.as_str(),
            content: &m.content,
        }));
        messages.push(CompletionMessage { role: "user", content: message });

        let body = json!({
            "model": self.model,
            "temperature": 0,
            "messages": messages,
        });

        let mut request = self.client.post(&self.api_url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::ExternalApi(format!("Error llamando al modelo: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::ExternalApi(format!("El modelo respondió {}", status)));
        }

        let completion = response
            .json::<CompletionResponse>()
            .await
            .map_err(|e| AppError::ExternalApi(format!("Respuesta inválida del modelo: {}", e)))?;

        Ok(completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .unwrap_or_else(|| EMPTY_COMPLETION_REPLY.to_string()))
    }
}

#[async_trait]
impl ChatResponder for LlmResponder {
    async fn respond(&self, message: &str, history: &[ChatMessage]) -> AppResult<ChatOutcome> {
        let Some(intent) = classify(message) else {
            info!("🔒 Mensaje fuera de dominio rechazado");
            return Ok(ChatOutcome::Refused(OUT_OF_DOMAIN_REPLY.to_string()));
        };

        debug!("🤖 Intención {:?}, consultando modelo {}", intent, self.model);
        self.complete(message, history).await.map(ChatOutcome::Answered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_categories() {
        assert_eq!(classify("Quiero hacer una RESERVA mañana"), Some(Intent::Reservas));
        assert_eq!(classify("¿Puedo pagar con tarjeta?"), Some(Intent::Pagos));
        assert_eq!(classify("La app no funciona"), Some(Intent::Asistencia));
        assert_eq!(classify("Cómo usar la plataforma"), Some(Intent::Asistencia));
        assert_eq!(classify("Dame una receta de arepas"), None);
    }

    #[test]
    fn test_keyword_first_match_wins() {
        // "parking" (entrada 1) aparece antes que "price" (entrada 4)
        let reply = KeywordResponder::find_reply("What is the parking PRICE?");
        assert!(reply.starts_with("🅿️"));

        let reply = KeywordResponder::find_reply("do you have electric chargers");
        assert!(reply.starts_with("⚡"));
    }

    #[test]
    fn test_keyword_default_reply() {
        assert_eq!(KeywordResponder::find_reply("¿qué tal el clima?"), DEFAULT_KEYWORD_REPLY);
    }

    #[tokio::test]
    async fn test_llm_refuses_out_of_domain_without_calling_upstream() {
        // URL inválida: si se llamara al modelo, fallaría
        let responder = LlmResponder::new(
            Client::new(),
            "http://127.0.0.1:9/v1/chat/completions".to_string(),
            None,
            "test-model".to_string(),
        );
        let outcome = responder.respond("¿Quién ganó el mundial?", &[]).await.unwrap();
        assert_eq!(outcome, ChatOutcome::Refused(OUT_OF_DOMAIN_REPLY.to_string()));
    }

    #[tokio::test]
    async fn test_llm_upstream_failure_is_external_api_error() {
        let responder = LlmResponder::new(
            Client::new(),
            "http://127.0.0.1:9/v1/chat/completions".to_string(),
            None,
            "test-model".to_string(),
        );
        let err = responder.respond("Necesito ayuda con mi reserva", &[]).await.unwrap_err();
        assert!(matches!(err, AppError::ExternalApi(_)));
    }
}
