//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.
//! Todas las variables tienen un valor por defecto para desarrollo, excepto
//! `JWT_SECRET` en producción.

use anyhow::{anyhow, Context, Result};
use std::env;
use std::str::FromStr;

/// Backend de almacenamiento
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Postgres => "postgres",
            StorageBackend::Memory => "memory",
        }
    }
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(anyhow!("STORAGE_BACKEND desconocido: '{}'", other)),
        }
    }
}

/// Modo del chatbot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatbotMode {
    Keyword,
    Llm,
}

impl FromStr for ChatbotMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "keyword" => Ok(ChatbotMode::Keyword),
            "llm" => Ok(ChatbotMode::Llm),
            other => Err(anyhow!("CHATBOT_MODE desconocido: '{}'", other)),
        }
    }
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub log_level: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub cors_origins: Vec<String>,
    pub rate_limit_requests: u32,
    pub rate_limit_window: u64,
    /// Tomar la IP del cliente de `x-forwarded-for` (solo detrás de un proxy propio)
    pub trust_proxy_headers: bool,
    pub max_concurrent_requests: usize,
    pub storage_backend: StorageBackend,
    pub bcrypt_cost: u32,
    // Cuenta admin inicial
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub admin_name: String,
    // Chatbot
    pub chatbot_mode: ChatbotMode,
    pub openai_api_key: Option<String>,
    pub openai_api_url: String,
    pub openai_model: String,
    pub chat_history_turns: usize,
    // Servicios opcionales
    pub redis_url: Option<String>,
    pub wompi_api_url: Option<String>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            port: 3000,
            host: "0.0.0.0".to_string(),
            log_level: "debug".to_string(),
            jwt_secret: "parkly-dev-secret-change-me".to_string(),
            jwt_expiration: 86_400,
            cors_origins: vec!["*".to_string()],
            rate_limit_requests: 60,
            rate_limit_window: 60,
            trust_proxy_headers: false,
            max_concurrent_requests: 256,
            storage_backend: StorageBackend::Postgres,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            admin_email: None,
            admin_password: None,
            admin_name: "Parkly Admin".to_string(),
            chatbot_mode: ChatbotMode::Keyword,
            openai_api_key: None,
            openai_api_url: "https://api.openai.com/v1/chat/completions".to_string(),
            openai_model: "gpt-4.1-mini".to_string(),
            chat_history_turns: 10,
            redis_url: None,
            wompi_api_url: None,
        }
    }
}

/// Leer una variable opcional, tratando cadenas vacías como ausentes
fn optional(key: &str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Leer y parsear una variable con valor por defecto
fn parsed<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow!("{} inválido ('{}'): {}", key, raw, e)),
        None => Ok(default),
    }
}

impl EnvironmentConfig {
    /// Construir la configuración desde variables de entorno
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let environment = optional("ENVIRONMENT").unwrap_or(defaults.environment);
        let is_production = environment == "production";

        let jwt_secret = match optional("JWT_SECRET") {
            Some(secret) => secret,
            None if is_production => {
                return Err(anyhow!("JWT_SECRET must be set in production"));
            }
            None => defaults.jwt_secret,
        };

        let log_level = optional("LOG_LEVEL").unwrap_or_else(|| {
            if is_production { "info".to_string() } else { defaults.log_level.clone() }
        });

        let storage_backend = match optional("STORAGE_BACKEND") {
            Some(raw) => raw.parse().context("Leyendo STORAGE_BACKEND")?,
            None => defaults.storage_backend,
        };

        let chatbot_mode = match optional("CHATBOT_MODE") {
            Some(raw) => raw.parse().context("Leyendo CHATBOT_MODE")?,
            None => defaults.chatbot_mode,
        };

        let cors_origins = optional("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.cors_origins);

        Ok(Self {
            port: parsed("PORT", defaults.port)?,
            host: optional("HOST").unwrap_or(defaults.host),
            log_level,
            jwt_secret,
            jwt_expiration: parsed("JWT_EXPIRATION", defaults.jwt_expiration)?,
            cors_origins,
            rate_limit_requests: parsed("RATE_LIMIT_REQUESTS", defaults.rate_limit_requests)?,
            rate_limit_window: parsed("RATE_LIMIT_WINDOW", defaults.rate_limit_window)?,
            trust_proxy_headers: parsed("TRUST_PROXY_HEADERS", defaults.trust_proxy_headers)?,
            max_concurrent_requests: parsed("MAX_CONCURRENT_REQUESTS", defaults.max_concurrent_requests)?,
            storage_backend,
            bcrypt_cost: parsed("BCRYPT_COST", defaults.bcrypt_cost)?,
            admin_email: optional("ADMIN_EMAIL"),
            admin_password: optional("ADMIN_PASSWORD"),
            admin_name: optional("ADMIN_NAME").unwrap_or(defaults.admin_name),
            chatbot_mode,
            openai_api_key: optional("OPENAI_API_KEY"),
            openai_api_url: optional("OPENAI_API_URL").unwrap_or(defaults.openai_api_url),
            openai_model: optional("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            chat_history_turns: parsed("CHAT_HISTORY_TURNS", defaults.chat_history_turns)?,
            redis_url: optional("REDIS_URL"),
            wompi_api_url: optional("WOMPI_API_URL"),
            environment,
        })
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la dirección de escucha del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
