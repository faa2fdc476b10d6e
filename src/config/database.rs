//! Configuración de base de datos
//!
//! Este módulo maneja la conexión y configuración de PostgreSQL con SQLx.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::env;
use std::time::Duration;

/// Configuración de la base de datos
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

impl DatabaseConfig {
    /// Construir la configuración desde el entorno.
    ///
    /// `DATABASE_URL` tiene prioridad; si no existe se arma la URL con
    /// `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD` y `DB_NAME`.
    pub fn from_env() -> Self {
        let url = env::var("DATABASE_URL").unwrap_or_else(|_| {
            let var = |key: &str, default: &str| env::var(key).unwrap_or_else(|_| default.to_string());
            build_url(
                &var("DB_HOST", "localhost"),
                &var("DB_PORT", "5432"),
                &var("DB_USER", "postgres"),
                &var("DB_PASSWORD", "postgres"),
                &var("DB_NAME", "parkly"),
            )
        });

        Self {
            url,
            max_connections: 20,
            min_connections: 2,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(300),
            max_lifetime: Duration::from_secs(3600),
        }
    }

    /// Crear un nuevo pool de conexiones
    pub async fn create_pool(&self) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.connect_timeout)
            .idle_timeout(self.idle_timeout)
            .max_lifetime(self.max_lifetime)
            .connect(&self.url)
            .await
    }
}

fn build_url(host: &str, port: &str, user: &str, password: &str, name: &str) -> String {
    format!("postgres://{}:{}@{}:{}/{}", user, password, host, port, name)
}
