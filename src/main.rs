use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::str::FromStr;
use tokio::signal;
use tracing::{error, info, warn, Level};

use parkly_api::{
    build_app,
    cache::{CacheConfig, RedisClient},
    config::{EnvironmentConfig, StorageBackend},
    controllers::auth_controller::AuthController,
    database::DatabaseConnection,
    repositories::Repositories,
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    let config = EnvironmentConfig::from_env()?;

    // Configurar logging
    let level = Level::from_str(&config.log_level).unwrap_or(Level::INFO);
    tracing_subscriber::fmt().with_max_level(level).init();

    info!("🅿️ PARKLY API");
    info!("================================================");
    info!("🌍 Entorno: {}", config.environment);
    if config.is_production() && config.cors_origins.iter().any(|origin| origin == "*") {
        warn!("⚠️ CORS abierto a cualquier origen en producción, revisa CORS_ORIGINS");
    }
    if config.trust_proxy_headers {
        info!("🔁 Rate limiting por x-forwarded-for (detrás de proxy)");
    }

    let repos = match config.storage_backend {
        StorageBackend::Postgres => {
            let db = DatabaseConnection::new_default().await.map_err(|e| {
                error!("❌ Error conectando a la base de datos: {}", e);
                e
            })?;
            Repositories::postgres(db.pool().clone())
        }
        StorageBackend::Memory => {
            warn!("🧠 Almacenamiento en memoria: los datos se pierden al reiniciar");
            Repositories::in_memory()
        }
    };

    // Redis es opcional: sin él, el chatbot usa solo el historial del cliente
    let redis = match &config.redis_url {
        Some(url) => match RedisClient::new(CacheConfig::new(url.clone())).await {
            Ok(client) => Some(client),
            Err(e) => {
                warn!("⚠️ Redis no disponible, historial de chat sin cache: {}", e);
                None
            }
        },
        None => None,
    };

    let state = AppState::new(config.clone(), repos, redis)?;
    bootstrap_admin(&state).await?;

    let app = build_app(state);

    let addr: SocketAddr = config
        .server_url()
        .parse()
        .with_context(|| format!("Dirección inválida: {}", config.server_url()))?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health, GET /metrics");
    info!("   POST /chat, DELETE /chat/:conversation_id");
    info!("   POST /api/register, POST /api/login, GET /api/me");
    info!("   GET  /api/spots, /api/spots/:id, /api/spots/:id/reviews, /api/zones");
    info!("   POST /api/reservations/quote, POST|GET /api/reservations");
    info!("   PATCH /api/reservations/:id/status, POST /api/reservations/:id/review");
    info!("   POST /api/spots/request, GET /api/owner/{{requests,spots,notifications}}");
    info!("   GET|POST /api/admin/...");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Error del servidor: {}", e);
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Crear la cuenta admin desde `ADMIN_EMAIL` / `ADMIN_PASSWORD`
async fn bootstrap_admin(state: &AppState) -> Result<()> {
    let (Some(email), Some(password)) = (&state.config.admin_email, &state.config.admin_password) else {
        warn!("⚠️ ADMIN_EMAIL/ADMIN_PASSWORD no configurados, no se crea cuenta admin");
        return Ok(());
    };

    let created = AuthController::new(state)
        .bootstrap_admin(&state.config.admin_name, email, password)
        .await
        .map_err(|e| anyhow::anyhow!("No se pudo crear la cuenta admin: {}", e))?;

    if !created {
        info!("🛡️ Cuenta admin {} ya existe", email);
    }
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo escuchar Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo escuchar SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
