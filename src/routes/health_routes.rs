use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::{json, Value};

use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_health_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    let redis = match &state.redis {
        Some(client) if client.is_connected().await => "connected",
        Some(_) => "unreachable",
        None => "disabled",
    };

    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "storage": state.config.storage_backend.as_str(),
        "redis": redis,
    }))
}

/// Contadores en formato de exposición de Prometheus
async fn metrics(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let body = state.metrics.render()?;
    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body))
}
