use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{delete, post},
    Json, Router,
};

use uuid::Uuid;

use crate::controllers::chat_controller::ChatController;
use crate::dto::api_response::ApiResponse;
use crate::dto::chat_dto::{ChatRequest, ChatResponse};
use crate::middleware::{rate_limit_middleware, RateLimitState};
use crate::state::AppState;

/// Chatbot público, con rate limiting por IP
pub fn create_chat_router(limiter: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/chat", post(send_message))
        .route("/chat/:conversation_id", delete(clear_conversation))
        .route_layer(from_fn_with_state(limiter, rate_limit_middleware))
}

async fn send_message(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> (StatusCode, Json<ChatResponse>) {
    let controller = ChatController::new(&state);
    let (status, response) = controller.send(request).await;
    (status, Json(response))
}

async fn clear_conversation(
    State(state): State<AppState>,
    Path(conversation_id): Path<Uuid>,
) -> Json<ApiResponse<Uuid>> {
    let controller = ChatController::new(&state);
    Json(controller.clear(conversation_id).await)
}
