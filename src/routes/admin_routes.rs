use axum::{
    extract::{Path, Query, State},
    middleware::from_fn,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::admin_controller::AdminController;
use crate::dto::admin_dto::{DecisionResponse, SearchQuery};
use crate::dto::api_response::ApiResponse;
use crate::dto::spot_dto::OwnerSpotResponse;
use crate::dto::spot_request_dto::{RejectRequest, RequestStatusQuery};
use crate::middleware::admin_only_middleware;
use crate::models::analytics::{AdminMetrics, AdminSummary};
use crate::models::reservation::Reservation;
use crate::models::spot_request::SpotRequest;
use crate::models::user::UserResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Panel del admin. Requiere que `auth_middleware` ya haya corrido.
pub fn create_admin_router() -> Router<AppState> {
    Router::new()
        .route("/requests", get(list_requests))
        .route("/requests/:id/approve", post(approve_request))
        .route("/requests/:id/reject", post(reject_request))
        .route("/rejection-reasons", get(rejection_reasons))
        .route("/stats", get(stats))
        .route("/metrics", get(metrics))
        .route("/users", get(list_users))
        .route("/spots", get(list_spots))
        .route("/reservations", get(list_reservations))
        .route_layer(from_fn(admin_only_middleware))
}

async fn list_requests(
    State(state): State<AppState>,
    Query(query): Query<RequestStatusQuery>,
) -> Result<Json<ApiResponse<Vec<SpotRequest>>>, AppError> {
    let controller = AdminController::new(&state);
    Ok(Json(controller.list_requests(query).await?))
}

async fn approve_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DecisionResponse>>, AppError> {
    let controller = AdminController::new(&state);
    Ok(Json(controller.approve(id).await?))
}

async fn reject_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<RejectRequest>,
) -> Result<Json<ApiResponse<DecisionResponse>>, AppError> {
    let controller = AdminController::new(&state);
    Ok(Json(controller.reject(id, request).await?))
}

async fn rejection_reasons(State(state): State<AppState>) -> Json<ApiResponse<Vec<&'static str>>> {
    Json(AdminController::new(&state).rejection_reasons())
}

async fn stats(State(state): State<AppState>) -> Result<Json<ApiResponse<AdminSummary>>, AppError> {
    let controller = AdminController::new(&state);
    Ok(Json(controller.stats().await?))
}

async fn metrics(State(state): State<AppState>) -> Result<Json<ApiResponse<AdminMetrics>>, AppError> {
    let controller = AdminController::new(&state);
    Ok(Json(controller.metrics().await?))
}

async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<UserResponse>>>, AppError> {
    let controller = AdminController::new(&state);
    Ok(Json(controller.users(query).await?))
}

async fn list_spots(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<OwnerSpotResponse>>>, AppError> {
    let controller = AdminController::new(&state);
    Ok(Json(controller.spots(query).await?))
}

async fn list_reservations(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<Reservation>>>, AppError> {
    let controller = AdminController::new(&state);
    Ok(Json(controller.reservations(query).await?))
}
