use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::spot_request_controller::SpotRequestController;
use crate::dto::api_response::ApiResponse;
use crate::dto::spot_dto::OwnerSpotResponse;
use crate::dto::spot_request_dto::{RequestStatusQuery, SubmitSpotRequest};
use crate::middleware::AuthenticatedUser;
use crate::models::notification::OwnerNotification;
use crate::models::spot_request::SpotRequest;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Rutas del owner; se montan bajo `/api`
pub fn create_owner_router() -> Router<AppState> {
    Router::new()
        .route("/spots/request", post(submit_request))
        .route("/owner/requests", get(my_requests))
        .route("/owner/spots", get(my_spots))
        .route("/owner/notifications", get(notifications))
        .route("/owner/notifications/:id/dismiss", post(dismiss_notification))
}

async fn submit_request(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<SubmitSpotRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SpotRequest>>), AppError> {
    let controller = SpotRequestController::new(&state);
    let response = controller.submit(&user, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn my_requests(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<RequestStatusQuery>,
) -> Result<Json<ApiResponse<Vec<SpotRequest>>>, AppError> {
    let controller = SpotRequestController::new(&state);
    let response = controller.my_requests(&user, query).await?;
    Ok(Json(response))
}

async fn my_spots(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Vec<OwnerSpotResponse>>>, AppError> {
    let controller = SpotRequestController::new(&state);
    let response = controller.my_spots(&user).await?;
    Ok(Json(response))
}

async fn notifications(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Vec<OwnerNotification>>>, AppError> {
    let controller = SpotRequestController::new(&state);
    let response = controller.notifications(&user).await?;
    Ok(Json(response))
}

async fn dismiss_notification(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OwnerNotification>>, AppError> {
    let controller = SpotRequestController::new(&state);
    let response = controller.dismiss(&user, id).await?;
    Ok(Json(response))
}
