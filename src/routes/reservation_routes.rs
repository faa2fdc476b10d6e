use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::reservation_controller::ReservationController;
use crate::dto::api_response::ApiResponse;
use crate::dto::reservation_dto::{
    CreateReservationRequest, QuoteRequest, QuoteResponse, ReviewRequest, UpdateStatusRequest,
};
use crate::middleware::AuthenticatedUser;
use crate::models::reservation::Reservation;
use crate::models::review::Review;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_reservation_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_reservations).post(create_reservation))
        .route("/quote", post(quote))
        .route("/:id/status", patch(update_status))
        .route("/:id/review", post(review))
}

async fn quote(
    State(state): State<AppState>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<ApiResponse<QuoteResponse>>, AppError> {
    let controller = ReservationController::new(&state);
    let response = controller.quote(request).await?;
    Ok(Json(response))
}

async fn create_reservation(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateReservationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Reservation>>), AppError> {
    let controller = ReservationController::new(&state);
    let response = controller.create(&user, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_reservations(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Vec<Reservation>>>, AppError> {
    let controller = ReservationController::new(&state);
    let response = controller.list_mine(&user).await?;
    Ok(Json(response))
}

async fn update_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<Reservation>>, AppError> {
    let controller = ReservationController::new(&state);
    let response = controller.set_status(&user, id, request).await?;
    Ok(Json(response))
}

async fn review(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<ReviewRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Review>>), AppError> {
    let controller = ReservationController::new(&state);
    let response = controller.review(&user, id, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}
