use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::spot_controller::SpotController;
use crate::dto::api_response::ApiResponse;
use crate::dto::spot_dto::{SpotFilters, SpotResponse};
use crate::models::review::Review;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Catálogo público
pub fn create_spot_router() -> Router<AppState> {
    Router::new()
        .route("/spots", get(list_spots))
        .route("/spots/:id", get(get_spot))
        .route("/spots/:id/reviews", get(list_reviews))
        .route("/zones", get(list_zones))
}

async fn list_spots(
    State(state): State<AppState>,
    Query(filters): Query<SpotFilters>,
) -> Result<Json<ApiResponse<Vec<SpotResponse>>>, AppError> {
    let controller = SpotController::new(&state);
    let response = controller.list(filters).await?;
    Ok(Json(response))
}

async fn get_spot(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<SpotResponse>>, AppError> {
    let controller = SpotController::new(&state);
    let response = controller.get_by_id(id).await?;
    Ok(Json(response))
}

async fn list_reviews(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<Review>>>, AppError> {
    let controller = SpotController::new(&state);
    let response = controller.reviews(id).await?;
    Ok(Json(response))
}

async fn list_zones(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<String>>>, AppError> {
    let controller = SpotController::new(&state);
    let response = controller.zones().await?;
    Ok(Json(response))
}
