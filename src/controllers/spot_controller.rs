//! Controlador del catálogo público de spots

use std::sync::Arc;

use uuid::Uuid;

use crate::dto::api_response::ApiResponse;
use crate::dto::spot_dto::{SpotFilters, SpotResponse};
use crate::models::review::Review;
use crate::models::spot::SpotStatus;
use crate::repositories::SpotRepository;
use crate::services::catalog_service;
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppResult};

pub struct SpotController {
    spots: Arc<dyn SpotRepository>,
}

impl SpotController {
    pub fn new(state: &AppState) -> Self {
        Self {
            spots: state.repos.spots.clone(),
        }
    }

    pub async fn list(&self, filters: SpotFilters) -> AppResult<ApiResponse<Vec<SpotResponse>>> {
        let spots = self.spots.list_approved().await?;
        let found: Vec<SpotResponse> = catalog_service::search(spots, &filters)
            .into_iter()
            .map(SpotResponse::from)
            .collect();
        Ok(ApiResponse::success(found))
    }

    /// Solo los spots publicados son visibles en el catálogo
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<ApiResponse<SpotResponse>> {
        let spot = self
            .spots
            .find_by_id(id)
            .await?
            .filter(|spot| spot.status == SpotStatus::Approved)
            .ok_or_else(|| not_found_error("Spot", &id.to_string()))?;
        Ok(ApiResponse::success(SpotResponse::from(spot)))
    }

    pub async fn reviews(&self, id: Uuid) -> AppResult<ApiResponse<Vec<Review>>> {
        if self.spots.find_by_id(id).await?.is_none() {
            return Err(not_found_error("Spot", &id.to_string()));
        }
        Ok(ApiResponse::success(self.spots.reviews(id).await?))
    }

    pub async fn zones(&self) -> AppResult<ApiResponse<Vec<String>>> {
        Ok(ApiResponse::success(self.spots.zones().await?))
    }
}
