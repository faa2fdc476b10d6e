//! Controlador del admin
//!
//! Decide las solicitudes de publicación y expone los agregados del
//! panel. Los agregados se calculan con lecturas completas en cada llamada.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::dto::admin_dto::{DecisionResponse, SearchQuery};
use crate::dto::api_response::ApiResponse;
use crate::dto::spot_dto::OwnerSpotResponse;
use crate::dto::spot_request_dto::{RejectRequest, RequestStatusQuery};
use crate::models::analytics::{AdminMetrics, AdminSummary};
use crate::models::reservation::Reservation;
use crate::models::spot::Spot;
use crate::models::spot_request::{is_known_rejection_reason, SpotRequest, REJECTION_REASONS};
use crate::models::user::UserResponse;
use crate::repositories::{ReservationRepository, SpotRepository, SpotRequestRepository, UserRepository};
use crate::services::analytics_service;
use crate::state::AppState;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::metrics::Metrics;

pub const MISSING_REASON: &str = "Please select a rejection reason";

pub struct AdminController {
    users: Arc<dyn UserRepository>,
    spots: Arc<dyn SpotRepository>,
    requests: Arc<dyn SpotRequestRepository>,
    reservations: Arc<dyn ReservationRepository>,
    metrics: Metrics,
}

impl AdminController {
    pub fn new(state: &AppState) -> Self {
        Self {
            users: state.repos.users.clone(),
            spots: state.repos.spots.clone(),
            requests: state.repos.requests.clone(),
            reservations: state.repos.reservations.clone(),
            metrics: state.metrics.clone(),
        }
    }

    pub async fn list_requests(&self, query: RequestStatusQuery) -> AppResult<ApiResponse<Vec<SpotRequest>>> {
        Ok(ApiResponse::success(self.requests.list(query.status).await?))
    }

    pub async fn approve(&self, id: Uuid) -> AppResult<ApiResponse<DecisionResponse>> {
        let decision = self.requests.approve(id).await?;
        self.metrics.requests_decided.with_label_values(&["approved"]).inc();

        if let Some(spot) = &decision.spot {
            info!("✅ Solicitud {} aprobada, spot {} publicado", id, spot.id);
        }
        Ok(ApiResponse::success_with_message(
            DecisionResponse::from(decision),
            "Spot request approved",
        ))
    }

    pub async fn reject(&self, id: Uuid, request: RejectRequest) -> AppResult<ApiResponse<DecisionResponse>> {
        let reason = request
            .reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .ok_or_else(|| AppError::BadRequest(MISSING_REASON.to_string()))?;

        if !is_known_rejection_reason(reason) {
            return Err(AppError::BadRequest(format!("Unknown rejection reason '{}'", reason)));
        }

        let decision = self.requests.reject(id, reason).await?;
        self.metrics.requests_decided.with_label_values(&["rejected"]).inc();
        info!("❌ Solicitud {} rechazada: {}", id, reason);

        Ok(ApiResponse::success_with_message(
            DecisionResponse::from(decision),
            "Spot request rejected",
        ))
    }

    pub fn rejection_reasons(&self) -> ApiResponse<Vec<&'static str>> {
        ApiResponse::success(REJECTION_REASONS.to_vec())
    }

    async fn scan(&self) -> AppResult<(Vec<Spot>, Vec<Reservation>, usize)> {
        let (spots, reservations, users) = futures::try_join!(
            self.spots.list_all(None),
            self.reservations.list_all(None),
            self.users.list(None),
        )?;
        Ok((spots, reservations, users.len()))
    }

    pub async fn stats(&self) -> AppResult<ApiResponse<AdminSummary>> {
        let (spots, reservations, total_users) = self.scan().await?;
        Ok(ApiResponse::success(analytics_service::summary(
            &spots,
            &reservations,
            total_users,
        )))
    }

    pub async fn metrics(&self) -> AppResult<ApiResponse<AdminMetrics>> {
        let (spots, reservations, total_users) = self.scan().await?;
        let today = Utc::now().date_naive();
        Ok(ApiResponse::success(analytics_service::metrics(
            &spots,
            &reservations,
            total_users,
            today,
        )))
    }

    pub async fn users(&self, query: SearchQuery) -> AppResult<ApiResponse<Vec<UserResponse>>> {
        let users = self
            .users
            .list(query.term().as_deref())
            .await?
            .into_iter()
            .map(UserResponse::from)
            .collect();
        Ok(ApiResponse::success(users))
    }

    pub async fn spots(&self, query: SearchQuery) -> AppResult<ApiResponse<Vec<OwnerSpotResponse>>> {
        let spots = self
            .spots
            .list_all(query.term().as_deref())
            .await?
            .into_iter()
            .map(OwnerSpotResponse::from)
            .collect();
        Ok(ApiResponse::success(spots))
    }

    pub async fn reservations(&self, query: SearchQuery) -> AppResult<ApiResponse<Vec<Reservation>>> {
        Ok(ApiResponse::success(
            self.reservations.list_all(query.term().as_deref()).await?,
        ))
    }
}
