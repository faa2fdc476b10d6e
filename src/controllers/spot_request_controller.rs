//! Controlador del owner
//!
//! Envío de solicitudes de publicación, sus spots publicados y las
//! notificaciones con la decisión del admin.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::api_response::ApiResponse;
use crate::dto::spot_dto::OwnerSpotResponse;
use crate::dto::spot_request_dto::{RequestStatusQuery, SubmitSpotRequest};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::notification::OwnerNotification;
use crate::models::spot_request::{RequestStatus, SpotRequest};
use crate::models::user::UserRole;
use crate::repositories::{NotificationRepository, SpotRepository, SpotRequestRepository};
use crate::state::AppState;
use crate::utils::errors::{forbidden_error, not_found_error, AppResult};

pub struct SpotRequestController {
    spots: Arc<dyn SpotRepository>,
    requests: Arc<dyn SpotRequestRepository>,
    notifications: Arc<dyn NotificationRepository>,
}

impl SpotRequestController {
    pub fn new(state: &AppState) -> Self {
        Self {
            spots: state.repos.spots.clone(),
            requests: state.repos.requests.clone(),
            notifications: state.repos.notifications.clone(),
        }
    }

    pub async fn submit(
        &self,
        owner: &AuthenticatedUser,
        request: SubmitSpotRequest,
    ) -> AppResult<ApiResponse<SpotRequest>> {
        owner.require_role(UserRole::Owner, "submit a spot")?;
        request.validate()?;

        let schedule = match request.schedule.trim() {
            "" => "24h".to_string(),
            other => other.to_string(),
        };

        let spot_request = SpotRequest {
            id: Uuid::new_v4(),
            owner_email: owner.email.clone(),
            owner_name: owner.name.clone(),
            name: request.name.trim().to_string(),
            address: request.address.trim().to_string(),
            zone: request.zone.trim().to_string(),
            latitude: request.latitude,
            longitude: request.longitude,
            hourly_price: request.hourly_price,
            daily_price: request.daily_price,
            monthly_price: request.monthly_price,
            total_spots: request.total_spots,
            schedule,
            features: request
                .features
                .into_iter()
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty())
                .collect(),
            ev_charging: request.ev_charging,
            has_security: request.has_security,
            is_illuminated: request.is_illuminated,
            certificate: request.certificate.trim().to_string(),
            image: request.image.filter(|i| !i.trim().is_empty()),
            status: RequestStatus::Pending,
            rejection_reason: None,
            submitted_at: Utc::now(),
            decided_at: None,
        };

        let saved = self.requests.create(&spot_request).await?;
        info!("📝 Solicitud {} enviada por {}: '{}'", saved.id, saved.owner_email, saved.name);

        Ok(ApiResponse::success_with_message(
            saved,
            "Spot request submitted for review",
        ))
    }

    pub async fn my_requests(
        &self,
        owner: &AuthenticatedUser,
        query: RequestStatusQuery,
    ) -> AppResult<ApiResponse<Vec<SpotRequest>>> {
        owner.require_role(UserRole::Owner, "list spot requests")?;
        let requests = self.requests.list_by_owner(&owner.email, query.status).await?;
        Ok(ApiResponse::success(requests))
    }

    pub async fn my_spots(&self, owner: &AuthenticatedUser) -> AppResult<ApiResponse<Vec<OwnerSpotResponse>>> {
        owner.require_role(UserRole::Owner, "list owned spots")?;
        let spots = self
            .spots
            .list_by_owner(&owner.email)
            .await?
            .into_iter()
            .map(OwnerSpotResponse::from)
            .collect();
        Ok(ApiResponse::success(spots))
    }

    pub async fn notifications(
        &self,
        owner: &AuthenticatedUser,
    ) -> AppResult<ApiResponse<Vec<OwnerNotification>>> {
        owner.require_role(UserRole::Owner, "list notifications")?;
        Ok(ApiResponse::success(self.notifications.list_active(&owner.email).await?))
    }

    pub async fn dismiss(
        &self,
        owner: &AuthenticatedUser,
        id: Uuid,
    ) -> AppResult<ApiResponse<OwnerNotification>> {
        let notification = self
            .notifications
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Notification", &id.to_string()))?;

        if notification.owner_email != owner.email {
            return Err(forbidden_error(
                "dismiss notification",
                "the notification belongs to another owner",
            ));
        }

        let dismissed = self.notifications.dismiss(id).await?;
        info!("🔕 Notificación {} descartada por {}", id, owner.email);
        Ok(ApiResponse::success(dismissed))
    }
}
