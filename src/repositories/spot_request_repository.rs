use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::notification_repository::insert_notification;
use super::spot_repository::insert_spot;
use super::{Decision, SpotRequestRepository};
use crate::models::{
    notification::OwnerNotification,
    spot::Spot,
    spot_request::{RequestStatus, SpotRequest},
};
use crate::utils::errors::{not_found_error, AppError, AppResult};

pub struct PgSpotRequestRepository {
    pool: PgPool,
}

impl PgSpotRequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Pasar la solicitud de pending al estado final. Solo una decisión gana.
    async fn decide(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        status: RequestStatus,
        reason: Option<&str>,
    ) -> AppResult<SpotRequest> {
        let decided = sqlx::query_as::<_, SpotRequest>(
            r#"
            UPDATE spot_requests
            SET status = $2, rejection_reason = $3, decided_at = $4
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(reason)
        .bind(Utc::now())
        .fetch_optional(&mut **tx)
        .await?;

        if let Some(request) = decided {
            return Ok(request);
        }

        let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM spot_requests WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut **tx)
            .await?;

        if exists.0 {
            Err(AppError::Conflict(format!("Spot request '{}' was already decided", id)))
        } else {
            Err(not_found_error("Spot request", &id.to_string()))
        }
    }
}

#[async_trait]
impl SpotRequestRepository for PgSpotRequestRepository {
    async fn create(&self, request: &SpotRequest) -> AppResult<SpotRequest> {
        let result = sqlx::query_as::<_, SpotRequest>(
            r#"
            INSERT INTO spot_requests (
                id, owner_email, owner_name, name, address, zone, latitude, longitude,
                hourly_price, daily_price, monthly_price, total_spots, schedule, features,
                ev_charging, has_security, is_illuminated, certificate, image, status,
                rejection_reason, submitted_at, decided_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                    $17, $18, $19, $20, $21, $22, $23)
            RETURNING *
            "#,
        )
        .bind(request.id)
        .bind(&request.owner_email)
        .bind(&request.owner_name)
        .bind(&request.name)
        .bind(&request.address)
        .bind(&request.zone)
        .bind(request.latitude)
        .bind(request.longitude)
        .bind(request.hourly_price)
        .bind(request.daily_price)
        .bind(request.monthly_price)
        .bind(request.total_spots)
        .bind(&request.schedule)
        .bind(&request.features)
        .bind(request.ev_charging)
        .bind(request.has_security)
        .bind(request.is_illuminated)
        .bind(&request.certificate)
        .bind(&request.image)
        .bind(request.status)
        .bind(&request.rejection_reason)
        .bind(request.submitted_at)
        .bind(request.decided_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(result)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<SpotRequest>> {
        let result = sqlx::query_as::<_, SpotRequest>("SELECT * FROM spot_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(result)
    }

    async fn list(&self, status: Option<RequestStatus>) -> AppResult<Vec<SpotRequest>> {
        let result = sqlx::query_as::<_, SpotRequest>(
            r#"
            SELECT * FROM spot_requests
            WHERE ($1::request_status IS NULL OR status = $1)
            ORDER BY submitted_at DESC
            "#,
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(result)
    }

    async fn list_by_owner(
        &self,
        owner_email: &str,
        status: Option<RequestStatus>,
    ) -> AppResult<Vec<SpotRequest>> {
        let result = sqlx::query_as::<_, SpotRequest>(
            r#"
            SELECT * FROM spot_requests
            WHERE owner_email = $1 AND ($2::request_status IS NULL OR status = $2)
            ORDER BY submitted_at DESC
            "#,
        )
        .bind(owner_email)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(result)
    }

    async fn approve(&self, id: Uuid) -> AppResult<Decision> {
        let mut tx = self.pool.begin().await?;

        let request = Self::decide(&mut tx, id, RequestStatus::Approved, None).await?;
        let spot = insert_spot(&mut tx, &Spot::from_request(&request)).await?;
        let notification =
            insert_notification(&mut tx, &OwnerNotification::approved(&request, spot.id)).await?;

        tx.commit().await?;

        Ok(Decision {
            request,
            spot: Some(spot),
            notification,
        })
    }

    async fn reject(&self, id: Uuid, reason: &str) -> AppResult<Decision> {
        let mut tx = self.pool.begin().await?;

        let request = Self::decide(&mut tx, id, RequestStatus::Rejected, Some(reason)).await?;
        let notification =
            insert_notification(&mut tx, &OwnerNotification::rejected(&request, reason)).await?;

        tx.commit().await?;

        Ok(Decision {
            request,
            spot: None,
            notification,
        })
    }
}
