use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::NotificationRepository;
use crate::models::notification::OwnerNotification;
use crate::utils::errors::{not_found_error, AppResult};

pub struct PgNotificationRepository {
    pool: PgPool,
}

impl PgNotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Insertar una notificación dentro de una transacción abierta
pub(crate) async fn insert_notification(
    tx: &mut Transaction<'_, Postgres>,
    notification: &OwnerNotification,
) -> AppResult<OwnerNotification> {
    let result = sqlx::query_as::<_, OwnerNotification>(
        r#"
        INSERT INTO owner_notifications (
            id, owner_email, request_id, spot_id, spot_name, kind, message, reason, dismissed, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(notification.id)
    .bind(&notification.owner_email)
    .bind(notification.request_id)
    .bind(notification.spot_id)
    .bind(&notification.spot_name)
    .bind(notification.kind)
    .bind(&notification.message)
    .bind(&notification.reason)
    .bind(notification.dismissed)
    .bind(notification.created_at)
    .fetch_one(&mut **tx)
    .await?;

    Ok(result)
}

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<OwnerNotification>> {
        let result = sqlx::query_as::<_, OwnerNotification>(
            "SELECT * FROM owner_notifications WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(result)
    }

    async fn list_active(&self, owner_email: &str) -> AppResult<Vec<OwnerNotification>> {
        let result = sqlx::query_as::<_, OwnerNotification>(
            r#"
            SELECT * FROM owner_notifications
            WHERE owner_email = $1 AND dismissed = FALSE
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_email)
        .fetch_all(&self.pool)
        .await?;

        Ok(result)
    }

    async fn dismiss(&self, id: Uuid) -> AppResult<OwnerNotification> {
        sqlx::query_as::<_, OwnerNotification>(
            "UPDATE owner_notifications SET dismissed = TRUE WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found_error("Notification", &id.to_string()))
    }
}
