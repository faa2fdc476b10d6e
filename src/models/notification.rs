//! Modelo de OwnerNotification
//!
//! Aviso al owner sobre la decisión del admin. Vive hasta que el owner
//! lo descarta.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

use super::spot_request::SpotRequest;

pub const APPROVED_MESSAGE: &str = "Your spot has been approved and is now live on PARKLY!";
pub const REJECTED_MESSAGE: &str = "Your spot request was rejected by the admin.";

/// Tipo de notificación - mapea al ENUM notification_kind
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "notification_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OwnerNotification {
    pub id: Uuid,
    pub owner_email: String,
    pub request_id: Uuid,
    pub spot_id: Option<Uuid>,
    pub spot_name: String,
    pub kind: NotificationKind,
    pub message: String,
    pub reason: Option<String>,
    pub dismissed: bool,
    pub created_at: DateTime<Utc>,
}

impl OwnerNotification {
    pub fn approved(request: &SpotRequest, spot_id: Uuid) -> Self {
        Self::build(request, Some(spot_id), NotificationKind::Approved, APPROVED_MESSAGE, None)
    }

    pub fn rejected(request: &SpotRequest, reason: &str) -> Self {
        Self::build(
            request,
            None,
            NotificationKind::Rejected,
            REJECTED_MESSAGE,
            Some(reason.to_string()),
        )
    }

    fn build(
        request: &SpotRequest,
        spot_id: Option<Uuid>,
        kind: NotificationKind,
        message: &str,
        reason: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_email: request.owner_email.clone(),
            request_id: request.id,
            spot_id,
            spot_name: request.name.clone(),
            kind,
            message: message.to_string(),
            reason,
            dismissed: false,
            created_at: Utc::now(),
        }
    }
}
