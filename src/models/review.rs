//! Modelo de Review

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub id: Uuid,
    pub spot_id: Uuid,
    pub reservation_id: Uuid,
    pub author_name: String,
    pub author_email: String,
    pub rating: i16,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}
