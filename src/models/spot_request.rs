//! Modelo de SpotRequest
//!
//! Solicitud de publicación enviada por un owner. Solo puede pasar de
//! `pending` a `approved` o `rejected`; ambos son estados terminales.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Estado de la solicitud - mapea al ENUM request_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "request_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }
}

/// Motivos de rechazo que puede elegir el admin
pub const REJECTION_REASONS: [&str; 7] = [
    "Incomplete or invalid ownership certificate",
    "Address cannot be verified",
    "Property does not meet safety standards",
    "Duplicate listing detected",
    "Insufficient information provided",
    "Zoning restrictions apply to this location",
    "Other (see admin notes)",
];

pub fn is_known_rejection_reason(reason: &str) -> bool {
    REJECTION_REASONS.iter().any(|r| *r == reason)
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SpotRequest {
    pub id: Uuid,
    pub owner_email: String,
    pub owner_name: String,
    pub name: String,
    pub address: String,
    pub zone: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub hourly_price: Decimal,
    pub daily_price: Option<Decimal>,
    pub monthly_price: Option<Decimal>,
    pub total_spots: i32,
    pub schedule: String,
    pub features: Vec<String>,
    pub ev_charging: bool,
    pub has_security: bool,
    pub is_illuminated: bool,
    pub certificate: String,
    pub image: Option<String>,
    pub status: RequestStatus,
    pub rejection_reason: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
}

impl SpotRequest {
    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_rejection_reasons() {
        assert!(is_known_rejection_reason("Duplicate listing detected"));
        assert!(!is_known_rejection_reason("duplicate listing detected"));
        assert!(!is_known_rejection_reason(""));
    }
}
