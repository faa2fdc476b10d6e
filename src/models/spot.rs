//! Modelo de Spot (parqueadero publicado)
//!
//! Mapea a la tabla parking_spots. La disponibilidad no se almacena:
//! se deriva siempre de `occupied_spots < total_spots`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

use super::spot_request::SpotRequest;

/// Estado del spot - mapea al ENUM spot_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "spot_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SpotStatus {
    Approved,
    Pending,
    Rejected,
}

/// Spot principal - mapea exactamente a la tabla parking_spots
#[derive(Debug, Clone, FromRow)]
pub struct Spot {
    pub id: Uuid,
    pub request_id: Option<Uuid>,
    pub owner_email: String,
    pub name: String,
    pub address: String,
    pub zone: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub hourly_price: Decimal,
    pub daily_price: Option<Decimal>,
    pub monthly_price: Option<Decimal>,
    pub total_spots: i32,
    pub occupied_spots: i32,
    pub verified: bool,
    pub is_24h: bool,
    pub ev_charging: bool,
    pub has_security: bool,
    pub is_illuminated: bool,
    pub schedule: String,
    pub features: Vec<String>,
    pub certificate: Option<String>,
    pub image: Option<String>,
    pub rating: f64,
    pub review_count: i32,
    pub earnings: Decimal,
    pub status: SpotStatus,
    pub created_at: DateTime<Utc>,
}

impl Spot {
    /// Crear el spot publicado a partir de una solicitud aprobada
    pub fn from_request(request: &SpotRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            request_id: Some(request.id),
            owner_email: request.owner_email.clone(),
            name: request.name.clone(),
            address: request.address.clone(),
            zone: request.zone.clone(),
            latitude: request.latitude,
            longitude: request.longitude,
            hourly_price: request.hourly_price,
            daily_price: request.daily_price,
            monthly_price: request.monthly_price,
            total_spots: request.total_spots,
            occupied_spots: 0,
            verified: true,
            is_24h: request.schedule == "24h",
            ev_charging: request.ev_charging,
            has_security: request.has_security,
            is_illuminated: request.is_illuminated,
            schedule: request.schedule.clone(),
            features: request.features.clone(),
            certificate: Some(request.certificate.clone()),
            image: request.image.clone(),
            rating: 0.0,
            review_count: 0,
            earnings: Decimal::ZERO,
            status: SpotStatus::Approved,
            created_at: Utc::now(),
        }
    }

    /// Hay al menos una celda libre
    pub fn available(&self) -> bool {
        self.occupied_spots < self.total_spots
    }

    pub fn free_spots(&self) -> i32 {
        (self.total_spots - self.occupied_spots).max(0)
    }
}

/// Promedio de calificaciones redondeado a un decimal (0 sin reseñas)
pub fn average_rating(ratings: &[i16]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let sum: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
    let avg = sum as f64 / ratings.len() as f64;
    (avg * 10.0).round() / 10.0
}
