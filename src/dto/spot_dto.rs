use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::spot::{Spot, SpotStatus};

// Spot tal como lo ve el cliente, con la disponibilidad derivada
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotResponse {
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
    pub free_spots: i32,
    pub available: bool,
    pub verified: bool,
    pub is_24h: bool,
    pub ev_charging: bool,
    pub has_security: bool,
    pub is_illuminated: bool,
    pub schedule: String,
    pub features: Vec<String>,
    pub image: Option<String>,
    pub rating: f64,
    pub review_count: i32,
    pub status: SpotStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Spot> for SpotResponse {
    fn from(spot: Spot) -> Self {
        Self {
            available: spot.available(),
            free_spots: spot.free_spots(),
            id: spot.id,
            request_id: spot.request_id,
            owner_email: spot.owner_email,
            name: spot.name,
            address: spot.address,
            zone: spot.zone,
            latitude: spot.latitude,
            longitude: spot.longitude,
            hourly_price: spot.hourly_price,
            daily_price: spot.daily_price,
            monthly_price: spot.monthly_price,
            total_spots: spot.total_spots,
            occupied_spots: spot.occupied_spots,
            verified: spot.verified,
            is_24h: spot.is_24h,
            ev_charging: spot.ev_charging,
            has_security: spot.has_security,
            is_illuminated: spot.is_illuminated,
            schedule: spot.schedule,
            features: spot.features,
            image: spot.image,
            rating: spot.rating,
            review_count: spot.review_count,
            status: spot.status,
            created_at: spot.created_at,
        }
    }
}

// Vista del owner: incluye ingresos y certificado
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerSpotResponse {
    #[serde(flatten)]
    pub spot: SpotResponse,
    pub certificate: Option<String>,
    pub earnings: Decimal,
}

impl From<Spot> for OwnerSpotResponse {
    fn from(spot: Spot) -> Self {
        let certificate = spot.certificate.clone();
        let earnings = spot.earnings;
        Self {
            spot: SpotResponse::from(spot),
            certificate,
            earnings,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpotSort {
    #[default]
    Name,
    Price,
    Rating,
}

// Filtros del catálogo (query string)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SpotFilters {
    pub q: Option<String>,
    pub zone: Option<String>,
    pub max_price: Option<Decimal>,
    pub verified: Option<bool>,
    pub available: Option<bool>,
    pub is_24h: Option<bool>,
    pub ev_charging: Option<bool>,
    pub has_security: Option<bool>,
    pub is_illuminated: Option<bool>,
    pub sort: Option<SpotSort>,
}
