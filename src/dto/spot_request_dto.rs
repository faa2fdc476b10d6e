use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use crate::models::spot_request::RequestStatus;
use crate::utils::validation::{validate_not_empty, validate_positive_price};

fn default_schedule() -> String {
    "24h".to_string()
}

// Solicitud de publicación de un spot
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitSpotRequest {
    #[validate(length(min = 1, max = 120, message = "El nombre es requerido"))]
    pub name: String,
    #[validate(custom(function = "validate_not_empty", message = "La dirección es requerida"))]
    pub address: String,
    #[validate(custom(function = "validate_not_empty", message = "La zona es requerida"))]
    pub zone: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    #[validate(custom(function = "validate_positive_price", message = "El precio por hora debe ser mayor que 0"))]
    pub hourly_price: Decimal,
    #[validate(custom(function = "validate_positive_price"))]
    pub daily_price: Option<Decimal>,
    #[validate(custom(function = "validate_positive_price"))]
    pub monthly_price: Option<Decimal>,
    #[validate(range(min = 1, message = "Debe haber al menos un espacio"))]
    pub total_spots: i32,
    #[serde(default = "default_schedule")]
    pub schedule: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub ev_charging: bool,
    #[serde(default)]
    pub has_security: bool,
    #[serde(default)]
    pub is_illuminated: bool,
    #[validate(custom(function = "validate_not_empty", message = "El certificado de propiedad es requerido"))]
    pub certificate: String,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, Default)]
pub struct RequestStatusQuery {
    pub status: Option<RequestStatus>,
}
