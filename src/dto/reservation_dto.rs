use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

// Cotización de una reserva
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteRequest {
    pub spot_id: Uuid,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteResponse {
    pub spot_id: Uuid,
    pub spot_name: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub hours: Decimal,
    pub billed_hours: i64,
    pub hourly_price: Decimal,
    pub subtotal: Decimal,
    pub fee: Decimal,
    pub total: Decimal,
    pub reference: String,
}

// Resultado del widget de pago
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentInfo {
    pub method: String,
    pub status: String,
    pub transaction_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateReservationRequest {
    pub spot_id: Uuid,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub reference: String,
    pub payment: PaymentInfo,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReviewRequest {
    #[validate(range(min = 1, max = 5, message = "La calificación debe estar entre 1 y 5"))]
    pub rating: i16,
    #[validate(length(max = 1000))]
    pub comment: Option<String>,
}
