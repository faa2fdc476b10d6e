//! Cotización de reservas
//!
//! Las horas se cobran completas (`ceil`) y la tarifa de servicio es el 5%
//! del subtotal redondeado a pesos enteros, con medios hacia arriba.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::dto::reservation_dto::QuoteResponse;
use crate::models::{reservation::generate_reference, spot::Spot};
use crate::utils::errors::{AppError, AppResult};

/// Desglose de precio de una franja horaria
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBreakdown {
    pub hours: Decimal,
    pub billed_hours: i64,
    pub subtotal: Decimal,
    pub fee: Decimal,
    pub total: Decimal,
}

fn service_fee_rate() -> Decimal {
    Decimal::new(5, 2)
}

fn price_overflow() -> AppError {
    AppError::BadRequest("El precio de la reserva excede el máximo permitido".to_string())
}

/// Calcular el precio de `start..end` a `hourly_price` por hora
pub fn price(start: NaiveTime, end: NaiveTime, hourly_price: Decimal) -> AppResult<PriceBreakdown> {
    let seconds = (end - start).num_seconds();
    if seconds <= 0 {
        return Err(AppError::BadRequest(
            "La hora de salida debe ser posterior a la de entrada".to_string(),
        ));
    }

    let hours = (Decimal::from(seconds) / Decimal::from(3600)).round_dp(2);
    let billed_hours = (seconds + 3599) / 3600;
    let subtotal = Decimal::from(billed_hours)
        .checked_mul(hourly_price)
        .ok_or_else(price_overflow)?;
    let fee = subtotal
        .checked_mul(service_fee_rate())
        .ok_or_else(price_overflow)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let total = subtotal.checked_add(fee).ok_or_else(price_overflow)?;

    Ok(PriceBreakdown {
        hours,
        billed_hours,
        subtotal,
        fee,
        total,
    })
}

/// Cotización completa para un spot, con una referencia de pago nueva
pub fn quote(spot: &Spot, date: NaiveDate, start: NaiveTime, end: NaiveTime) -> AppResult<QuoteResponse> {
    let breakdown = price(start, end, spot.hourly_price)?;

    Ok(QuoteResponse {
        spot_id: spot.id,
        spot_name: spot.name.clone(),
        date,
        start_time: start,
        end_time: end,
        hours: breakdown.hours,
        billed_hours: breakdown.billed_hours,
        hourly_price: spot.hourly_price,
        subtotal: breakdown.subtotal,
        fee: breakdown.fee,
        total: breakdown.total,
        reference: generate_reference(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_partial_hour_is_billed_as_full_hour() {
        let p = price(t(9, 0), t(11, 10), Decimal::new(5000, 0)).unwrap();
        assert_eq!(p.billed_hours, 3);
        assert_eq!(p.hours, Decimal::new(217, 2));
        assert_eq!(p.subtotal, Decimal::new(15000, 0));
        assert_eq!(p.fee, Decimal::new(750, 0));
        assert_eq!(p.total, Decimal::new(15750, 0));
    }

    #[test]
    fn test_exact_hours() {
        let p = price(t(8, 0), t(10, 0), Decimal::new(4000, 0)).unwrap();
        assert_eq!(p.billed_hours, 2);
        assert_eq!(p.subtotal, Decimal::new(8000, 0));
        assert_eq!(p.fee, Decimal::new(400, 0));
    }

    #[test]
    fn test_fee_rounds_half_up() {
        // 1 hora a 3510 -> 5% = 175.5 -> 176
        let p = price(t(9, 0), t(10, 0), Decimal::new(3510, 0)).unwrap();
        assert_eq!(p.fee, Decimal::new(176, 0));
        assert_eq!(p.total, Decimal::new(3686, 0));
    }

    #[test]
    fn test_empty_or_inverted_range_rejected() {
        assert!(matches!(
            price(t(9, 0), t(9, 0), Decimal::new(5000, 0)),
            Err(AppError::BadRequest(_))
        ));
        assert!(price(t(10, 0), t(9, 0), Decimal::new(5000, 0)).is_err());
    }

    #[test]
    fn test_overflowing_price_is_bad_request() {
        assert!(matches!(
            price(t(9, 0), t(10, 0), Decimal::MAX),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            price(t(0, 0), t(23, 59), Decimal::MAX),
            Err(AppError::BadRequest(_))
        ));
    }
}
