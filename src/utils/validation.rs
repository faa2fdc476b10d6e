//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validación de datos
//! y conversión de tipos que `validator` no cubre con sus derives.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use validator::ValidationError;

use crate::utils::errors::AppError;

/// Validar y convertir string a fecha
pub fn validate_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        let mut error = ValidationError::new("date");
        error.add_param("value".into(), &value.to_string());
        error.add_param("format".into(), &"YYYY-MM-DD".to_string());
        error
    })
}

/// Validar y convertir string a hora. Acepta `HH:MM` y `HH:MM:SS`.
pub fn validate_time(value: &str) -> Result<NaiveTime, ValidationError> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| {
            let mut error = ValidationError::new("time");
            error.add_param("value".into(), &value.to_string());
            error.add_param("format".into(), &"HH:MM".to_string());
            error
        })
}

/// Validar que un string no esté vacío
pub fn validate_not_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("not_empty"));
    }
    Ok(())
}

/// Tope de precio: 24 horas más la tarifa siguen cabiendo en `NUMERIC(12, 2)`
pub fn max_price() -> Decimal {
    Decimal::new(9_999_999_999, 2)
}

/// Validar que un precio sea positivo y no supere `max_price()`
pub fn validate_positive_price(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        let mut error = ValidationError::new("positive");
        error.add_param("actual".into(), &value.to_string());
        return Err(error);
    }
    if *value > max_price() {
        let mut error = ValidationError::new("max_price");
        error.add_param("actual".into(), &value.to_string());
        error.add_param("max".into(), &max_price().to_string());
        return Err(error);
    }
    Ok(())
}

/// Fecha como error de petición, para parámetros sueltos
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, AppError> {
    validate_date(value)
        .map_err(|_| AppError::BadRequest(format!("{} debe tener formato YYYY-MM-DD", field)))
}

/// Hora como error de petición, para parámetros sueltos
pub fn parse_time(field: &str, value: &str) -> Result<NaiveTime, AppError> {
    validate_time(value).map_err(|_| AppError::BadRequest(format!("{} debe tener formato HH:MM", field)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_time_formats() {
        assert_eq!(validate_time("09:00").unwrap(), NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(validate_time("11:10:30").unwrap(), NaiveTime::from_hms_opt(11, 10, 30).unwrap());
        assert!(validate_time("9h").is_err());
        assert!(validate_time("25:00").is_err());
    }

    #[test]
    fn test_validate_date() {
        assert!(validate_date("2025-03-14").is_ok());
        assert!(validate_date("14/03/2025").is_err());
    }

    #[test]
    fn test_validate_positive_price() {
        assert!(validate_positive_price(&Decimal::new(5000, 0)).is_ok());
        assert!(validate_positive_price(&Decimal::ZERO).is_err());
        assert!(validate_positive_price(&Decimal::new(-1, 0)).is_err());
    }

    #[test]
    fn test_validate_price_upper_bound() {
        assert!(validate_positive_price(&max_price()).is_ok());
        assert!(validate_positive_price(&(max_price() + Decimal::new(1, 2))).is_err());
        assert!(validate_positive_price(&Decimal::MAX).is_err());
    }

    #[test]
    fn test_parse_time_maps_to_bad_request() {
        let err = parse_time("start_time", "nope").unwrap_err();
        assert_eq!(err.code(), "BAD_REQUEST");
    }
}
