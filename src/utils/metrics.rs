//! Contadores Prometheus del servicio
//!
//! Cada `AppState` tiene su propio `Registry`, así los tests no comparten
//! contadores entre sí.

use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

use crate::utils::errors::AppError;

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub bookings_created: IntCounter,
    pub payments_declined: IntCounter,
    pub requests_decided: IntCounterVec,
    pub chat_answered: IntCounter,
    pub chat_refused: IntCounter,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("parkly".to_string()), None)?;

        let bookings_created = IntCounter::new("bookings_created_total", "Reservas creadas")?;
        let payments_declined = IntCounter::new("payments_declined_total", "Pagos rechazados")?;
        let requests_decided = IntCounterVec::new(
            Opts::new("spot_requests_decided_total", "Solicitudes decididas por el admin"),
            &["decision"],
        )?;
        let chat_answered = IntCounter::new("chat_answered_total", "Mensajes respondidos por el chatbot")?;
        let chat_refused = IntCounter::new("chat_refused_total", "Mensajes fuera de dominio")?;

        registry.register(Box::new(bookings_created.clone()))?;
        registry.register(Box::new(payments_declined.clone()))?;
        registry.register(Box::new(requests_decided.clone()))?;
        registry.register(Box::new(chat_answered.clone()))?;
        registry.register(Box::new(chat_refused.clone()))?;

        Ok(Self {
            registry,
            bookings_created,
            payments_declined,
            requests_decided,
            chat_answered,
            chat_refused,
        })
    }

    /// Renderizar en formato de exposición de texto
    pub fn render(&self) -> Result<String, AppError> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(|e| AppError::Internal(format!("Error codificando métricas: {}", e)))?;
        String::from_utf8(buffer).map_err(|e| AppError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_contains_counters() {
        let metrics = Metrics::new().unwrap();
        metrics.bookings_created.inc();
        metrics.requests_decided.with_label_values(&["approved"]).inc();

        let text = metrics.render().unwrap();
        assert!(text.contains("parkly_bookings_created_total 1"));
        assert!(text.contains("decision=\"approved\""));
    }
}
