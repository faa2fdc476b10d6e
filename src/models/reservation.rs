//! Modelo de Reservation
//!
//! Una reserva nace `active` cuando el pago es aprobado. Desde ahí solo
//! puede terminar (`completed`) o cancelarse (`cancelled`); ambos estados
//! son terminales. `pending` existe para reservas aún sin pago.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rand::{distributions::Alphanumeric, Rng};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Estado de la reserva - mapea al ENUM reservation_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[sqlx(type_name = "reservation_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending,
    Active,
    Completed,
    Cancelled,
}

impl ReservationStatus {
    pub const ALL: [ReservationStatus; 4] = [
        ReservationStatus::Pending,
        ReservationStatus::Active,
        ReservationStatus::Completed,
        ReservationStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Active => "active",
            ReservationStatus::Completed => "completed",
            ReservationStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s.trim().to_lowercase())
    }

    /// Tabla de transiciones permitidas
    pub fn can_transition_to(&self, next: ReservationStatus) -> bool {
        matches!(
            (self, next),
            (ReservationStatus::Active, ReservationStatus::Completed)
                | (ReservationStatus::Active, ReservationStatus::Cancelled)
                | (ReservationStatus::Pending, ReservationStatus::Cancelled)
        )
    }

    /// La reserva ocupa una celda del spot
    pub fn holds_capacity(&self) -> bool {
        *self == ReservationStatus::Active
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ReservationStatus::Completed | ReservationStatus::Cancelled)
    }

    /// Mensaje para una transición rechazada por `can_transition_to`
    pub fn transition_error(&self, next: ReservationStatus) -> String {
        if self.is_terminal() {
            format!("Reservation is already {} and cannot change to {}", self.as_str(), next.as_str())
        } else {
            format!("{} -> {}", self.as_str(), next.as_str())
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Reservation {
    pub id: Uuid,
    pub reference: String,
    pub spot_id: Uuid,
    pub spot_name: String,
    pub user_email: String,
    pub user_name: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub hours: Decimal,
    pub billed_hours: i32,
    pub subtotal: Decimal,
    pub fee: Decimal,
    pub amount: Decimal,
    pub payment_method: String,
    pub transaction_id: Option<String>,
    pub status: ReservationStatus,
    pub review_submitted: bool,
    pub booked_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Cambio de estado ya aplicado, con el estado anterior
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub reservation: Reservation,
    pub previous: ReservationStatus,
}

const REFERENCE_PREFIX: &str = "PK-";
const REFERENCE_LEN: usize = 10;

/// Generar una referencia de pago `PK-XXXXXXXXXX`
pub fn generate_reference() -> String {
    let code: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(REFERENCE_LEN)
        .map(|c| char::from(c).to_ascii_uppercase())
        .collect();
    format!("{}{}", REFERENCE_PREFIX, code)
}

pub fn is_valid_reference(reference: &str) -> bool {
    reference
        .strip_prefix(REFERENCE_PREFIX)
        .map(|code| code.len() == REFERENCE_LEN && code.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ReservationStatus::*;

    #[test]
    fn test_transition_table() {
        assert!(Active.can_transition_to(Completed));
        assert!(Active.can_transition_to(Cancelled));
        assert!(Pending.can_transition_to(Cancelled));

        assert!(!Active.can_transition_to(Active));
        assert!(!Pending.can_transition_to(Active));
        assert!(!Pending.can_transition_to(Completed));
    }

    #[test]
    fn test_terminal_states_have_no_exit() {
        for from in [Completed, Cancelled] {
            assert!(from.is_terminal());
            for to in ReservationStatus::ALL {
                assert!(!from.can_transition_to(to), "{:?} -> {:?}", from, to);
            }
        }
    }

    #[test]
    fn test_transition_error_names_terminal_state() {
        assert_eq!(Active.transition_error(Active), "active -> active");
        assert!(Completed
            .transition_error(Cancelled)
            .starts_with("Reservation is already completed"));
    }

    #[test]
    fn test_only_active_holds_capacity() {
        assert!(Active.holds_capacity());
        assert!(!Pending.holds_capacity());
        assert!(!Completed.holds_capacity());
        assert!(!Cancelled.holds_capacity());
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(ReservationStatus::parse("Completed"), Some(Completed));
        assert_eq!(ReservationStatus::parse("refunded"), None);
    }

    #[test]
    fn test_generated_reference_format() {
        let reference = generate_reference();
        assert!(reference.starts_with("PK-"));
        assert!(is_valid_reference(&reference));
        assert!(!is_valid_reference("PK-123"));
        assert!(!is_valid_reference("XX-ABCDEFGHIJ"));
    }
}
