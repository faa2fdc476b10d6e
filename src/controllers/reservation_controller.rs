//! Controlador de reservas
//!
//! Cotización, pago y reserva, cambios de estado y reseñas. El total
//! siempre se recalcula en el servidor a partir del spot.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::api_response::ApiResponse;
use crate::dto::reservation_dto::{
    CreateReservationRequest, QuoteRequest, QuoteResponse, ReviewRequest, UpdateStatusRequest,
};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::reservation::{is_valid_reference, Reservation, ReservationStatus};
use crate::models::review::Review;
use crate::models::spot::{Spot, SpotStatus};
use crate::models::user::UserRole;
use crate::repositories::{ReservationRepository, SpotRepository};
use crate::services::{pricing_service, PaymentService};
use crate::state::AppState;
use crate::utils::errors::{forbidden_error, not_found_error, AppError, AppResult};
use crate::utils::metrics::Metrics;
use crate::utils::validation::{parse_date, parse_time};

pub struct ReservationController {
    spots: Arc<dyn SpotRepository>,
    reservations: Arc<dyn ReservationRepository>,
    payments: PaymentService,
    metrics: Metrics,
}

impl ReservationController {
    pub fn new(state: &AppState) -> Self {
        Self {
            spots: state.repos.spots.clone(),
            reservations: state.repos.reservations.clone(),
            payments: state.payments(),
            metrics: state.metrics.clone(),
        }
    }

    async fn bookable_spot(&self, id: Uuid) -> AppResult<Spot> {
        self.spots
            .find_by_id(id)
            .await?
            .filter(|spot| spot.status == SpotStatus::Approved)
            .ok_or_else(|| not_found_error("Spot", &id.to_string()))
    }

    pub async fn quote(&self, request: QuoteRequest) -> AppResult<ApiResponse<QuoteResponse>> {
        let date = parse_date("date", &request.date)?;
        let start = parse_time("start_time", &request.start_time)?;
        let end = parse_time("end_time", &request.end_time)?;

        let spot = self.bookable_spot(request.spot_id).await?;
        let quote = pricing_service::quote(&spot, date, start, end)?;
        Ok(ApiResponse::success(quote))
    }

    /// Verificar el pago y reservar. Solo clientes.
    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        request: CreateReservationRequest,
    ) -> AppResult<ApiResponse<Reservation>> {
        user.require_role(UserRole::Client, "book a spot")?;

        let date = parse_date("date", &request.date)?;
        let start = parse_time("start_time", &request.start_time)?;
        let end = parse_time("end_time", &request.end_time)?;
        let reference = request.reference.trim().to_string();
        if !is_valid_reference(&reference) {
            return Err(AppError::BadRequest(format!("Invalid payment reference '{}'", reference)));
        }

        let spot = self.bookable_spot(request.spot_id).await?;
        if !spot.available() {
            return Err(AppError::CapacityExhausted(format!("Spot '{}' is full", spot.name)));
        }
        let quote = pricing_service::quote(&spot, date, start, end)?;

        if let Err(e) = self.payments.verify(&request.payment, &reference, quote.total).await {
            if matches!(e, AppError::PaymentDeclined(_)) {
                self.metrics.payments_declined.inc();
            }
            return Err(e);
        }

        let now = Utc::now();
        let reservation = Reservation {
            id: Uuid::new_v4(),
            reference,
            spot_id: spot.id,
            spot_name: spot.name.clone(),
            user_email: user.email.clone(),
            user_name: user.name.clone(),
            date,
            start_time: start,
            end_time: end,
            hours: quote.hours,
            billed_hours: i32::try_from(quote.billed_hours)
                .map_err(|_| AppError::BadRequest("Reservation is too long".to_string()))?,
            subtotal: quote.subtotal,
            fee: quote.fee,
            amount: quote.total,
            payment_method: request.payment.method.trim().to_uppercase(),
            transaction_id: request.payment.transaction_id.clone(),
            status: ReservationStatus::Active,
            review_submitted: false,
            booked_at: now,
            updated_at: now,
        };

        let saved = self.reservations.book(&reservation).await?;
        self.metrics.bookings_created.inc();
        info!(
            "🅿️ Reserva {} creada: {} en '{}' por {}",
            saved.reference, saved.user_email, saved.spot_name, saved.amount
        );

        Ok(ApiResponse::success_with_message(saved, "Reservation confirmed"))
    }

    pub async fn list_mine(&self, user: &AuthenticatedUser) -> AppResult<ApiResponse<Vec<Reservation>>> {
        Ok(ApiResponse::success(self.reservations.list_by_user(&user.email).await?))
    }

    async fn owned_reservation(&self, user: &AuthenticatedUser, id: Uuid, operation: &str) -> AppResult<Reservation> {
        let reservation = self
            .reservations
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Reservation", &id.to_string()))?;

        if reservation.user_email != user.email {
            return Err(forbidden_error(operation, "the reservation belongs to another user"));
        }
        Ok(reservation)
    }

    pub async fn set_status(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        request: UpdateStatusRequest,
    ) -> AppResult<ApiResponse<Reservation>> {
        let next = ReservationStatus::parse(&request.status)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown status '{}'", request.status)))?;

        self.owned_reservation(user, id, "update reservation").await?;
        let change = self.reservations.set_status(id, next).await?;
        info!(
            "🔄 Reserva {}: {} -> {}",
            change.reservation.reference,
            change.previous.as_str(),
            change.reservation.status.as_str()
        );

        Ok(ApiResponse::success(change.reservation))
    }

    pub async fn review(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        request: ReviewRequest,
    ) -> AppResult<ApiResponse<Review>> {
        request.validate()?;
        let reservation = self.owned_reservation(user, id, "review reservation").await?;

        let review = Review {
            id: Uuid::new_v4(),
            spot_id: reservation.spot_id,
            reservation_id: reservation.id,
            author_name: user.name.clone(),
            author_email: user.email.clone(),
            rating: request.rating,
            comment: request.comment.unwrap_or_default().trim().to_string(),
            created_at: Utc::now(),
        };

        let saved = self.reservations.add_review(&review).await?;
        info!("⭐ Reseña {} para '{}' ({})", saved.rating, reservation.spot_name, reservation.reference);

        Ok(ApiResponse::success_with_message(saved, "Review submitted"))
    }
}
