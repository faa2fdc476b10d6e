use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{is_unique_violation, like_pattern, ReservationRepository};
use crate::models::{
    reservation::{Reservation, ReservationStatus, StatusChange},
    review::Review,
};
use crate::utils::errors::{not_found_error, AppError, AppResult};

pub struct PgReservationRepository {
    pool: PgPool,
}

impl PgReservationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn lock_reservation(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> AppResult<Reservation> {
        sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| not_found_error("Reservation", &id.to_string()))
    }
}

#[async_trait]
impl ReservationRepository for PgReservationRepository {
    async fn book(&self, reservation: &Reservation) -> AppResult<Reservation> {
        let mut tx = self.pool.begin().await?;

        let capacity_guard = if reservation.status.holds_capacity() {
            "AND occupied_spots < total_spots"
        } else {
            ""
        };
        let occupancy_delta = i32::from(reservation.status.holds_capacity());

        let updated = sqlx::query(&format!(
            r#"
            UPDATE parking_spots
            SET occupied_spots = occupied_spots + $3, earnings = earnings + $2
            WHERE id = $1 AND status = 'approved' {}
            "#,
            capacity_guard
        ))
        .bind(reservation.spot_id)
        .bind(reservation.amount)
        .bind(occupancy_delta)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            let exists: (bool,) = sqlx::query_as(
                "SELECT EXISTS(SELECT 1 FROM parking_spots WHERE id = $1 AND status = 'approved')",
            )
            .bind(reservation.spot_id)
            .fetch_one(&mut *tx)
            .await?;

            return Err(if exists.0 {
                AppError::CapacityExhausted(format!(
                    "Spot '{}' has no free spaces",
                    reservation.spot_name
                ))
            } else {
                not_found_error("Spot", &reservation.spot_id.to_string())
            });
        }

        let inserted = sqlx::query_as::<_, Reservation>(
            r#"
            INSERT INTO reservations (
                id, reference, spot_id, spot_name, user_email, user_name, date, start_time,
                end_time, hours, billed_hours, subtotal, fee, amount, payment_method,
                transaction_id, status, review_submitted, booked_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                    $17, $18, $19, $20)
            RETURNING *
            "#,
        )
        .bind(reservation.id)
        .bind(&reservation.reference)
        .bind(reservation.spot_id)
        .bind(&reservation.spot_name)
        .bind(&reservation.user_email)
        .bind(&reservation.user_name)
        .bind(reservation.date)
        .bind(reservation.start_time)
        .bind(reservation.end_time)
        .bind(reservation.hours)
        .bind(reservation.billed_hours)
        .bind(reservation.subtotal)
        .bind(reservation.fee)
        .bind(reservation.amount)
        .bind(&reservation.payment_method)
        .bind(&reservation.transaction_id)
        .bind(reservation.status)
        .bind(reservation.review_submitted)
        .bind(reservation.booked_at)
        .bind(reservation.updated_at)
        .fetch_one(&mut *tx)
        .await;

        let saved = match inserted {
            Ok(saved) => saved,
            Err(e) if is_unique_violation(&e) => {
                return Err(AppError::Conflict(format!(
                    "Payment reference '{}' was already used",
                    reservation.reference
                )))
            }
            Err(e) => return Err(e.into()),
        };

        tx.commit().await?;
        Ok(saved)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Reservation>> {
        let result = sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(result)
    }

    async fn list_by_user(&self, user_email: &str) -> AppResult<Vec<Reservation>> {
        let result = sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE user_email = $1 ORDER BY booked_at DESC",
        )
        .bind(user_email)
        .fetch_all(&self.pool)
        .await?;

        Ok(result)
    }

    async fn list_all(&self, q: Option<&str>) -> AppResult<Vec<Reservation>> {
        let result = match q {
            Some(q) => {
                sqlx::query_as::<_, Reservation>(
                    r#"
                    SELECT * FROM reservations
                    WHERE user_name ILIKE $1 OR user_email ILIKE $1 OR spot_name ILIKE $1
                    ORDER BY booked_at DESC
                    "#,
                )
                .bind(like_pattern(q))
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Reservation>("SELECT * FROM reservations ORDER BY booked_at DESC")
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(result)
    }

    async fn set_status(&self, id: Uuid, next: ReservationStatus) -> AppResult<StatusChange> {
        let mut tx = self.pool.begin().await?;

        let current = Self::lock_reservation(&mut tx, id).await?;
        let previous = current.status;

        if !previous.can_transition_to(next) {
            return Err(AppError::InvalidTransition(previous.transition_error(next)));
        }

        let reservation = sqlx::query_as::<_, Reservation>(
            "UPDATE reservations SET status = $2, updated_at = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(next)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        if previous.holds_capacity() && !next.holds_capacity() {
            let released = sqlx::query(
                r#"
                UPDATE parking_spots SET occupied_spots = occupied_spots - 1
                WHERE id = $1 AND occupied_spots > 0
                "#,
            )
            .bind(current.spot_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

            if released == 0 {
                // La transacción se descarta al salir
                return Err(AppError::Internal(format!(
                    "Occupancy underflow on spot '{}'",
                    current.spot_id
                )));
            }
        }

        tx.commit().await?;
        Ok(StatusChange { reservation, previous })
    }

    async fn add_review(&self, review: &Review) -> AppResult<Review> {
        let mut tx = self.pool.begin().await?;

        let reservation = Self::lock_reservation(&mut tx, review.reservation_id).await?;

        if reservation.status != ReservationStatus::Completed {
            return Err(AppError::InvalidTransition(format!(
                "Only completed reservations can be reviewed (reservation is {})",
                reservation.status.as_str()
            )));
        }
        if reservation.review_submitted {
            return Err(AppError::Conflict(
                "This reservation has already been reviewed".to_string(),
            ));
        }

        let inserted = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (id, spot_id, reservation_id, author_name, author_email, rating, comment, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(review.id)
        .bind(reservation.spot_id)
        .bind(review.reservation_id)
        .bind(&review.author_name)
        .bind(&review.author_email)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.created_at)
        .fetch_one(&mut *tx)
        .await;

        let saved = match inserted {
            Ok(saved) => saved,
            Err(e) if is_unique_violation(&e) => {
                return Err(AppError::Conflict(
                    "This reservation has already been reviewed".to_string(),
                ))
            }
            Err(e) => return Err(e.into()),
        };

        sqlx::query("UPDATE reservations SET review_submitted = TRUE, updated_at = $2 WHERE id = $1")
            .bind(reservation.id)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            UPDATE parking_spots
            SET rating = COALESCE((SELECT ROUND(AVG(rating)::numeric, 1)::float8 FROM reviews WHERE spot_id = $1), 0),
                review_count = (SELECT COUNT(*)::int FROM reviews WHERE spot_id = $1)
            WHERE id = $1
            "#,
        )
        .bind(reservation.spot_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(saved)
    }
}
