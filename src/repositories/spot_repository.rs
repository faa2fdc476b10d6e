use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{like_pattern, SpotRepository};
use crate::models::{review::Review, spot::Spot};
use crate::utils::errors::AppResult;

pub struct PgSpotRepository {
    pool: PgPool,
}

impl PgSpotRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Insertar un spot dentro de una transacción abierta
pub(crate) async fn insert_spot(tx: &mut Transaction<'_, Postgres>, spot: &Spot) -> AppResult<Spot> {
    let result = sqlx::query_as::<_, Spot>(
        r#"
        INSERT INTO parking_spots (
            id, request_id, owner_email, name, address, zone, latitude, longitude,
            hourly_price, daily_price, monthly_price, total_spots, occupied_spots,
            verified, is_24h, ev_charging, has_security, is_illuminated, schedule,
            features, certificate, image, rating, review_count, earnings, status, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27)
        RETURNING *
        "#,
    )
    .bind(spot.id)
    .bind(spot.request_id)
    .bind(&spot.owner_email)
    .bind(&spot.name)
    .bind(&spot.address)
    .bind(&spot.zone)
    .bind(spot.latitude)
    .bind(spot.longitude)
    .bind(spot.hourly_price)
    .bind(spot.daily_price)
    .bind(spot.monthly_price)
    .bind(spot.total_spots)
    .bind(spot.occupied_spots)
    .bind(spot.verified)
    .bind(spot.is_24h)
    .bind(spot.ev_charging)
    .bind(spot.has_security)
    .bind(spot.is_illuminated)
    .bind(&spot.schedule)
    .bind(&spot.features)
    .bind(&spot.certificate)
    .bind(&spot.image)
    .bind(spot.rating)
    .bind(spot.review_count)
    .bind(spot.earnings)
    .bind(spot.status)
    .bind(spot.created_at)
    .fetch_one(&mut **tx)
    .await?;

    Ok(result)
}

#[async_trait]
impl SpotRepository for PgSpotRepository {
    async fn insert(&self, spot: &Spot) -> AppResult<Spot> {
        let mut tx = self.pool.begin().await?;
        let saved = insert_spot(&mut tx, spot).await?;
        tx.commit().await?;
        Ok(saved)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Spot>> {
        let result = sqlx::query_as::<_, Spot>("SELECT * FROM parking_spots WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(result)
    }

    async fn list_approved(&self) -> AppResult<Vec<Spot>> {
        let result = sqlx::query_as::<_, Spot>(
            "SELECT * FROM parking_spots WHERE status = 'approved' ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(result)
    }

    async fn list_all(&self, q: Option<&str>) -> AppResult<Vec<Spot>> {
        let result = match q {
            Some(q) => {
                sqlx::query_as::<_, Spot>(
                    r#"
                    SELECT * FROM parking_spots
                    WHERE name ILIKE $1 OR owner_email ILIKE $1
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(like_pattern(q))
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Spot>("SELECT * FROM parking_spots ORDER BY created_at DESC")
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(result)
    }

    async fn list_by_owner(&self, owner_email: &str) -> AppResult<Vec<Spot>> {
        let result = sqlx::query_as::<_, Spot>(
            "SELECT * FROM parking_spots WHERE owner_email = $1 ORDER BY created_at DESC",
        )
        .bind(owner_email)
        .fetch_all(&self.pool)
        .await?;

        Ok(result)
    }

    async fn zones(&self) -> AppResult<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT DISTINCT zone FROM parking_spots WHERE status = 'approved' ORDER BY zone",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(zone,)| zone).collect())
    }

    async fn reviews(&self, spot_id: Uuid) -> AppResult<Vec<Review>> {
        let result = sqlx::query_as::<_, Review>(
            "SELECT * FROM reviews WHERE spot_id = $1 ORDER BY created_at DESC",
        )
        .bind(spot_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(result)
    }
}
