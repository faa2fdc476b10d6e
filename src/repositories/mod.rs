//! Repositorios
//!
//! Cada entidad tiene un trait con dos implementaciones: `Pg*Repository`
//! (sqlx sobre PostgreSQL) y `MemoryStore` (en proceso, para
//! `STORAGE_BACKEND=memory` y los tests). Las operaciones de varias
//! escrituras son unidades atómicas en ambas.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{
    notification::OwnerNotification,
    reservation::{Reservation, ReservationStatus, StatusChange},
    review::Review,
    spot::Spot,
    spot_request::{RequestStatus, SpotRequest},
    user::User,
};
use crate::utils::errors::AppResult;

pub mod memory;
pub mod notification_repository;
pub mod reservation_repository;
pub mod spot_repository;
pub mod spot_request_repository;
pub mod user_repository;


pub use memory::MemoryStore;
pub use notification_repository::PgNotificationRepository;
pub use reservation_repository::PgReservationRepository;
pub use spot_repository::PgSpotRepository;
pub use spot_request_repository::PgSpotRequestRepository;
pub use user_repository::PgUserRepository;

/// Resultado de una decisión del admin sobre una solicitud
#[derive(Debug, Clone)]
pub struct Decision {
    pub request: SpotRequest,
    pub spot: Option<Spot>,
    pub notification: OwnerNotification,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Falla con `Conflict` si el email ya existe
    async fn create(&self, user: &User) -> AppResult<User>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
    /// `q` filtra por nombre o email (ya en minúsculas)
    async fn list(&self, q: Option<&str>) -> AppResult<Vec<User>>;
}

#[async_trait]
pub trait SpotRepository: Send + Sync {
    async fn insert(&self, spot: &Spot) -> AppResult<Spot>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Spot>>;
    /// Spots publicados (status approved)
    async fn list_approved(&self) -> AppResult<Vec<Spot>>;
    async fn list_all(&self, q: Option<&str>) -> AppResult<Vec<Spot>>;
    async fn list_by_owner(&self, owner_email: &str) -> AppResult<Vec<Spot>>;
    async fn zones(&self) -> AppResult<Vec<String>>;
    /// Reseñas del spot, más recientes primero
    async fn reviews(&self, spot_id: Uuid) -> AppResult<Vec<Review>>;
}

#[async_trait]
pub trait SpotRequestRepository: Send + Sync {
    async fn create(&self, request: &SpotRequest) -> AppResult<SpotRequest>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<SpotRequest>>;
    async fn list(&self, status: Option<RequestStatus>) -> AppResult<Vec<SpotRequest>>;
    async fn list_by_owner(
        &self,
        owner_email: &str,
        status: Option<RequestStatus>,
    ) -> AppResult<Vec<SpotRequest>>;
    /// pending → approved + spot + notificación, todo o nada
    async fn approve(&self, id: Uuid) -> AppResult<Decision>;
    /// pending → rejected + notificación, todo o nada
    async fn reject(&self, id: Uuid, reason: &str) -> AppResult<Decision>;
}

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Ocupa una celda, inserta la reserva y suma los ingresos del spot.
    /// Falla con `CapacityExhausted` si el spot está lleno.
    async fn book(&self, reservation: &Reservation) -> AppResult<Reservation>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Reservation>>;
    /// Reservas del usuario, más recientes primero
    async fn list_by_user(&self, user_email: &str) -> AppResult<Vec<Reservation>>;
    async fn list_all(&self, q: Option<&str>) -> AppResult<Vec<Reservation>>;
    /// Aplica la transición y libera la celda si la reserva la ocupaba
    async fn set_status(&self, id: Uuid, next: ReservationStatus) -> AppResult<StatusChange>;
    /// Inserta la reseña, marca la reserva y recalcula el rating del spot
    async fn add_review(&self, review: &Review) -> AppResult<Review>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<OwnerNotification>>;
    /// Notificaciones no descartadas del owner, más recientes primero
    async fn list_active(&self, owner_email: &str) -> AppResult<Vec<OwnerNotification>>;
    /// Idempotente
    async fn dismiss(&self, id: Uuid) -> AppResult<OwnerNotification>;
}

/// Conjunto de repositorios compartido por los controladores
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub spots: Arc<dyn SpotRepository>,
    pub requests: Arc<dyn SpotRequestRepository>,
    pub reservations: Arc<dyn ReservationRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            spots: Arc::new(PgSpotRepository::new(pool.clone())),
            requests: Arc::new(PgSpotRequestRepository::new(pool.clone())),
            reservations: Arc::new(PgReservationRepository::new(pool.clone())),
            notifications: Arc::new(PgNotificationRepository::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        Self::from_memory(Arc::new(MemoryStore::new()))
    }

    pub fn from_memory(store: Arc<MemoryStore>) -> Self {
        Self {
            users: store.clone(),
            spots: store.clone(),
            requests: store.clone(),
            reservations: store.clone(),
            notifications: store,
        }
    }
}

/// Violación de índice único en PostgreSQL (23505)
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

/// Patrón ILIKE para búsquedas por substring
pub(crate) fn like_pattern(q: &str) -> String {
    format!("%{}%", q.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_"))
}
