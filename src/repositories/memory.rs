//! Almacenamiento en memoria
//!
//! Todas las tablas viven detrás de un único `RwLock`: cada operación de
//! escritura toma el lock una sola vez, así las unidades de varios pasos
//! (reservar, cambiar estado, reseñar, decidir) son atómicas.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    Decision, NotificationRepository, ReservationRepository, SpotRepository,
    SpotRequestRepository, UserRepository,
};
use crate::models::{
    notification::OwnerNotification,
    reservation::{Reservation, ReservationStatus, StatusChange},
    review::Review,
    spot::{average_rating, Spot, SpotStatus},
    spot_request::{RequestStatus, SpotRequest},
    user::User,
};
use crate::utils::errors::{conflict_error, not_found_error, AppError, AppResult};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    spots: HashMap<Uuid, Spot>,
    requests: HashMap<Uuid, SpotRequest>,
    reservations: HashMap<Uuid, Reservation>,
    reviews: Vec<Review>,
    notifications: HashMap<Uuid, OwnerNotification>,
}

impl Tables {
    /// Pasar la solicitud de pending al estado final
    fn decide(
        &mut self,
        id: Uuid,
        status: RequestStatus,
        reason: Option<&str>,
    ) -> AppResult<SpotRequest> {
        let request = self
            .requests
            .get_mut(&id)
            .ok_or_else(|| not_found_error("Spot request", &id.to_string()))?;

        if !request.is_pending() {
            return Err(AppError::Conflict(format!(
                "Spot request '{}' was already decided",
                id
            )));
        }

        request.status = status;
        request.rejection_reason = reason.map(str::to_string);
        request.decided_at = Some(Utc::now());
        Ok(request.clone())
    }
}

fn matches_term(term: Option<&str>, fields: &[&str]) -> bool {
    match term {
        Some(term) => fields.iter().any(|f| f.to_lowercase().contains(term)),
        None => true,
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: &User) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(conflict_error("User", "email", &user.email));
        }
        tables.users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn list(&self, q: Option<&str>) -> AppResult<Vec<User>> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables
            .users
            .values()
            .filter(|u| matches_term(q, &[u.name.as_str(), u.email.as_str()]))
            .cloned()
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }
}

#[async_trait]
impl SpotRepository for MemoryStore {
    async fn insert(&self, spot: &Spot) -> AppResult<Spot> {
        let mut tables = self.tables.write().await;
        tables.spots.insert(spot.id, spot.clone());
        Ok(spot.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Spot>> {
        Ok(self.tables.read().await.spots.get(&id).cloned())
    }

    async fn list_approved(&self) -> AppResult<Vec<Spot>> {
        let tables = self.tables.read().await;
        let mut spots: Vec<Spot> = tables
            .spots
            .values()
            .filter(|s| s.status == SpotStatus::Approved)
            .cloned()
            .collect();
        spots.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(spots)
    }

    async fn list_all(&self, q: Option<&str>) -> AppResult<Vec<Spot>> {
        let tables = self.tables.read().await;
        let mut spots: Vec<Spot> = tables
            .spots
            .values()
            .filter(|s| matches_term(q, &[s.name.as_str(), s.owner_email.as_str()]))
            .cloned()
            .collect();
        spots.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(spots)
    }

    async fn list_by_owner(&self, owner_email: &str) -> AppResult<Vec<Spot>> {
        let tables = self.tables.read().await;
        let mut spots: Vec<Spot> = tables
            .spots
            .values()
            .filter(|s| s.owner_email == owner_email)
            .cloned()
            .collect();
        spots.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(spots)
    }

    async fn zones(&self) -> AppResult<Vec<String>> {
        let tables = self.tables.read().await;
        let mut zones: Vec<String> = tables
            .spots
            .values()
            .filter(|s| s.status == SpotStatus::Approved)
            .map(|s| s.zone.clone())
            .collect();
        zones.sort();
        zones.dedup();
        Ok(zones)
    }

    async fn reviews(&self, spot_id: Uuid) -> AppResult<Vec<Review>> {
        let tables = self.tables.read().await;
        let mut reviews: Vec<Review> = tables
            .reviews
            .iter()
            .filter(|r| r.spot_id == spot_id)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reviews)
    }
}

#[async_trait]
impl SpotRequestRepository for MemoryStore {
    async fn create(&self, request: &SpotRequest) -> AppResult<SpotRequest> {
        let mut tables = self.tables.write().await;
        tables.requests.insert(request.id, request.clone());
        Ok(request.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<SpotRequest>> {
        Ok(self.tables.read().await.requests.get(&id).cloned())
    }

    async fn list(&self, status: Option<RequestStatus>) -> AppResult<Vec<SpotRequest>> {
        let tables = self.tables.read().await;
        let mut requests: Vec<SpotRequest> = tables
            .requests
            .values()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(requests)
    }

    async fn list_by_owner(
        &self,
        owner_email: &str,
        status: Option<RequestStatus>,
    ) -> AppResult<Vec<SpotRequest>> {
        let mut requests = SpotRequestRepository::list(self, status).await?;
        requests.retain(|r| r.owner_email == owner_email);
        Ok(requests)
    }

    async fn approve(&self, id: Uuid) -> AppResult<Decision> {
        let mut tables = self.tables.write().await;

        let request = tables.decide(id, RequestStatus::Approved, None)?;
        let spot = Spot::from_request(&request);
        let notification = OwnerNotification::approved(&request, spot.id);

        tables.spots.insert(spot.id, spot.clone());
        tables.notifications.insert(notification.id, notification.clone());

        Ok(Decision {
            request,
            spot: Some(spot),
            notification,
        })
    }

    async fn reject(&self, id: Uuid, reason: &str) -> AppResult<Decision> {
        let mut tables = self.tables.write().await;

        let request = tables.decide(id, RequestStatus::Rejected, Some(reason))?;
        let notification = OwnerNotification::rejected(&request, reason);
        tables.notifications.insert(notification.id, notification.clone());

        Ok(Decision {
            request,
            spot: None,
            notification,
        })
    }
}

#[async_trait]
impl ReservationRepository for MemoryStore {
    async fn book(&self, reservation: &Reservation) -> AppResult<Reservation> {
        let mut tables = self.tables.write().await;

        if tables.reservations.values().any(|r| r.reference == reservation.reference) {
            return Err(AppError::Conflict(format!(
                "Payment reference '{}' was already used",
                reservation.reference
            )));
        }

        let spot = tables
            .spots
            .get_mut(&reservation.spot_id)
            .filter(|s| s.status == SpotStatus::Approved)
            .ok_or_else(|| not_found_error("Spot", &reservation.spot_id.to_string()))?;

        if reservation.status.holds_capacity() {
            if !spot.available() {
                return Err(AppError::CapacityExhausted(format!(
                    "Spot '{}' has no free spaces",
                    spot.name
                )));
            }
            spot.occupied_spots += 1;
        }
        spot.earnings += reservation.amount;

        tables.reservations.insert(reservation.id, reservation.clone());
        Ok(reservation.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Reservation>> {
        Ok(self.tables.read().await.reservations.get(&id).cloned())
    }

    async fn list_by_user(&self, user_email: &str) -> AppResult<Vec<Reservation>> {
        let tables = self.tables.read().await;
        let mut reservations: Vec<Reservation> = tables
            .reservations
            .values()
            .filter(|r| r.user_email == user_email)
            .cloned()
            .collect();
        reservations.sort_by(|a, b| b.booked_at.cmp(&a.booked_at));
        Ok(reservations)
    }

    async fn list_all(&self, q: Option<&str>) -> AppResult<Vec<Reservation>> {
        let tables = self.tables.read().await;
        let mut reservations: Vec<Reservation> = tables
            .reservations
            .values()
            .filter(|r| matches_term(q, &[r.user_name.as_str(), r.user_email.as_str(), r.spot_name.as_str()]))
            .cloned()
            .collect();
        reservations.sort_by(|a, b| b.booked_at.cmp(&a.booked_at));
        Ok(reservations)
    }

    async fn set_status(&self, id: Uuid, next: ReservationStatus) -> AppResult<StatusChange> {
        let mut tables = self.tables.write().await;

        let current = tables
            .reservations
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found_error("Reservation", &id.to_string()))?;
        let previous = current.status;

        if !previous.can_transition_to(next) {
            return Err(AppError::InvalidTransition(previous.transition_error(next)));
        }

        // Validar la ocupación antes de escribir nada
        if previous.holds_capacity() && !next.holds_capacity() {
            let spot = tables
                .spots
                .get_mut(&current.spot_id)
                .ok_or_else(|| not_found_error("Spot", &current.spot_id.to_string()))?;
            if spot.occupied_spots <= 0 {
                return Err(AppError::Internal(format!(
                    "Occupancy underflow on spot '{}'",
                    spot.id
                )));
            }
            spot.occupied_spots -= 1;
        }

        let reservation = tables
            .reservations
            .get_mut(&id)
            .ok_or_else(|| not_found_error("Reservation", &id.to_string()))?;
        reservation.status = next;
        reservation.updated_at = Utc::now();

        Ok(StatusChange {
            reservation: reservation.clone(),
            previous,
        })
    }

    async fn add_review(&self, review: &Review) -> AppResult<Review> {
        let mut tables = self.tables.write().await;

        let reservation = tables
            .reservations
            .get(&review.reservation_id)
            .ok_or_else(|| not_found_error("Reservation", &review.reservation_id.to_string()))?;

        if reservation.status != ReservationStatus::Completed {
            return Err(AppError::InvalidTransition(format!(
                "Only completed reservations can be reviewed (reservation is {})",
                reservation.status.as_str()
            )));
        }
        if reservation.review_submitted
            || tables.reviews.iter().any(|r| r.reservation_id == review.reservation_id)
        {
            return Err(AppError::Conflict(
                "This reservation has already been reviewed".to_string(),
            ));
        }

        let spot_id = reservation.spot_id;
        let saved = Review { spot_id, ..review.clone() };
        tables.reviews.push(saved.clone());

        if let Some(reservation) = tables.reservations.get_mut(&review.reservation_id) {
            reservation.review_submitted = true;
            reservation.updated_at = Utc::now();
        }

        let ratings: Vec<i16> = tables
            .reviews
            .iter()
            .filter(|r| r.spot_id == spot_id)
            .map(|r| r.rating)
            .collect();
        if let Some(spot) = tables.spots.get_mut(&spot_id) {
            spot.rating = average_rating(&ratings);
            spot.review_count = ratings.len() as i32;
        }

        Ok(saved)
    }
}

#[async_trait]
impl NotificationRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<OwnerNotification>> {
        Ok(self.tables.read().await.notifications.get(&id).cloned())
    }

    async fn list_active(&self, owner_email: &str) -> AppResult<Vec<OwnerNotification>> {
        let tables = self.tables.read().await;
        let mut notifications: Vec<OwnerNotification> = tables
            .notifications
            .values()
            .filter(|n| n.owner_email == owner_email && !n.dismissed)
            .cloned()
            .collect();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notifications)
    }

    async fn dismiss(&self, id: Uuid) -> AppResult<OwnerNotification> {
        let mut tables = self.tables.write().await;
        let notification = tables
            .notifications
            .get_mut(&id)
            .ok_or_else(|| not_found_error("Notification", &id.to_string()))?;
        notification.dismissed = true;
        Ok(notification.clone())
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::models::notification::{NotificationKind, APPROVED_MESSAGE};
    use rust_decimal::Decimal;

    async fn occupancy(store: &MemoryStore, id: Uuid) -> i32 {
        SpotRepository::find_by_id(store, id).await.unwrap().unwrap().occupied_spots
    }

    #[tokio::test]
    async fn test_book_until_full_then_capacity_exhausted() {
        let store = MemoryStore::new();
        let spot = store.insert(&spot(2)).await.unwrap();

        store.book(&reservation(&spot, "a@x.co")).await.unwrap();
        store.book(&reservation(&spot, "b@x.co")).await.unwrap();

        let err = store.book(&reservation(&spot, "c@x.co")).await.unwrap_err();
        assert!(matches!(err, AppError::CapacityExhausted(_)));
        assert_eq!(occupancy(&store, spot.id).await, 2);
        assert_eq!(ReservationRepository::list_all(&store, None).await.unwrap().len(), 2);

        let saved = SpotRepository::find_by_id(&store, spot.id).await.unwrap().unwrap();
        assert_eq!(saved.earnings, Decimal::new(21000, 0));
        assert!(!saved.available());
    }

    #[tokio::test]
    async fn test_duplicate_reference_is_conflict() {
        let store = MemoryStore::new();
        let spot = store.insert(&spot(5)).await.unwrap();
        let first = reservation(&spot, "a@x.co");
        store.book(&first).await.unwrap();

        let mut second = reservation(&spot, "a@x.co");
        second.reference = first.reference.clone();
        let err = store.book(&second).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(occupancy(&store, spot.id).await, 1);
    }

    #[tokio::test]
    async fn test_occupancy_follows_book_complete_cancel_sequence() {
        let store = MemoryStore::new();
        let spot = store.insert(&spot(2)).await.unwrap();

        let r1 = store.book(&reservation(&spot, "a@x.co")).await.unwrap();
        let r2 = store.book(&reservation(&spot, "b@x.co")).await.unwrap();
        assert_eq!(occupancy(&store, spot.id).await, 2);

        store.set_status(r1.id, ReservationStatus::Completed).await.unwrap();
        assert_eq!(occupancy(&store, spot.id).await, 1);

        let change = store.set_status(r2.id, ReservationStatus::Cancelled).await.unwrap();
        assert_eq!(change.previous, ReservationStatus::Active);
        assert_eq!(occupancy(&store, spot.id).await, 0);

        // Nada sale de un estado terminal, y la ocupación no se toca
        let err = store.set_status(r1.id, ReservationStatus::Completed).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
        let err = store.set_status(r2.id, ReservationStatus::Active).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
        assert_eq!(occupancy(&store, spot.id).await, 0);

        // La celda liberada se puede volver a reservar
        store.book(&reservation(&spot, "c@x.co")).await.unwrap();
        assert_eq!(occupancy(&store, spot.id).await, 1);
    }

    #[tokio::test]
    async fn test_underflow_is_an_error_and_changes_nothing() {
        let store = MemoryStore::new();
        let spot = store.insert(&spot(1)).await.unwrap();
        let booked = store.book(&reservation(&spot, "a@x.co")).await.unwrap();

        // Corromper la ocupación a mano
        store.tables.write().await.spots.get_mut(&spot.id).unwrap().occupied_spots = 0;

        let err = store.set_status(booked.id, ReservationStatus::Completed).await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));

        let unchanged = ReservationRepository::find_by_id(&store, booked.id).await.unwrap().unwrap();
        assert_eq!(unchanged.status, ReservationStatus::Active);
        assert_eq!(occupancy(&store, spot.id).await, 0);
    }

    #[tokio::test]
    async fn test_review_once_and_rating_recomputed() {
        let store = MemoryStore::new();
        let spot = store.insert(&spot(3)).await.unwrap();
        let r1 = store.book(&reservation(&spot, "a@x.co")).await.unwrap();
        let r2 = store.book(&reservation(&spot, "b@x.co")).await.unwrap();

        // Una reserva activa no se puede reseñar
        let err = store.add_review(&review(&r1, 5)).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));

        store.set_status(r1.id, ReservationStatus::Completed).await.unwrap();
        store.set_status(r2.id, ReservationStatus::Completed).await.unwrap();

        store.add_review(&review(&r1, 5)).await.unwrap();
        store.add_review(&review(&r2, 4)).await.unwrap();

        let err = store.add_review(&review(&r1, 1)).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let saved = SpotRepository::find_by_id(&store, spot.id).await.unwrap().unwrap();
        assert_eq!(saved.rating, 4.5);
        assert_eq!(saved.review_count, 2);
        assert_eq!(store.reviews(spot.id).await.unwrap().len(), 2);

        let flagged = ReservationRepository::find_by_id(&store, r1.id).await.unwrap().unwrap();
        assert!(flagged.review_submitted);
    }

    #[tokio::test]
    async fn test_approve_creates_one_spot_and_one_notification() {
        let store = MemoryStore::new();
        let request = SpotRequestRepository::create(&store, &spot_request("olga@parkly.co", 4))
            .await
            .unwrap();

        let decision = store.approve(request.id).await.unwrap();
        let spot = decision.spot.unwrap();
        assert_eq!(decision.request.status, RequestStatus::Approved);
        assert!(spot.verified);
        assert_eq!(spot.request_id, Some(request.id));
        assert_eq!(decision.notification.kind, NotificationKind::Approved);
        assert_eq!(decision.notification.message, APPROVED_MESSAGE);

        assert_eq!(SpotRepository::list_by_owner(&store, "olga@parkly.co").await.unwrap().len(), 1);
        assert_eq!(store.list_active("olga@parkly.co").await.unwrap().len(), 1);

        // Una segunda decisión no crea nada
        let err = store.approve(request.id).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        let err = store.reject(request.id, "Duplicate listing detected").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(SpotRepository::list_by_owner(&store, "olga@parkly.co").await.unwrap().len(), 1);
        assert_eq!(store.list_active("olga@parkly.co").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reject_creates_no_spot_and_carries_reason() {
        let store = MemoryStore::new();
        let request = SpotRequestRepository::create(&store, &spot_request("olga@parkly.co", 4))
            .await
            .unwrap();

        let decision = store.reject(request.id, "Address cannot be verified").await.unwrap();
        assert!(decision.spot.is_none());
        assert_eq!(decision.request.rejection_reason.as_deref(), Some("Address cannot be verified"));
        assert_eq!(decision.notification.kind, NotificationKind::Rejected);
        assert_eq!(decision.notification.reason.as_deref(), Some("Address cannot be verified"));

        assert!(SpotRepository::list_by_owner(&store, "olga@parkly.co").await.unwrap().is_empty());
        assert!(matches!(
            store.approve(Uuid::new_v4()).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_dismiss_is_idempotent() {
        let store = MemoryStore::new();
        let request = SpotRequestRepository::create(&store, &spot_request("olga@parkly.co", 1))
            .await
            .unwrap();
        let decision = store.approve(request.id).await.unwrap();

        store.dismiss(decision.notification.id).await.unwrap();
        let again = store.dismiss(decision.notification.id).await.unwrap();
        assert!(again.dismissed);
        assert!(store.list_active("olga@parkly.co").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let store = MemoryStore::new();
        let user = User::new("Ana".into(), "ana@parkly.co".into(), None, "h".into(), crate::models::user::UserRole::Client);
        UserRepository::create(&store, &user).await.unwrap();

        let twin = User::new("Ana 2".into(), "ANA@parkly.co".into(), None, "h".into(), crate::models::user::UserRole::Owner);
        let err = UserRepository::create(&store, &twin).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
