use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use lodgia_domain::events::{NotificationSink, ReservationConfirmed};
use lodgia_domain::repository::{
    FeaturedDealRepository, ReservationRepository, RoomRepository, StoreError,
};
use lodgia_domain::reservation::{Reservation, StaySpan};

use crate::pricing;
use crate::reference;

/// Attempts at minting a booking reference before the request fails.
const MAX_REFERENCE_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub room_id: Uuid,
    pub user_id: Uuid,
    pub span: StaySpan,
    pub use_featured_deal: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum AdmissionError {
    #[error("check-out must fall after check-in and the stay must start in the future")]
    InvalidInterval,

    #[error("room is not open for booking")]
    RoomUnavailable,

    #[error("room is already reserved in the requested period")]
    DateConflict,

    #[error("no featured deal exists for this room")]
    DealNotFound,

    #[error("the featured deal for this room has ended")]
    DealExpired,

    #[error("could not allocate a unique booking reference")]
    ReferenceCollision,

    #[error("record not found")]
    NotFound,

    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl From<StoreError> for AdmissionError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => AdmissionError::NotFound,
            other => AdmissionError::Persistence(other.to_string()),
        }
    }
}

/// Orchestrates reservation admission end to end: validate the request,
/// check the interval against existing bookings, price the stay, mint a
/// reference and commit — or reject with one of the `AdmissionError`
/// kinds. Nothing is persisted on any rejection path.
///
/// The check-then-commit sequence is a classic race: two requests for
/// the same room can both pass the overlap check and then both insert.
/// Admission therefore holds a per-room async mutex across the overlap
/// check and the insert, so requests for the same room serialize while
/// different rooms proceed in parallel. The store's unique constraint
/// on the reference code covers the remaining step-4 collision window.
pub struct AdmissionCoordinator {
    rooms: Arc<dyn RoomRepository>,
    deals: Arc<dyn FeaturedDealRepository>,
    reservations: Arc<dyn ReservationRepository>,
    notifier: Arc<dyn NotificationSink>,
    room_locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl AdmissionCoordinator {
    pub fn new(
        rooms: Arc<dyn RoomRepository>,
        deals: Arc<dyn FeaturedDealRepository>,
        reservations: Arc<dyn ReservationRepository>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            rooms,
            deals,
            reservations,
            notifier,
            room_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Admit a new reservation. Exactly one reservation row is created
    /// per successful call; the confirmation notification is dispatched
    /// after commit and never affects the outcome.
    pub async fn book(&self, req: BookingRequest) -> Result<Reservation, AdmissionError> {
        validate_span(&req.span)?;

        let room = self.rooms.get(req.room_id).await?;
        if !room.available {
            return Err(AdmissionError::RoomUnavailable);
        }

        let lock = self.room_lock(room.id).await;
        let _serialized = lock.lock().await;

        if self
            .reservations
            .conflict_exists(room.id, req.span, None)
            .await?
        {
            return Err(AdmissionError::DateConflict);
        }

        let discount = self.resolve_discount(&req).await?;
        let price_cents = pricing::apply_discount(room.rate_cents, discount);

        let reservation = self.commit(&req, price_cents).await?;

        info!(
            reference = %reservation.reference_no,
            room = %reservation.room_id,
            "reservation committed"
        );
        self.dispatch_notification(&reservation);

        Ok(reservation)
    }

    /// Move an existing reservation to a new room and/or stay. Runs the
    /// same checks as `book` from scratch, excluding the reservation
    /// itself from the overlap scan, and recomputes the price. The
    /// booking reference is stable across reschedules.
    pub async fn reschedule(
        &self,
        reservation_id: Uuid,
        req: BookingRequest,
    ) -> Result<Reservation, AdmissionError> {
        validate_span(&req.span)?;

        let existing = self.reservations.get(reservation_id).await?;

        let room = self.rooms.get(req.room_id).await?;
        if !room.available {
            return Err(AdmissionError::RoomUnavailable);
        }

        let lock = self.room_lock(room.id).await;
        let _serialized = lock.lock().await;

        if self
            .reservations
            .conflict_exists(room.id, req.span, Some(reservation_id))
            .await?
        {
            return Err(AdmissionError::DateConflict);
        }

        let discount = self.resolve_discount(&req).await?;

        let updated = Reservation {
            room_id: req.room_id,
            user_id: req.user_id,
            span: req.span,
            price_cents: pricing::apply_discount(room.rate_cents, discount),
            is_featured_deal: req.use_featured_deal,
            ..existing
        };
        self.reservations.update(updated.clone()).await?;

        Ok(updated)
    }

    async fn resolve_discount(&self, req: &BookingRequest) -> Result<f64, AdmissionError> {
        if !req.use_featured_deal {
            return Ok(0.0);
        }

        let deal = self
            .deals
            .find_for_room(req.room_id)
            .await?
            .ok_or(AdmissionError::DealNotFound)?;

        if deal.is_expired() {
            return Err(AdmissionError::DealExpired);
        }

        Ok(deal.discount)
    }

    async fn commit(
        &self,
        req: &BookingRequest,
        price_cents: i32,
    ) -> Result<Reservation, AdmissionError> {
        for _ in 0..MAX_REFERENCE_ATTEMPTS {
            let candidate = Reservation {
                id: Uuid::new_v4(),
                reference_no: reference::generate(),
                room_id: req.room_id,
                user_id: req.user_id,
                span: req.span,
                price_cents,
                is_featured_deal: req.use_featured_deal,
                created_at: Utc::now(),
            };

            match self.reservations.insert(candidate).await {
                Ok(created) => return Ok(created),
                Err(StoreError::DuplicateReference) => continue,
                Err(other) => return Err(other.into()),
            }
        }

        Err(AdmissionError::ReferenceCollision)
    }

    fn dispatch_notification(&self, reservation: &Reservation) {
        let notifier = Arc::clone(&self.notifier);
        let event = ReservationConfirmed::from(reservation);

        tokio::spawn(async move {
            if let Err(e) = notifier.notify(event).await {
                warn!("reservation confirmation delivery failed: {}", e);
            }
        });
    }

    async fn room_lock(&self, room_id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.room_locks.lock().await;
        Arc::clone(locks.entry(room_id).or_default())
    }
}

fn validate_span(span: &StaySpan) -> Result<(), AdmissionError> {
    if !span.is_well_formed() {
        return Err(AdmissionError::InvalidInterval);
    }

    // The original validation requires strictly future dates.
    if span.check_in <= Utc::now().date_naive() {
        return Err(AdmissionError::InvalidInterval);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{Duration, NaiveDate};
    use lodgia_domain::deal::FeaturedDeal;
    use lodgia_domain::room::{Room, RoomType};
    use lodgia_store::memory::MemoryStore;
    use lodgia_store::notifier::LogNotifier;
    use std::error::Error;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn future_date(days: i64) -> NaiveDate {
        Utc::now().date_naive() + Duration::days(days)
    }

    fn span(from_days: i64, to_days: i64) -> StaySpan {
        StaySpan::new(future_date(from_days), future_date(to_days))
    }

    async fn make_room(store: &Arc<MemoryStore>, rate_cents: i32) -> Room {
        let room = Room::new(
            Uuid::new_v4(),
            "713".to_string(),
            RoomType::Double,
            2,
            1,
            rate_cents,
        );
        RoomRepository::create(store.as_ref(), room).await.unwrap()
    }

    fn coordinator(store: &Arc<MemoryStore>) -> AdmissionCoordinator {
        AdmissionCoordinator::new(
            store.clone(),
            store.clone(),
            store.clone(),
            Arc::new(LogNotifier),
        )
    }

    fn request(room: &Room, span: StaySpan) -> BookingRequest {
        BookingRequest {
            room_id: room.id,
            user_id: Uuid::new_v4(),
            span,
            use_featured_deal: false,
        }
    }

    #[tokio::test]
    async fn test_book_commits_for_open_room() {
        let store = Arc::new(MemoryStore::new());
        let room = make_room(&store, 10000).await;
        let coordinator = coordinator(&store);

        let reservation = coordinator
            .book(request(&room, span(10, 12)))
            .await
            .unwrap();

        // Priced at the nightly rate with no discount
        assert_eq!(reservation.price_cents, 10000);
        assert!(reservation.reference_no.starts_with("REF-"));
        assert!(!reservation.is_featured_deal);

        let stored = ReservationRepository::get(store.as_ref(), reservation.id)
            .await
            .unwrap();
        assert_eq!(stored.reference_no, reservation.reference_no);
    }

    #[tokio::test]
    async fn test_overlapping_request_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let room = make_room(&store, 10000).await;
        let coordinator = coordinator(&store);

        coordinator
            .book(request(&room, span(10, 12)))
            .await
            .unwrap();

        let err = coordinator
            .book(request(&room, span(11, 13)))
            .await
            .unwrap_err();
        assert!(matches!(err, AdmissionError::DateConflict));

        // Exactly one reservation persisted
        let all = store.list_for_room(room.id).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_adjacent_stay_is_accepted() {
        let store = Arc::new(MemoryStore::new());
        let room = make_room(&store, 10000).await;
        let coordinator = coordinator(&store);

        coordinator
            .book(request(&room, span(10, 12)))
            .await
            .unwrap();

        // Starts exactly at the first stay's check-out
        coordinator
            .book(request(&room, span(12, 14)))
            .await
            .unwrap();

        let all = store.list_for_room(room.id).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_deal_discount_applies() {
        let store = Arc::new(MemoryStore::new());
        let room = make_room(&store, 10000).await;
        let deal = FeaturedDeal::new(
            room.hotel_id,
            0.2,
            "Winter special".to_string(),
            "WINTER20".to_string(),
            Utc::now() + Duration::days(30),
        );
        FeaturedDealRepository::create(store.as_ref(), deal)
            .await
            .unwrap();

        let coordinator = coordinator(&store);
        let mut req = request(&room, span(10, 12));
        req.use_featured_deal = true;

        let reservation = coordinator.book(req).await.unwrap();

        assert_eq!(reservation.price_cents, 8000);
        assert!(reservation.is_featured_deal);
    }

    #[tokio::test]
    async fn test_expired_deal_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let room = make_room(&store, 10000).await;
        let deal = FeaturedDeal::new(
            room.hotel_id,
            0.2,
            "Old promo".to_string(),
            "OLD20".to_string(),
            Utc::now() - Duration::days(1),
        );
        FeaturedDealRepository::create(store.as_ref(), deal)
            .await
            .unwrap();

        let coordinator = coordinator(&store);
        let mut req = request(&room, span(10, 12));
        req.use_featured_deal = true;

        let err = coordinator.book(req).await.unwrap_err();
        assert!(matches!(err, AdmissionError::DealExpired));
        assert!(store.list_for_room(room.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_deal_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let room = make_room(&store, 10000).await;
        let coordinator = coordinator(&store);

        let mut req = request(&room, span(10, 12));
        req.use_featured_deal = true;

        let err = coordinator.book(req).await.unwrap_err();
        assert!(matches!(err, AdmissionError::DealNotFound));
    }

    #[tokio::test]
    async fn test_unavailable_room_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let mut room = make_room(&store, 10000).await;
        room.available = false;
        RoomRepository::update(store.as_ref(), room.clone())
            .await
            .unwrap();

        let coordinator = coordinator(&store);
        let err = coordinator
            .book(request(&room, span(10, 12)))
            .await
            .unwrap_err();

        assert!(matches!(err, AdmissionError::RoomUnavailable));
    }

    #[tokio::test]
    async fn test_unknown_room_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let coordinator = coordinator(&store);

        let req = BookingRequest {
            room_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            span: span(10, 12),
            use_featured_deal: false,
        };

        let err = coordinator.book(req).await.unwrap_err();
        assert!(matches!(err, AdmissionError::NotFound));
    }

    #[tokio::test]
    async fn test_malformed_or_past_interval_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let room = make_room(&store, 10000).await;
        let coordinator = coordinator(&store);

        // check-out before check-in
        let err = coordinator
            .book(request(&room, span(12, 10)))
            .await
            .unwrap_err();
        assert!(matches!(err, AdmissionError::InvalidInterval));

        // zero-length stay
        let err = coordinator
            .book(request(&room, span(10, 10)))
            .await
            .unwrap_err();
        assert!(matches!(err, AdmissionError::InvalidInterval));

        // starts in the past
        let err = coordinator
            .book(request(&room, span(-2, 3)))
            .await
            .unwrap_err();
        assert!(matches!(err, AdmissionError::InvalidInterval));
    }

    #[tokio::test]
    async fn test_concurrent_requests_commit_exactly_once() {
        let store = Arc::new(MemoryStore::new());
        let room = make_room(&store, 10000).await;
        let coordinator = Arc::new(coordinator(&store));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let coordinator = Arc::clone(&coordinator);
            let req = request(&room, span(10, 12));
            handles.push(tokio::spawn(async move { coordinator.book(req).await }));
        }

        let mut committed = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => committed += 1,
                Err(AdmissionError::DateConflict) => conflicts += 1,
                Err(other) => panic!("unexpected admission outcome: {other}"),
            }
        }

        assert_eq!(committed, 1);
        assert_eq!(conflicts, 7);
        assert_eq!(store.list_for_room(room.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reschedule_ignores_its_own_span() {
        let store = Arc::new(MemoryStore::new());
        let room = make_room(&store, 10000).await;
        let coordinator = coordinator(&store);

        let reservation = coordinator
            .book(request(&room, span(10, 14)))
            .await
            .unwrap();

        // Shifted stay overlaps the reservation's own current span
        let moved = coordinator
            .reschedule(reservation.id, request(&room, span(12, 16)))
            .await
            .unwrap();

        assert_eq!(moved.id, reservation.id);
        assert_eq!(moved.reference_no, reservation.reference_no);
        assert_eq!(moved.span, span(12, 16));
    }

    #[tokio::test]
    async fn test_reschedule_conflicts_with_other_reservations() {
        let store = Arc::new(MemoryStore::new());
        let room = make_room(&store, 10000).await;
        let coordinator = coordinator(&store);

        coordinator
            .book(request(&room, span(10, 12)))
            .await
            .unwrap();
        let second = coordinator
            .book(request(&room, span(20, 22)))
            .await
            .unwrap();

        let err = coordinator
            .reschedule(second.id, request(&room, span(11, 13)))
            .await
            .unwrap_err();
        assert!(matches!(err, AdmissionError::DateConflict));
    }

    /// Store wrapper that reports a reference collision for the first
    /// `failures` inserts, then delegates.
    struct CollidingStore {
        inner: Arc<MemoryStore>,
        failures: AtomicU32,
    }

    #[async_trait]
    impl ReservationRepository for CollidingStore {
        async fn insert(&self, reservation: Reservation) -> Result<Reservation, StoreError> {
            if self.failures.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n > 0).then(|| n - 1)
            })
            .is_ok()
            {
                return Err(StoreError::DuplicateReference);
            }
            self.inner.insert(reservation).await
        }

        async fn get(&self, id: Uuid) -> Result<Reservation, StoreError> {
            ReservationRepository::get(self.inner.as_ref(), id).await
        }

        async fn list(
            &self,
            page: lodgia_domain::repository::Page,
        ) -> Result<Vec<Reservation>, StoreError> {
            ReservationRepository::list(self.inner.as_ref(), page).await
        }

        async fn list_for_room(&self, room_id: Uuid) -> Result<Vec<Reservation>, StoreError> {
            self.inner.list_for_room(room_id).await
        }

        async fn update(&self, reservation: Reservation) -> Result<(), StoreError> {
            ReservationRepository::update(self.inner.as_ref(), reservation).await
        }

        async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
            ReservationRepository::delete(self.inner.as_ref(), id).await
        }

        async fn conflict_exists(
            &self,
            room_id: Uuid,
            span: StaySpan,
            exclude: Option<Uuid>,
        ) -> Result<bool, StoreError> {
            self.inner.conflict_exists(room_id, span, exclude).await
        }
    }

    #[tokio::test]
    async fn test_reference_collision_retries_then_succeeds() {
        let store = Arc::new(MemoryStore::new());
        let room = make_room(&store, 10000).await;

        let colliding = Arc::new(CollidingStore {
            inner: store.clone(),
            failures: AtomicU32::new(2),
        });
        let coordinator = AdmissionCoordinator::new(
            store.clone(),
            store.clone(),
            colliding,
            Arc::new(LogNotifier),
        );

        let reservation = coordinator
            .book(request(&room, span(10, 12)))
            .await
            .unwrap();
        assert!(reservation.reference_no.starts_with("REF-"));
    }

    #[tokio::test]
    async fn test_reference_collision_gives_up_after_bound() {
        let store = Arc::new(MemoryStore::new());
        let room = make_room(&store, 10000).await;

        let colliding = Arc::new(CollidingStore {
            inner: store.clone(),
            failures: AtomicU32::new(u32::MAX),
        });
        let coordinator = AdmissionCoordinator::new(
            store.clone(),
            store.clone(),
            colliding,
            Arc::new(LogNotifier),
        );

        let err = coordinator
            .book(request(&room, span(10, 12)))
            .await
            .unwrap_err();
        assert!(matches!(err, AdmissionError::ReferenceCollision));
        assert!(store.list_for_room(room.id).await.unwrap().is_empty());
    }

    /// Sink that forwards events over a channel so tests can observe the
    /// fire-and-forget dispatch.
    struct ChannelSink(tokio::sync::mpsc::UnboundedSender<ReservationConfirmed>);

    #[async_trait]
    impl NotificationSink for ChannelSink {
        async fn notify(
            &self,
            event: ReservationConfirmed,
        ) -> Result<(), Box<dyn Error + Send + Sync>> {
            self.0.send(event)?;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_notification_dispatched_after_commit() {
        let store = Arc::new(MemoryStore::new());
        let room = make_room(&store, 10000).await;

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let coordinator = AdmissionCoordinator::new(
            store.clone(),
            store.clone(),
            store.clone(),
            Arc::new(ChannelSink(tx)),
        );

        let reservation = coordinator
            .book(request(&room, span(10, 12)))
            .await
            .unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.reservation_id, reservation.id);
        assert_eq!(event.reference_no, reservation.reference_no);
    }
}
