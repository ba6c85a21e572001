use async_trait::async_trait;
use uuid::Uuid;

use crate::city::City;
use crate::deal::FeaturedDeal;
use crate::hotel::Hotel;
use crate::reservation::{Reservation, StaySpan};
use crate::room::Room;
use crate::user::User;

/// Storage failures surfaced to the logic layer. `DuplicateReference`
/// must stay distinct from other failures: the admission coordinator
/// retries reference generation on it and nothing else.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("duplicate booking reference")]
    DuplicateReference,

    #[error("duplicate key: {0}")]
    Duplicate(String),

    #[error("storage failure: {0}")]
    Backend(String),
}

/// Offset pagination with the page-size cap the API enforces.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub number: u32,
    pub size: u32,
}

impl Page {
    pub const MAX_SIZE: u32 = 10;

    pub fn offset(&self) -> u32 {
        self.number * self.size
    }
}

impl Default for Page {
    fn default() -> Self {
        Self { number: 0, size: 5 }
    }
}

#[async_trait]
pub trait CityRepository: Send + Sync {
    async fn create(&self, city: City) -> Result<City, StoreError>;
    async fn get(&self, id: Uuid) -> Result<City, StoreError>;
    async fn list(&self, page: Page) -> Result<Vec<City>, StoreError>;
    async fn update(&self, city: City) -> Result<(), StoreError>;
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}

#[async_trait]
pub trait HotelRepository: Send + Sync {
    async fn create(&self, hotel: Hotel) -> Result<Hotel, StoreError>;
    async fn get(&self, id: Uuid) -> Result<Hotel, StoreError>;
    async fn list(&self, page: Page) -> Result<Vec<Hotel>, StoreError>;
    async fn list_by_city(&self, city_id: Uuid, page: Page) -> Result<Vec<Hotel>, StoreError>;
    async fn update(&self, hotel: Hotel) -> Result<(), StoreError>;
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}

#[async_trait]
pub trait RoomRepository: Send + Sync {
    async fn create(&self, room: Room) -> Result<Room, StoreError>;
    async fn get(&self, id: Uuid) -> Result<Room, StoreError>;
    async fn list(&self, page: Page) -> Result<Vec<Room>, StoreError>;
    async fn list_by_hotel(&self, hotel_id: Uuid, page: Page) -> Result<Vec<Room>, StoreError>;
    async fn update(&self, room: Room) -> Result<(), StoreError>;
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}

#[async_trait]
pub trait FeaturedDealRepository: Send + Sync {
    async fn create(&self, deal: FeaturedDeal) -> Result<FeaturedDeal, StoreError>;
    async fn get(&self, id: Uuid) -> Result<FeaturedDeal, StoreError>;
    async fn list(&self, page: Page) -> Result<Vec<FeaturedDeal>, StoreError>;
    async fn update(&self, deal: FeaturedDeal) -> Result<(), StoreError>;
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;

    /// Resolve the deal a room participates in: room -> hotel -> newest
    /// non-expired deal for that hotel. `Ok(None)` when there is none.
    async fn find_for_room(&self, room_id: Uuid) -> Result<Option<FeaturedDeal>, StoreError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: User) -> Result<User, StoreError>;
    async fn get(&self, id: Uuid) -> Result<User, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
}

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Persist a new reservation. Must fail with
    /// `StoreError::DuplicateReference` when `reference_no` is taken.
    async fn insert(&self, reservation: Reservation) -> Result<Reservation, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Reservation, StoreError>;
    async fn list(&self, page: Page) -> Result<Vec<Reservation>, StoreError>;
    async fn list_for_room(&self, room_id: Uuid) -> Result<Vec<Reservation>, StoreError>;
    async fn update(&self, reservation: Reservation) -> Result<(), StoreError>;
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;

    /// True when an existing reservation for `room_id` overlaps `span`
    /// under half-open interval semantics. `exclude` drops one
    /// reservation from the scan (the reschedule path excludes itself).
    async fn conflict_exists(
        &self,
        room_id: Uuid,
        span: StaySpan,
        exclude: Option<Uuid>,
    ) -> Result<bool, StoreError>;
}
