use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use lodgia_domain::city::City;
use lodgia_domain::deal::FeaturedDeal;
use lodgia_domain::hotel::Hotel;
use lodgia_domain::repository::{
    CityRepository, FeaturedDealRepository, HotelRepository, Page, ReservationRepository,
    RoomRepository, StoreError, UserRepository,
};
use lodgia_domain::reservation::{Reservation, StaySpan};
use lodgia_domain::room::Room;
use lodgia_domain::user::User;

/// In-memory implementation of every repository, one `HashMap` per
/// aggregate. Backs the logic-crate and API tests; the semantics match
/// the postgres repositories, including the distinct duplicate-reference
/// failure on insert.
#[derive(Default)]
pub struct MemoryStore {
    cities: RwLock<HashMap<Uuid, City>>,
    hotels: RwLock<HashMap<Uuid, Hotel>>,
    rooms: RwLock<HashMap<Uuid, Room>>,
    deals: RwLock<HashMap<Uuid, FeaturedDeal>>,
    users: RwLock<HashMap<Uuid, User>>,
    reservations: RwLock<HashMap<Uuid, Reservation>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn page_slice<T>(mut items: Vec<T>, page: Page) -> Vec<T> {
    let start = (page.offset() as usize).min(items.len());
    let end = (start + page.size as usize).min(items.len());
    items.drain(..start);
    items.truncate(end - start);
    items
}

#[async_trait]
impl CityRepository for MemoryStore {
    async fn create(&self, city: City) -> Result<City, StoreError> {
        self.cities.write().await.insert(city.id, city.clone());
        Ok(city)
    }

    async fn get(&self, id: Uuid) -> Result<City, StoreError> {
        self.cities
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list(&self, page: Page) -> Result<Vec<City>, StoreError> {
        let mut cities: Vec<City> = self.cities.read().await.values().cloned().collect();
        cities.sort_by_key(|c| (c.created_at, c.id));
        Ok(page_slice(cities, page))
    }

    async fn update(&self, city: City) -> Result<(), StoreError> {
        let mut cities = self.cities.write().await;
        if !cities.contains_key(&city.id) {
            return Err(StoreError::NotFound);
        }
        cities.insert(city.id, city);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.cities
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl HotelRepository for MemoryStore {
    async fn create(&self, hotel: Hotel) -> Result<Hotel, StoreError> {
        self.hotels.write().await.insert(hotel.id, hotel.clone());
        Ok(hotel)
    }

    async fn get(&self, id: Uuid) -> Result<Hotel, StoreError> {
        self.hotels
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list(&self, page: Page) -> Result<Vec<Hotel>, StoreError> {
        let mut hotels: Vec<Hotel> = self.hotels.read().await.values().cloned().collect();
        hotels.sort_by_key(|h| (h.created_at, h.id));
        Ok(page_slice(hotels, page))
    }

    async fn list_by_city(&self, city_id: Uuid, page: Page) -> Result<Vec<Hotel>, StoreError> {
        let mut hotels: Vec<Hotel> = self
            .hotels
            .read()
            .await
            .values()
            .filter(|h| h.city_id == city_id)
            .cloned()
            .collect();
        hotels.sort_by_key(|h| (h.created_at, h.id));
        Ok(page_slice(hotels, page))
    }

    async fn update(&self, hotel: Hotel) -> Result<(), StoreError> {
        let mut hotels = self.hotels.write().await;
        if !hotels.contains_key(&hotel.id) {
            return Err(StoreError::NotFound);
        }
        hotels.insert(hotel.id, hotel);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.hotels
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl RoomRepository for MemoryStore {
    async fn create(&self, room: Room) -> Result<Room, StoreError> {
        self.rooms.write().await.insert(room.id, room.clone());
        Ok(room)
    }

    async fn get(&self, id: Uuid) -> Result<Room, StoreError> {
        self.rooms
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list(&self, page: Page) -> Result<Vec<Room>, StoreError> {
        let mut rooms: Vec<Room> = self.rooms.read().await.values().cloned().collect();
        rooms.sort_by_key(|r| (r.created_at, r.id));
        Ok(page_slice(rooms, page))
    }

    async fn list_by_hotel(&self, hotel_id: Uuid, page: Page) -> Result<Vec<Room>, StoreError> {
        let mut rooms: Vec<Room> = self
            .rooms
            .read()
            .await
            .values()
            .filter(|r| r.hotel_id == hotel_id)
            .cloned()
            .collect();
        rooms.sort_by_key(|r| (r.created_at, r.id));
        Ok(page_slice(rooms, page))
    }

    async fn update(&self, room: Room) -> Result<(), StoreError> {
        let mut rooms = self.rooms.write().await;
        if !rooms.contains_key(&room.id) {
            return Err(StoreError::NotFound);
        }
        rooms.insert(room.id, room);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.rooms
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl FeaturedDealRepository for MemoryStore {
    async fn create(&self, deal: FeaturedDeal) -> Result<FeaturedDeal, StoreError> {
        self.deals.write().await.insert(deal.id, deal.clone());
        Ok(deal)
    }

    async fn get(&self, id: Uuid) -> Result<FeaturedDeal, StoreError> {
        self.deals
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list(&self, page: Page) -> Result<Vec<FeaturedDeal>, StoreError> {
        let mut deals: Vec<FeaturedDeal> = self.deals.read().await.values().cloned().collect();
        deals.sort_by_key(|d| (d.created_at, d.id));
        Ok(page_slice(deals, page))
    }

    async fn update(&self, deal: FeaturedDeal) -> Result<(), StoreError> {
        let mut deals = self.deals.write().await;
        if !deals.contains_key(&deal.id) {
            return Err(StoreError::NotFound);
        }
        deals.insert(deal.id, deal);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.deals
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn find_for_room(&self, room_id: Uuid) -> Result<Option<FeaturedDeal>, StoreError> {
        let hotel_id = match self.rooms.read().await.get(&room_id) {
            Some(room) => room.hotel_id,
            None => return Ok(None),
        };

        // Newest deal wins; expiry is the admission coordinator's check
        let deal = self
            .deals
            .read()
            .await
            .values()
            .filter(|d| d.hotel_id == hotel_id)
            .max_by_key(|d| (d.created_at, d.id))
            .cloned();

        Ok(deal)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: User) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate("users_email_key".to_string()));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get(&self, id: Uuid) -> Result<User, StoreError> {
        self.users
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }
}

#[async_trait]
impl ReservationRepository for MemoryStore {
    async fn insert(&self, reservation: Reservation) -> Result<Reservation, StoreError> {
        let mut reservations = self.reservations.write().await;
        if reservations
            .values()
            .any(|r| r.reference_no == reservation.reference_no)
        {
            return Err(StoreError::DuplicateReference);
        }
        reservations.insert(reservation.id, reservation.clone());
        Ok(reservation)
    }

    async fn get(&self, id: Uuid) -> Result<Reservation, StoreError> {
        self.reservations
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list(&self, page: Page) -> Result<Vec<Reservation>, StoreError> {
        let mut reservations: Vec<Reservation> =
            self.reservations.read().await.values().cloned().collect();
        reservations.sort_by_key(|r| (r.created_at, r.id));
        Ok(page_slice(reservations, page))
    }

    async fn list_for_room(&self, room_id: Uuid) -> Result<Vec<Reservation>, StoreError> {
        let mut reservations: Vec<Reservation> = self
            .reservations
            .read()
            .await
            .values()
            .filter(|r| r.room_id == room_id)
            .cloned()
            .collect();
        reservations.sort_by_key(|r| (r.span.check_in, r.id));
        Ok(reservations)
    }

    async fn update(&self, reservation: Reservation) -> Result<(), StoreError> {
        let mut reservations = self.reservations.write().await;
        if !reservations.contains_key(&reservation.id) {
            return Err(StoreError::NotFound);
        }
        reservations.insert(reservation.id, reservation);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.reservations
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn conflict_exists(
        &self,
        room_id: Uuid,
        span: StaySpan,
        exclude: Option<Uuid>,
    ) -> Result<bool, StoreError> {
        let conflict = self
            .reservations
            .read()
            .await
            .values()
            .filter(|r| r.room_id == room_id)
            .filter(|r| Some(r.id) != exclude)
            .any(|r| r.span.overlaps(&span));

        Ok(conflict)
    }
}
