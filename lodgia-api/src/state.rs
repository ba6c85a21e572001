use std::sync::Arc;

use lodgia_booking::AdmissionCoordinator;
use lodgia_domain::repository::{
    CityRepository, FeaturedDealRepository, HotelRepository, ReservationRepository,
    RoomRepository, UserRepository,
};

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub cities: Arc<dyn CityRepository>,
    pub hotels: Arc<dyn HotelRepository>,
    pub rooms: Arc<dyn RoomRepository>,
    pub deals: Arc<dyn FeaturedDealRepository>,
    pub users: Arc<dyn UserRepository>,
    pub reservations: Arc<dyn ReservationRepository>,
    pub booking: Arc<AdmissionCoordinator>,
    pub auth: AuthConfig,
}
