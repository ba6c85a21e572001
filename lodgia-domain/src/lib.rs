pub mod city;
pub mod deal;
pub mod events;
pub mod hotel;
pub mod repository;
pub mod reservation;
pub mod room;
pub mod user;

pub use city::City;
pub use deal::FeaturedDeal;
pub use hotel::Hotel;
pub use reservation::{Reservation, StaySpan};
pub use room::{Room, RoomType};
pub use user::{Role, User};
