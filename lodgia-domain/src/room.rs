use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomType {
    Single,
    Double,
    Suite,
    Family,
}

impl RoomType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::Single => "SINGLE",
            RoomType::Double => "DOUBLE",
            RoomType::Suite => "SUITE",
            RoomType::Family => "FAMILY",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SINGLE" => Some(RoomType::Single),
            "DOUBLE" => Some(RoomType::Double),
            "SUITE" => Some(RoomType::Suite),
            "FAMILY" => Some(RoomType::Family),
            _ => None,
        }
    }
}

/// A bookable room. The booking core only reads `available` and
/// `rate_cents`; everything else is administrative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: Uuid,
    pub hotel_id: Uuid,
    pub room_number: String,
    pub room_type: RoomType,
    pub available: bool,
    pub adult_capacity: i32,
    pub children_capacity: i32,
    pub rate_cents: i32,
    pub created_at: DateTime<Utc>,
}

impl Room {
    pub fn new(
        hotel_id: Uuid,
        room_number: String,
        room_type: RoomType,
        adult_capacity: i32,
        children_capacity: i32,
        rate_cents: i32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            hotel_id,
            room_number,
            room_type,
            available: true,
            adult_capacity,
            children_capacity,
            rate_cents,
            created_at: Utc::now(),
        }
    }
}
