use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A time-bounded promotional discount tied to a hotel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturedDeal {
    pub id: Uuid,
    pub hotel_id: Uuid,
    /// Fraction in [0, 1). Enforced where deals enter the system.
    pub discount: f64,
    pub description: String,
    pub promo_code: String,
    pub end_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl FeaturedDeal {
    pub fn new(
        hotel_id: Uuid,
        discount: f64,
        description: String,
        promo_code: String,
        end_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            hotel_id,
            discount,
            description,
            promo_code,
            end_date,
            created_at: Utc::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.end_date
    }
}
