use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hotel {
    pub id: Uuid,
    pub name: String,
    pub rating: i32,
    pub city_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Hotel {
    pub fn new(name: String, rating: i32, city_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            rating,
            city_id,
            created_at: Utc::now(),
        }
    }
}
