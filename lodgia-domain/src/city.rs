use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct City {
    pub id: Uuid,
    pub name: String,
    pub country: String,
    pub postal_code: String,
    pub created_at: DateTime<Utc>,
}

impl City {
    pub fn new(name: String, country: String, postal_code: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            country,
            postal_code,
            created_at: Utc::now(),
        }
    }
}
