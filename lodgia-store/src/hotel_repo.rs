use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use lodgia_domain::hotel::Hotel;
use lodgia_domain::repository::{HotelRepository, Page, StoreError};

use crate::database::map_sqlx_err;

pub struct PgHotelRepository {
    pool: PgPool,
}

impl PgHotelRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct HotelRow {
    id: Uuid,
    name: String,
    rating: i32,
    city_id: Uuid,
    created_at: DateTime<Utc>,
}

impl From<HotelRow> for Hotel {
    fn from(row: HotelRow) -> Self {
        Hotel {
            id: row.id,
            name: row.name,
            rating: row.rating,
            city_id: row.city_id,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl HotelRepository for PgHotelRepository {
    async fn create(&self, hotel: Hotel) -> Result<Hotel, StoreError> {
        sqlx::query(
            "INSERT INTO hotels (id, name, rating, city_id, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(hotel.id)
        .bind(&hotel.name)
        .bind(hotel.rating)
        .bind(hotel.city_id)
        .bind(hotel.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(hotel)
    }

    async fn get(&self, id: Uuid) -> Result<Hotel, StoreError> {
        let row: Option<HotelRow> =
            sqlx::query_as("SELECT id, name, rating, city_id, created_at FROM hotels WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_err)?;

        row.map(Into::into).ok_or(StoreError::NotFound)
    }

    async fn list(&self, page: Page) -> Result<Vec<Hotel>, StoreError> {
        let rows: Vec<HotelRow> = sqlx::query_as(
            "SELECT id, name, rating, city_id, created_at FROM hotels ORDER BY created_at, id LIMIT $1 OFFSET $2",
        )
        .bind(page.size as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_by_city(&self, city_id: Uuid, page: Page) -> Result<Vec<Hotel>, StoreError> {
        let rows: Vec<HotelRow> = sqlx::query_as(
            "SELECT id, name, rating, city_id, created_at FROM hotels WHERE city_id = $1 ORDER BY created_at, id LIMIT $2 OFFSET $3",
        )
        .bind(city_id)
        .bind(page.size as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update(&self, hotel: Hotel) -> Result<(), StoreError> {
        let result =
            sqlx::query("UPDATE hotels SET name = $2, rating = $3, city_id = $4 WHERE id = $1")
                .bind(hotel.id)
                .bind(&hotel.name)
                .bind(hotel.rating)
                .bind(hotel.city_id)
                .execute(&self.pool)
                .await
                .map_err(map_sqlx_err)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM hotels WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
