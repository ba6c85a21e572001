use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use lodgia_domain::city::City;
use lodgia_domain::repository::{CityRepository, Page, StoreError};

use crate::database::map_sqlx_err;

pub struct PgCityRepository {
    pool: PgPool,
}

impl PgCityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CityRow {
    id: Uuid,
    name: String,
    country: String,
    postal_code: String,
    created_at: DateTime<Utc>,
}

impl From<CityRow> for City {
    fn from(row: CityRow) -> Self {
        City {
            id: row.id,
            name: row.name,
            country: row.country,
            postal_code: row.postal_code,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl CityRepository for PgCityRepository {
    async fn create(&self, city: City) -> Result<City, StoreError> {
        sqlx::query(
            "INSERT INTO cities (id, name, country, postal_code, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(city.id)
        .bind(&city.name)
        .bind(&city.country)
        .bind(&city.postal_code)
        .bind(city.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(city)
    }

    async fn get(&self, id: Uuid) -> Result<City, StoreError> {
        let row: Option<CityRow> = sqlx::query_as(
            "SELECT id, name, country, postal_code, created_at FROM cities WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        row.map(Into::into).ok_or(StoreError::NotFound)
    }

    async fn list(&self, page: Page) -> Result<Vec<City>, StoreError> {
        let rows: Vec<CityRow> = sqlx::query_as(
            "SELECT id, name, country, postal_code, created_at FROM cities ORDER BY created_at, id LIMIT $1 OFFSET $2",
        )
        .bind(page.size as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update(&self, city: City) -> Result<(), StoreError> {
        let result =
            sqlx::query("UPDATE cities SET name = $2, country = $3, postal_code = $4 WHERE id = $1")
                .bind(city.id)
                .bind(&city.name)
                .bind(&city.country)
                .bind(&city.postal_code)
                .execute(&self.pool)
                .await
                .map_err(map_sqlx_err)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM cities WHERE id = $1")
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
