use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use lodgia_domain::deal::FeaturedDeal;
use lodgia_domain::repository::{FeaturedDealRepository, Page, StoreError};

use crate::database::map_sqlx_err;

pub struct PgFeaturedDealRepository {
    pool: PgPool,
}

impl PgFeaturedDealRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct DealRow {
    id: Uuid,
    hotel_id: Uuid,
    discount: f64,
    description: String,
    promo_code: String,
    end_date: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl From<DealRow> for FeaturedDeal {
    fn from(row: DealRow) -> Self {
        FeaturedDeal {
            id: row.id,
            hotel_id: row.hotel_id,
            discount: row.discount,
            description: row.description,
            promo_code: row.promo_code,
            end_date: row.end_date,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl FeaturedDealRepository for PgFeaturedDealRepository {
    async fn create(&self, deal: FeaturedDeal) -> Result<FeaturedDeal, StoreError> {
        sqlx::query(
            "INSERT INTO featured_deals (id, hotel_id, discount, description, promo_code, end_date, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(deal.id)
        .bind(deal.hotel_id)
        .bind(deal.discount)
        .bind(&deal.description)
        .bind(&deal.promo_code)
        .bind(deal.end_date)
        .bind(deal.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(deal)
    }

    async fn get(&self, id: Uuid) -> Result<FeaturedDeal, StoreError> {
        let row: Option<DealRow> = sqlx::query_as(
            "SELECT id, hotel_id, discount, description, promo_code, end_date, created_at \
             FROM featured_deals WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        row.map(Into::into).ok_or(StoreError::NotFound)
    }

    async fn list(&self, page: Page) -> Result<Vec<FeaturedDeal>, StoreError> {
        let rows: Vec<DealRow> = sqlx::query_as(
            "SELECT id, hotel_id, discount, description, promo_code, end_date, created_at \
             FROM featured_deals ORDER BY created_at, id LIMIT $1 OFFSET $2",
        )
        .bind(page.size as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update(&self, deal: FeaturedDeal) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE featured_deals SET hotel_id = $2, discount = $3, description = $4, \
             promo_code = $5, end_date = $6 WHERE id = $1",
        )
        .bind(deal.id)
        .bind(deal.hotel_id)
        .bind(deal.discount)
        .bind(&deal.description)
        .bind(&deal.promo_code)
        .bind(deal.end_date)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM featured_deals WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn find_for_room(&self, room_id: Uuid) -> Result<Option<FeaturedDeal>, StoreError> {
        // Newest deal for the room's hotel; expiry is checked at admission
        let row: Option<DealRow> = sqlx::query_as(
            "SELECT d.id, d.hotel_id, d.discount, d.description, d.promo_code, d.end_date, d.created_at \
             FROM featured_deals d JOIN rooms r ON r.hotel_id = d.hotel_id \
             WHERE r.id = $1 ORDER BY d.created_at DESC, d.id DESC LIMIT 1",
        )
        .bind(room_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(row.map(Into::into))
    }
}
