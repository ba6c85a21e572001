use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use lodgia_domain::repository::{Page, RoomRepository, StoreError};
use lodgia_domain::room::{Room, RoomType};

use crate::database::map_sqlx_err;

pub struct PgRoomRepository {
    pool: PgPool,
}

impl PgRoomRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const ROOM_COLUMNS: &str = "id, hotel_id, room_number, room_type, available, adult_capacity, children_capacity, rate_cents, created_at";

#[derive(sqlx::FromRow)]
struct RoomRow {
    id: Uuid,
    hotel_id: Uuid,
    room_number: String,
    room_type: String,
    available: bool,
    adult_capacity: i32,
    children_capacity: i32,
    rate_cents: i32,
    created_at: DateTime<Utc>,
}

fn row_to_room(row: RoomRow) -> Result<Room, StoreError> {
    let room_type = RoomType::parse(&row.room_type)
        .ok_or_else(|| StoreError::Backend(format!("unknown room type: {}", row.room_type)))?;

    Ok(Room {
        id: row.id,
        hotel_id: row.hotel_id,
        room_number: row.room_number,
        room_type,
        available: row.available,
        adult_capacity: row.adult_capacity,
        children_capacity: row.children_capacity,
        rate_cents: row.rate_cents,
        created_at: row.created_at,
    })
}

#[async_trait]
impl RoomRepository for PgRoomRepository {
    async fn create(&self, room: Room) -> Result<Room, StoreError> {
        sqlx::query(
            "INSERT INTO rooms (id, hotel_id, room_number, room_type, available, adult_capacity, children_capacity, rate_cents, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(room.id)
        .bind(room.hotel_id)
        .bind(&room.room_number)
        .bind(room.room_type.as_str())
        .bind(room.available)
        .bind(room.adult_capacity)
        .bind(room.children_capacity)
        .bind(room.rate_cents)
        .bind(room.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(room)
    }

    async fn get(&self, id: Uuid) -> Result<Room, StoreError> {
        let row: Option<RoomRow> =
            sqlx::query_as(&format!("SELECT {} FROM rooms WHERE id = $1", ROOM_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_err)?;

        row.map(row_to_room).transpose()?.ok_or(StoreError::NotFound)
    }

    async fn list(&self, page: Page) -> Result<Vec<Room>, StoreError> {
        let rows: Vec<RoomRow> = sqlx::query_as(&format!(
            "SELECT {} FROM rooms ORDER BY created_at, id LIMIT $1 OFFSET $2",
            ROOM_COLUMNS
        ))
        .bind(page.size as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        rows.into_iter().map(row_to_room).collect()
    }

    async fn list_by_hotel(&self, hotel_id: Uuid, page: Page) -> Result<Vec<Room>, StoreError> {
        let rows: Vec<RoomRow> = sqlx::query_as(&format!(
            "SELECT {} FROM rooms WHERE hotel_id = $1 ORDER BY created_at, id LIMIT $2 OFFSET $3",
            ROOM_COLUMNS
        ))
        .bind(hotel_id)
        .bind(page.size as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        rows.into_iter().map(row_to_room).collect()
    }

    async fn update(&self, room: Room) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE rooms SET hotel_id = $2, room_number = $3, room_type = $4, available = $5, \
             adult_capacity = $6, children_capacity = $7, rate_cents = $8 WHERE id = $1",
        )
        .bind(room.id)
        .bind(room.hotel_id)
        .bind(&room.room_number)
        .bind(room.room_type.as_str())
        .bind(room.available)
        .bind(room.adult_capacity)
        .bind(room.children_capacity)
        .bind(room.rate_cents)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM rooms WHERE id = $1")
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
