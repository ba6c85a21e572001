use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use lodgia_domain::repository::{Page, ReservationRepository, StoreError};
use lodgia_domain::reservation::{Reservation, StaySpan};

use crate::database::map_sqlx_err;

pub struct PgReservationRepository {
    pool: PgPool,
}

impl PgReservationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const RESERVATION_COLUMNS: &str =
    "id, reference_no, room_id, user_id, check_in, check_out, price_cents, is_featured_deal, created_at";

#[derive(sqlx::FromRow)]
struct ReservationRow {
    id: Uuid,
    reference_no: String,
    room_id: Uuid,
    user_id: Uuid,
    check_in: NaiveDate,
    check_out: NaiveDate,
    price_cents: i32,
    is_featured_deal: bool,
    created_at: DateTime<Utc>,
}

impl From<ReservationRow> for Reservation {
    fn from(row: ReservationRow) -> Self {
        Reservation {
            id: row.id,
            reference_no: row.reference_no,
            room_id: row.room_id,
            user_id: row.user_id,
            span: StaySpan::new(row.check_in, row.check_out),
            price_cents: row.price_cents,
            is_featured_deal: row.is_featured_deal,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl ReservationRepository for PgReservationRepository {
    async fn insert(&self, reservation: Reservation) -> Result<Reservation, StoreError> {
        // A taken reference_no trips the unique constraint, which
        // map_sqlx_err surfaces as DuplicateReference for the retry loop.
        sqlx::query(
            "INSERT INTO reservations (id, reference_no, room_id, user_id, check_in, check_out, price_cents, is_featured_deal, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(reservation.id)
        .bind(&reservation.reference_no)
        .bind(reservation.room_id)
        .bind(reservation.user_id)
        .bind(reservation.span.check_in)
        .bind(reservation.span.check_out)
        .bind(reservation.price_cents)
        .bind(reservation.is_featured_deal)
        .bind(reservation.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(reservation)
    }

    async fn get(&self, id: Uuid) -> Result<Reservation, StoreError> {
        let row: Option<ReservationRow> = sqlx::query_as(&format!(
            "SELECT {} FROM reservations WHERE id = $1",
            RESERVATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        row.map(Into::into).ok_or(StoreError::NotFound)
    }

    async fn list(&self, page: Page) -> Result<Vec<Reservation>, StoreError> {
        let rows: Vec<ReservationRow> = sqlx::query_as(&format!(
            "SELECT {} FROM reservations ORDER BY created_at, id LIMIT $1 OFFSET $2",
            RESERVATION_COLUMNS
        ))
        .bind(page.size as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_for_room(&self, room_id: Uuid) -> Result<Vec<Reservation>, StoreError> {
        let rows: Vec<ReservationRow> = sqlx::query_as(&format!(
            "SELECT {} FROM reservations WHERE room_id = $1 ORDER BY check_in, id",
            RESERVATION_COLUMNS
        ))
        .bind(room_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update(&self, reservation: Reservation) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE reservations SET room_id = $2, user_id = $3, check_in = $4, check_out = $5, \
             price_cents = $6, is_featured_deal = $7 WHERE id = $1",
        )
        .bind(reservation.id)
        .bind(reservation.room_id)
        .bind(reservation.user_id)
        .bind(reservation.span.check_in)
        .bind(reservation.span.check_out)
        .bind(reservation.price_cents)
        .bind(reservation.is_featured_deal)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM reservations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn conflict_exists(
        &self,
        room_id: Uuid,
        span: StaySpan,
        exclude: Option<Uuid>,
    ) -> Result<bool, StoreError> {
        // `check_in < $3 AND check_out > $2` is exactly the half-open
        // overlap predicate; touching intervals do not match.
        let conflict: bool = sqlx::query_scalar(
            "SELECT EXISTS( \
               SELECT 1 FROM reservations \
               WHERE room_id = $1 AND check_in < $3 AND check_out > $2 \
                 AND ($4::uuid IS NULL OR id <> $4) \
             )",
        )
        .bind(room_id)
        .bind(span.check_in)
        .bind(span.check_out)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(conflict)
    }
}
