use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use lodgia_booking::BookingRequest;
use lodgia_domain::reservation::{Reservation, StaySpan};

use crate::error::AppError;
use crate::middleware::auth::Claims;
use crate::pagination::PageQuery;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct ReservationPayload {
    room_id: Uuid,
    check_in: NaiveDate,
    check_out: NaiveDate,
    #[serde(default)]
    use_featured_deal: bool,
}

#[derive(Debug, Serialize)]
struct ReservationResponse {
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

impl From<Reservation> for ReservationResponse {
    fn from(r: Reservation) -> Self {
        Self {
            id: r.id,
            reference_no: r.reference_no,
            room_id: r.room_id,
            user_id: r.user_id,
            check_in: r.span.check_in,
            check_out: r.span.check_out,
            price_cents: r.price_cents,
            is_featured_deal: r.is_featured_deal,
            created_at: r.created_at,
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/reservations",
            get(list_reservations).post(create_reservation),
        )
        .route(
            "/v1/reservations/{reservation_id}",
            get(get_reservation)
                .put(update_reservation)
                .delete(delete_reservation),
        )
}

fn booking_request(claims: &Claims, req: ReservationPayload) -> Result<BookingRequest, AppError> {
    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::AuthenticationError("Malformed token subject".to_string()))?;

    Ok(BookingRequest {
        room_id: req.room_id,
        user_id,
        span: StaySpan::new(req.check_in, req.check_out),
        use_featured_deal: req.use_featured_deal,
    })
}

async fn list_reservations(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<ReservationResponse>>, AppError> {
    let page = page.resolve()?;
    let reservations = state.reservations.list(page).await?;

    Ok(Json(reservations.into_iter().map(Into::into).collect()))
}

async fn get_reservation(
    State(state): State<AppState>,
    Path(reservation_id): Path<Uuid>,
) -> Result<Json<ReservationResponse>, AppError> {
    let reservation = state.reservations.get(reservation_id).await?;
    Ok(Json(reservation.into()))
}

async fn create_reservation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ReservationPayload>,
) -> Result<(StatusCode, Json<ReservationResponse>), AppError> {
    let request = booking_request(&claims, req)?;
    let reservation = state.booking.book(request).await?;

    Ok((StatusCode::CREATED, Json(reservation.into())))
}

async fn update_reservation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(reservation_id): Path<Uuid>,
    Json(req): Json<ReservationPayload>,
) -> Result<Json<ReservationResponse>, AppError> {
    let request = booking_request(&claims, req)?;
    let reservation = state.booking.reschedule(reservation_id, request).await?;

    info!(reservation = %reservation_id, "reservation rescheduled");

    Ok(Json(reservation.into()))
}

async fn delete_reservation(
    State(state): State<AppState>,
    Path(reservation_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.reservations.delete(reservation_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
