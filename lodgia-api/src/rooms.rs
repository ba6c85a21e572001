use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use lodgia_domain::deal::FeaturedDeal;
use lodgia_domain::room::{Room, RoomType};

use crate::error::AppError;
use crate::pagination::PageQuery;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct RoomPayload {
    hotel_id: Uuid,
    room_number: String,
    room_type: String,
    #[serde(default = "default_available")]
    available: bool,
    adult_capacity: i32,
    children_capacity: i32,
    rate_cents: i32,
}

fn default_available() -> bool {
    true
}

impl RoomPayload {
    fn validate(&self) -> Result<RoomType, AppError> {
        if self.room_number.trim().is_empty() {
            return Err(AppError::validation("Room number should not be empty"));
        }
        if self.adult_capacity < 1 {
            return Err(AppError::validation("Adult capacity should be at least 1"));
        }
        if self.children_capacity < 0 {
            return Err(AppError::validation("Children capacity should not be negative"));
        }
        if self.rate_cents < 0 {
            return Err(AppError::validation("Nightly rate should not be negative"));
        }

        RoomType::parse(&self.room_type).ok_or_else(|| {
            AppError::validation("Room type should be one of SINGLE, DOUBLE, SUITE, FAMILY")
        })
    }
}

#[derive(Debug, Deserialize)]
struct RoomListQuery {
    hotel_id: Option<Uuid>,
    page_number: Option<u32>,
    page_size: Option<u32>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/rooms", get(list_rooms))
        .route("/v1/rooms/{room_id}", get(get_room))
        .route("/v1/rooms/{room_id}/featured-deal", get(featured_deal_for_room))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/rooms", post(create_room))
        .route("/v1/rooms/{room_id}", put(update_room).delete(delete_room))
}

async fn list_rooms(
    State(state): State<AppState>,
    Query(query): Query<RoomListQuery>,
) -> Result<Json<Vec<Room>>, AppError> {
    let page = PageQuery {
        page_number: query.page_number,
        page_size: query.page_size,
    }
    .resolve()?;

    let rooms = match query.hotel_id {
        Some(hotel_id) => state.rooms.list_by_hotel(hotel_id, page).await?,
        None => state.rooms.list(page).await?,
    };

    Ok(Json(rooms))
}

async fn get_room(
    State(state): State<AppState>,
    Path(room_id): Path<Uuid>,
) -> Result<Json<Room>, AppError> {
    Ok(Json(state.rooms.get(room_id).await?))
}

/// The deal a booking with `use_featured_deal` would price against.
async fn featured_deal_for_room(
    State(state): State<AppState>,
    Path(room_id): Path<Uuid>,
) -> Result<Json<FeaturedDeal>, AppError> {
    state
        .deals
        .find_for_room(room_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFoundError(format!("No featured deal for room {}", room_id)))
}

async fn create_room(
    State(state): State<AppState>,
    Json(req): Json<RoomPayload>,
) -> Result<(StatusCode, Json<Room>), AppError> {
    let room_type = req.validate()?;

    // The owning hotel must exist
    state.hotels.get(req.hotel_id).await?;

    let mut room = Room::new(
        req.hotel_id,
        req.room_number,
        room_type,
        req.adult_capacity,
        req.children_capacity,
        req.rate_cents,
    );
    room.available = req.available;
    let room = state.rooms.create(room).await?;

    Ok((StatusCode::CREATED, Json(room)))
}

async fn update_room(
    State(state): State<AppState>,
    Path(room_id): Path<Uuid>,
    Json(req): Json<RoomPayload>,
) -> Result<StatusCode, AppError> {
    let room_type = req.validate()?;
    state.hotels.get(req.hotel_id).await?;

    let mut room = state.rooms.get(room_id).await?;
    room.hotel_id = req.hotel_id;
    room.room_number = req.room_number;
    room.room_type = room_type;
    room.available = req.available;
    room.adult_capacity = req.adult_capacity;
    room.children_capacity = req.children_capacity;
    room.rate_cents = req.rate_cents;
    state.rooms.update(room).await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn delete_room(
    State(state): State<AppState>,
    Path(room_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.rooms.delete(room_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
