use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use lodgia_domain::hotel::Hotel;

use crate::error::AppError;
use crate::pagination::PageQuery;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct HotelPayload {
    name: String,
    rating: i32,
    city_id: Uuid,
}

impl HotelPayload {
    fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::validation("Hotel name should not be empty"));
        }
        if !(0..=5).contains(&self.rating) {
            return Err(AppError::validation("Rating should be between 0 and 5"));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct HotelListQuery {
    city_id: Option<Uuid>,
    page_number: Option<u32>,
    page_size: Option<u32>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/hotels", get(list_hotels))
        .route("/v1/hotels/{hotel_id}", get(get_hotel))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/hotels", post(create_hotel))
        .route("/v1/hotels/{hotel_id}", put(update_hotel).delete(delete_hotel))
}

async fn list_hotels(
    State(state): State<AppState>,
    Query(query): Query<HotelListQuery>,
) -> Result<Json<Vec<Hotel>>, AppError> {
    let page = PageQuery {
        page_number: query.page_number,
        page_size: query.page_size,
    }
    .resolve()?;

    let hotels = match query.city_id {
        Some(city_id) => state.hotels.list_by_city(city_id, page).await?,
        None => state.hotels.list(page).await?,
    };

    Ok(Json(hotels))
}

async fn get_hotel(
    State(state): State<AppState>,
    Path(hotel_id): Path<Uuid>,
) -> Result<Json<Hotel>, AppError> {
    Ok(Json(state.hotels.get(hotel_id).await?))
}

async fn create_hotel(
    State(state): State<AppState>,
    Json(req): Json<HotelPayload>,
) -> Result<(StatusCode, Json<Hotel>), AppError> {
    req.validate()?;

    // The owning city must exist
    state.cities.get(req.city_id).await?;

    let hotel = Hotel::new(req.name, req.rating, req.city_id);
    let hotel = state.hotels.create(hotel).await?;

    Ok((StatusCode::CREATED, Json(hotel)))
}

async fn update_hotel(
    State(state): State<AppState>,
    Path(hotel_id): Path<Uuid>,
    Json(req): Json<HotelPayload>,
) -> Result<StatusCode, AppError> {
    req.validate()?;
    state.cities.get(req.city_id).await?;

    let mut hotel = state.hotels.get(hotel_id).await?;
    hotel.name = req.name;
    hotel.rating = req.rating;
    hotel.city_id = req.city_id;
    state.hotels.update(hotel).await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn delete_hotel(
    State(state): State<AppState>,
    Path(hotel_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.hotels.delete(hotel_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
