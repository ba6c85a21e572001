use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use lodgia_domain::city::City;

use crate::error::AppError;
use crate::pagination::PageQuery;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct CityPayload {
    name: String,
    country: String,
    postal_code: String,
}

impl CityPayload {
    fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::validation("City name should not be empty"));
        }
        if self.country.trim().is_empty() {
            return Err(AppError::validation("Country should not be empty"));
        }
        Ok(())
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/cities", get(list_cities))
        .route("/v1/cities/{city_id}", get(get_city))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/cities", post(create_city))
        .route("/v1/cities/{city_id}", put(update_city).delete(delete_city))
}

async fn list_cities(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<City>>, AppError> {
    let page = page.resolve()?;
    Ok(Json(state.cities.list(page).await?))
}

async fn get_city(
    State(state): State<AppState>,
    Path(city_id): Path<Uuid>,
) -> Result<Json<City>, AppError> {
    Ok(Json(state.cities.get(city_id).await?))
}

async fn create_city(
    State(state): State<AppState>,
    Json(req): Json<CityPayload>,
) -> Result<(StatusCode, Json<City>), AppError> {
    req.validate()?;

    let city = City::new(req.name, req.country, req.postal_code);
    let city = state.cities.create(city).await?;

    Ok((StatusCode::CREATED, Json(city)))
}

async fn update_city(
    State(state): State<AppState>,
    Path(city_id): Path<Uuid>,
    Json(req): Json<CityPayload>,
) -> Result<StatusCode, AppError> {
    req.validate()?;

    let mut city = state.cities.get(city_id).await?;
    city.name = req.name;
    city.country = req.country;
    city.postal_code = req.postal_code;
    state.cities.update(city).await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn delete_city(
    State(state): State<AppState>,
    Path(city_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.cities.delete(city_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
