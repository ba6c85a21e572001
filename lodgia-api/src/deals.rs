use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use lodgia_domain::deal::FeaturedDeal;

use crate::error::AppError;
use crate::pagination::PageQuery;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct DealPayload {
    hotel_id: Uuid,
    discount: f64,
    #[serde(default)]
    description: String,
    #[serde(default)]
    promo_code: String,
    end_date: DateTime<Utc>,
}

impl DealPayload {
    fn validate(&self) -> Result<(), AppError> {
        // This is where the [0, 1) constraint enters the system; the
        // pricing path trusts stored deals.
        if !(0.0..1.0).contains(&self.discount) {
            return Err(AppError::validation(
                "Discount should be a fraction in [0, 1)",
            ));
        }
        Ok(())
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/deals", get(list_deals))
        .route("/v1/deals/{deal_id}", get(get_deal))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/deals", post(create_deal))
        .route("/v1/deals/{deal_id}", put(update_deal).delete(delete_deal))
}

async fn list_deals(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<FeaturedDeal>>, AppError> {
    let page = page.resolve()?;
    Ok(Json(state.deals.list(page).await?))
}

async fn get_deal(
    State(state): State<AppState>,
    Path(deal_id): Path<Uuid>,
) -> Result<Json<FeaturedDeal>, AppError> {
    Ok(Json(state.deals.get(deal_id).await?))
}

async fn create_deal(
    State(state): State<AppState>,
    Json(req): Json<DealPayload>,
) -> Result<(StatusCode, Json<FeaturedDeal>), AppError> {
    req.validate()?;
    state.hotels.get(req.hotel_id).await?;

    let deal = FeaturedDeal::new(
        req.hotel_id,
        req.discount,
        req.description,
        req.promo_code,
        req.end_date,
    );
    let deal = state.deals.create(deal).await?;

    Ok((StatusCode::CREATED, Json(deal)))
}

async fn update_deal(
    State(state): State<AppState>,
    Path(deal_id): Path<Uuid>,
    Json(req): Json<DealPayload>,
) -> Result<StatusCode, AppError> {
    req.validate()?;
    state.hotels.get(req.hotel_id).await?;

    let mut deal = state.deals.get(deal_id).await?;
    deal.hotel_id = req.hotel_id;
    deal.discount = req.discount;
    deal.description = req.description;
    deal.promo_code = req.promo_code;
    deal.end_date = req.end_date;
    state.deals.update(deal).await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn delete_deal(
    State(state): State<AppState>,
    Path(deal_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.deals.delete(deal_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
