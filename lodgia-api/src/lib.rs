use axum::{http::Method, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod cities;
pub mod deals;
pub mod error;
pub mod hotels;
pub mod middleware;
pub mod pagination;
pub mod reservations;
pub mod rooms;
pub mod state;

pub use state::AppState;

use crate::middleware::auth::{admin_auth_middleware, customer_auth_middleware};

pub fn app(state: AppState) -> Router {
    // CORS Middleware
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    // Mutating CRUD is admin-only; reservations need a signed-in user
    let admin = Router::new()
        .merge(cities::admin_routes())
        .merge(hotels::admin_routes())
        .merge(rooms::admin_routes())
        .merge(deals::admin_routes())
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            admin_auth_middleware,
        ));

    let customer = reservations::routes().route_layer(axum::middleware::from_fn_with_state(
        state.clone(),
        customer_auth_middleware,
    ));

    Router::new()
        .merge(auth::routes())
        .merge(cities::routes())
        .merge(hotels::routes())
        .merge(rooms::routes())
        .merge(deals::routes())
        .merge(admin)
        .merge(customer)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
