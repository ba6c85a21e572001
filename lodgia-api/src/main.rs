use std::net::SocketAddr;
use std::sync::Arc;

use lodgia_api::{
    app,
    state::{AppState, AuthConfig},
};
use lodgia_booking::AdmissionCoordinator;
use lodgia_store::city_repo::PgCityRepository;
use lodgia_store::deal_repo::PgFeaturedDealRepository;
use lodgia_store::hotel_repo::PgHotelRepository;
use lodgia_store::reservation_repo::PgReservationRepository;
use lodgia_store::room_repo::PgRoomRepository;
use lodgia_store::user_repo::PgUserRepository;
use lodgia_store::{DbClient, LogNotifier};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lodgia_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = lodgia_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Lodgia API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    let rooms = Arc::new(PgRoomRepository::new(db.pool.clone()));
    let deals = Arc::new(PgFeaturedDealRepository::new(db.pool.clone()));
    let reservations = Arc::new(PgReservationRepository::new(db.pool.clone()));

    let booking = Arc::new(AdmissionCoordinator::new(
        rooms.clone(),
        deals.clone(),
        reservations.clone(),
        Arc::new(LogNotifier),
    ));

    let app_state = AppState {
        cities: Arc::new(PgCityRepository::new(db.pool.clone())),
        hotels: Arc::new(PgHotelRepository::new(db.pool.clone())),
        rooms,
        deals,
        users: Arc::new(PgUserRepository::new(db.pool.clone())),
        reservations,
        booking,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
