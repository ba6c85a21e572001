use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::util::ServiceExt;
use uuid::Uuid;

use lodgia_api::middleware::auth::Claims;
use lodgia_api::state::{AppState, AuthConfig};
use lodgia_api::app;
use lodgia_booking::AdmissionCoordinator;
use lodgia_domain::city::City;
use lodgia_domain::deal::FeaturedDeal;
use lodgia_domain::hotel::Hotel;
use lodgia_domain::repository::{
    CityRepository, FeaturedDealRepository, HotelRepository, RoomRepository,
};
use lodgia_domain::room::{Room, RoomType};
use lodgia_store::{LogNotifier, MemoryStore};

const SECRET: &str = "integration-test-secret";

fn test_state() -> (Arc<MemoryStore>, AppState) {
    let store = Arc::new(MemoryStore::new());

    let booking = Arc::new(AdmissionCoordinator::new(
        store.clone(),
        store.clone(),
        store.clone(),
        Arc::new(LogNotifier),
    ));

    let state = AppState {
        cities: store.clone(),
        hotels: store.clone(),
        rooms: store.clone(),
        deals: store.clone(),
        users: store.clone(),
        reservations: store.clone(),
        booking,
        auth: AuthConfig {
            secret: SECRET.to_string(),
            expiration: 3600,
        },
    };

    (store, state)
}

fn token_for(role: &str, user_id: Uuid) -> String {
    let claims = Claims {
        sub: user_id.to_string(),
        email: format!("{}@lodgia.test", role.to_lowercase()),
        role: role.to_string(),
        exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(state: &AppState, req: Request<Body>) -> (StatusCode, Value) {
    let response = app(state.clone()).oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();

    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, body)
}

/// City, hotel and a double room seeded straight into the store so the
/// reservation tests do not depend on the CRUD surface.
async fn seed_room(store: &Arc<MemoryStore>, rate_cents: i32) -> Room {
    let city = CityRepository::create(
        store.as_ref(),
        City::new("Lisbon".to_string(), "PT".to_string(), "1100".to_string()),
    )
    .await
    .unwrap();

    let hotel = HotelRepository::create(
        store.as_ref(),
        Hotel::new("Hotel Miradouro".to_string(), 4, city.id),
    )
    .await
    .unwrap();

    let room = Room::new(
        hotel.id,
        "204".to_string(),
        RoomType::Double,
        2,
        1,
        rate_cents,
    );
    RoomRepository::create(store.as_ref(), room).await.unwrap()
}

fn future_date(days: i64) -> String {
    (Utc::now().date_naive() + Duration::days(days)).to_string()
}

fn reservation_body(room_id: Uuid, from_days: i64, to_days: i64) -> Value {
    json!({
        "room_id": room_id,
        "check_in": future_date(from_days),
        "check_out": future_date(to_days),
    })
}

#[tokio::test]
async fn test_register_login_and_book() {
    let (store, state) = test_state();
    let room = seed_room(&store, 10000).await;

    let (status, _) = send(
        &state,
        request(
            "POST",
            "/v1/auth/register",
            None,
            Some(json!({
                "email": "guest@lodgia.test",
                "password": "s3cure-pass",
                "full_name": "Guest One",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &state,
        request(
            "POST",
            "/v1/auth/login",
            None,
            Some(json!({
                "email": "guest@lodgia.test",
                "password": "s3cure-pass",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = send(
        &state,
        request(
            "POST",
            "/v1/reservations",
            Some(&token),
            Some(reservation_body(room.id, 10, 12)),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    assert_eq!(body["price_cents"], 10000);
    assert_eq!(body["is_featured_deal"], false);

    let reference = body["reference_no"].as_str().unwrap();
    let suffix = reference.strip_prefix("REF-").expect("missing REF- prefix");
    assert_eq!(suffix.len(), 8);
    assert!(suffix
        .bytes()
        .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));
}

#[tokio::test]
async fn test_reservations_require_a_token() {
    let (store, state) = test_state();
    let room = seed_room(&store, 10000).await;

    let (status, _) = send(
        &state,
        request(
            "POST",
            "/v1/reservations",
            None,
            Some(reservation_body(room.id, 10, 12)),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&state, request("GET", "/v1/reservations", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_overlapping_booking_is_a_conflict() {
    let (store, state) = test_state();
    let room = seed_room(&store, 10000).await;
    let token = token_for("CUSTOMER", Uuid::new_v4());

    let (status, _) = send(
        &state,
        request(
            "POST",
            "/v1/reservations",
            Some(&token),
            Some(reservation_body(room.id, 10, 12)),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &state,
        request(
            "POST",
            "/v1/reservations",
            Some(&token),
            Some(reservation_body(room.id, 11, 13)),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());

    // A stay starting exactly at the first check-out is accepted
    let (status, _) = send(
        &state,
        request(
            "POST",
            "/v1/reservations",
            Some(&token),
            Some(reservation_body(room.id, 12, 14)),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_featured_deal_prices_the_stay() {
    let (store, state) = test_state();
    let room = seed_room(&store, 10000).await;

    FeaturedDealRepository::create(
        store.as_ref(),
        FeaturedDeal::new(
            room.hotel_id,
            0.2,
            "Spring break".to_string(),
            "SPRING20".to_string(),
            Utc::now() + Duration::days(30),
        ),
    )
    .await
    .unwrap();

    let token = token_for("CUSTOMER", Uuid::new_v4());
    let mut body = reservation_body(room.id, 10, 12);
    body["use_featured_deal"] = json!(true);

    let (status, body) = send(
        &state,
        request("POST", "/v1/reservations", Some(&token), Some(body)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["price_cents"], 8000);
    assert_eq!(body["is_featured_deal"], true);
}

#[tokio::test]
async fn test_expired_deal_is_rejected() {
    let (store, state) = test_state();
    let room = seed_room(&store, 10000).await;

    FeaturedDealRepository::create(
        store.as_ref(),
        FeaturedDeal::new(
            room.hotel_id,
            0.2,
            "Last summer".to_string(),
            "OLD20".to_string(),
            Utc::now() - Duration::days(1),
        ),
    )
    .await
    .unwrap();

    let token = token_for("CUSTOMER", Uuid::new_v4());
    let mut body = reservation_body(room.id, 10, 12);
    body["use_featured_deal"] = json!(true);

    let (status, _) = send(
        &state,
        request("POST", "/v1/reservations", Some(&token), Some(body)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reschedule_over_http() {
    let (store, state) = test_state();
    let room = seed_room(&store, 10000).await;
    let token = token_for("CUSTOMER", Uuid::new_v4());

    let (_, created) = send(
        &state,
        request(
            "POST",
            "/v1/reservations",
            Some(&token),
            Some(reservation_body(room.id, 10, 14)),
        ),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    // Shift into a span overlapping only the reservation itself
    let (status, moved) = send(
        &state,
        request(
            "PUT",
            &format!("/v1/reservations/{}", id),
            Some(&token),
            Some(reservation_body(room.id, 12, 16)),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(moved["reference_no"], created["reference_no"]);
    assert_eq!(moved["check_in"], json!(future_date(12)));

    // A second reservation blocks the move
    send(
        &state,
        request(
            "POST",
            "/v1/reservations",
            Some(&token),
            Some(reservation_body(room.id, 20, 22)),
        ),
    )
    .await;

    let (status, _) = send(
        &state,
        request(
            "PUT",
            &format!("/v1/reservations/{}", id),
            Some(&token),
            Some(reservation_body(room.id, 21, 23)),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_admin_guard_on_mutating_crud() {
    let (_, state) = test_state();
    let body = json!({
        "name": "Porto",
        "country": "PT",
        "postal_code": "4000",
    });

    let (status, _) = send(
        &state,
        request("POST", "/v1/cities", None, Some(body.clone())),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let customer = token_for("CUSTOMER", Uuid::new_v4());
    let (status, _) = send(
        &state,
        request("POST", "/v1/cities", Some(&customer), Some(body.clone())),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = token_for("ADMIN", Uuid::new_v4());
    let (status, created) = send(
        &state,
        request("POST", "/v1/cities", Some(&admin), Some(body)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Porto");

    // Reading stays public
    let (status, cities) = send(&state, request("GET", "/v1/cities", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cities.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_admin_crud_chain_down_to_featured_deal() {
    let (_, state) = test_state();
    let admin = token_for("ADMIN", Uuid::new_v4());

    let (_, city) = send(
        &state,
        request(
            "POST",
            "/v1/cities",
            Some(&admin),
            Some(json!({"name": "Vienna", "country": "AT", "postal_code": "1010"})),
        ),
    )
    .await;

    let (_, hotel) = send(
        &state,
        request(
            "POST",
            "/v1/hotels",
            Some(&admin),
            Some(json!({"name": "Hotel Donau", "rating": 5, "city_id": city["id"]})),
        ),
    )
    .await;

    let (status, room) = send(
        &state,
        request(
            "POST",
            "/v1/rooms",
            Some(&admin),
            Some(json!({
                "hotel_id": hotel["id"],
                "room_number": "31",
                "room_type": "SUITE",
                "adult_capacity": 2,
                "children_capacity": 2,
                "rate_cents": 25000,
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &state,
        request(
            "POST",
            "/v1/deals",
            Some(&admin),
            Some(json!({
                "hotel_id": hotel["id"],
                "discount": 0.15,
                "description": "City escape",
                "promo_code": "ESCAPE15",
                "end_date": (Utc::now() + Duration::days(14)).to_rfc3339(),
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let room_id = room["id"].as_str().unwrap();
    let (status, deal) = send(
        &state,
        request(
            "GET",
            &format!("/v1/rooms/{}/featured-deal", room_id),
            None,
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deal["discount"], 0.15);
}

#[tokio::test]
async fn test_out_of_range_discount_is_rejected() {
    let (store, state) = test_state();
    let room = seed_room(&store, 10000).await;
    let admin = token_for("ADMIN", Uuid::new_v4());

    let (status, _) = send(
        &state,
        request(
            "POST",
            "/v1/deals",
            Some(&admin),
            Some(json!({
                "hotel_id": room.hotel_id,
                "discount": 1.0,
                "end_date": (Utc::now() + Duration::days(14)).to_rfc3339(),
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_page_size_is_capped() {
    let (_, state) = test_state();

    let (status, body) = send(
        &state,
        request("GET", "/v1/cities?page_size=50", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Page size"));
}

#[tokio::test]
async fn test_unknown_reservation_is_404() {
    let (_, state) = test_state();
    let token = token_for("CUSTOMER", Uuid::new_v4());

    let (status, _) = send(
        &state,
        request(
            "GET",
            &format!("/v1/reservations/{}", Uuid::new_v4()),
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
