//! API client contract tests against an in-process stub backend.
//!
//! The stub is a small axum app bound to a random loopback port. It serves
//! canned responses that mirror the real backend's shapes, which lets these
//! tests pin the client's contract: bearer token attachment, error message
//! extraction, 204 handling and profile cache invalidation.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, patch, post},
};
use serde_json::json;

use hermes_core::{BookingId, BookingStatus, UserId};
use hermes_web::api::{ApiClient, ApiError, Credentials, ProfileUpdate, TripSearch};

const GOOD_TOKEN: &str = "test-jwt-token";

#[derive(Clone, Default)]
struct StubState {
    profile_hits: Arc<AtomicUsize>,
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

async fn login_stub(Json(body): Json<serde_json::Value>) -> (StatusCode, Json<serde_json::Value>) {
    if body["email"] == "anna@example.com" && body["password"] == "secret1" {
        (
            StatusCode::OK,
            Json(json!({
                "message": "Login successful",
                "token": GOOD_TOKEN,
                "user": {
                    "id": 3,
                    "name": "Anna Serova",
                    "email": "anna@example.com",
                    "role": "passenger",
                    "rating": 4.8,
                    "reviewsCount": 12
                }
            })),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Invalid email or password"})),
        )
    }
}

async fn profile_stub(
    State(state): State<StubState>,
    headers: HeaderMap,
) -> (StatusCode, Json<serde_json::Value>) {
    if bearer(&headers) != Some(GOOD_TOKEN) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Authorization header required"})),
        );
    }

    state.profile_hits.fetch_add(1, Ordering::SeqCst);
    (
        StatusCode::OK,
        Json(json!({
            "id": 3,
            "fullName": "Anna Serova",
            "email": "anna@example.com",
            "phone": "+79161234567",
            "role": "passenger",
            "rating": 4.8,
            "reviewscount": 12,
            "carbrand": "",
            "carmodel": ""
        })),
    )
}

async fn update_profile_stub(headers: HeaderMap) -> StatusCode {
    if bearer(&headers) == Some(GOOD_TOKEN) {
        // 204: success without a body
        StatusCode::NO_CONTENT
    } else {
        StatusCode::UNAUTHORIZED
    }
}

/// Public endpoint: rejects any request that carries an Authorization header
/// so tests can prove the client omits it without a token.
async fn search_stub(headers: HeaderMap) -> (StatusCode, Json<serde_json::Value>) {
    if headers.contains_key("authorization") {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "unexpected Authorization header"})),
        );
    }

    (
        StatusCode::OK,
        Json(json!([
            {
                "id": 8,
                "driverId": 4,
                "fromCity": "Moscow",
                "toCity": "Tver",
                "tripDate": "2026-09-01T00:00:00Z",
                "tripTime": "10:30:00",
                "price": 700,
                "seats": 4,
                "availableseats": 2,
                "status": "active",
                "driverName": "Ivan Petrov",
                "driverRating": 4.9
            }
        ])),
    )
}

async fn my_trips_stub(headers: HeaderMap) -> (StatusCode, Json<serde_json::Value>) {
    if bearer(&headers) != Some(GOOD_TOKEN) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Authorization header required"})),
        );
    }

    (StatusCode::OK, Json(json!([])))
}

async fn booking_status_stub(
    Json(body): Json<serde_json::Value>,
) -> (StatusCode, Json<serde_json::Value>) {
    if body["status"] == "confirmed" {
        (StatusCode::OK, Json(json!({"message": "Booking updated"})))
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "Unsupported status"})),
        )
    }
}

async fn plain_error_stub() -> (StatusCode, &'static str) {
    (StatusCode::BAD_GATEWAY, "<html>bad gateway</html>")
}

/// Bind the stub backend on a random loopback port and return a client
/// pointed at it.
async fn spawn_stub() -> (ApiClient, StubState) {
    let state = StubState::default();

    let app = Router::new()
        .route("/api/v1/auth/login", post(login_stub))
        .route(
            "/api/v1/users/profile",
            get(profile_stub).put(update_profile_stub),
        )
        .route("/api/v1/trips/search", get(search_stub))
        .route("/api/v1/trips/my-trips", get(my_trips_stub))
        .route("/api/v1/bookings/{id}/status", patch(booking_status_stub))
        .route("/api/v1/trips/99", get(plain_error_stub))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub listener");
    let addr = listener.local_addr().expect("stub addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub serve");
    });

    (ApiClient::new(&format!("http://{addr}")), state)
}

#[tokio::test]
async fn login_success_returns_token_and_user() {
    let (api, _state) = spawn_stub().await;

    let session = api
        .login(&Credentials {
            email: "anna@example.com".to_string(),
            password: "secret1".to_string(),
        })
        .await
        .expect("login succeeds");

    assert_eq!(session.token, GOOD_TOKEN);
    assert_eq!(session.user.id, UserId::new(3));
    assert_eq!(session.user.name, "Anna Serova");
    assert_eq!(session.user.reviews_count, 12);
}

#[tokio::test]
async fn backend_error_body_message_is_surfaced() {
    let (api, _state) = spawn_stub().await;

    let err = api
        .login(&Credentials {
            email: "anna@example.com".to_string(),
            password: "wrong".to_string(),
        })
        .await
        .expect_err("login fails");

    match err {
        ApiError::Status { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Invalid email or password");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn message_field_is_error_fallback() {
    let (api, _state) = spawn_stub().await;

    let err = api
        .set_booking_status(GOOD_TOKEN, BookingId::new(5), BookingStatus::Cancelled)
        .await
        .expect_err("stub rejects non-confirmed statuses");

    // The stub wraps this failure as {"message": ...} with no "error" key
    assert_eq!(err.to_string(), "Unsupported status");
}

#[tokio::test]
async fn non_json_error_body_falls_back_to_status_code() {
    let (api, _state) = spawn_stub().await;

    let err = api
        .trip(hermes_core::TripId::new(99))
        .await
        .expect_err("stub answers 502");

    match err {
        ApiError::Status { status, message } => {
            assert_eq!(status, 502);
            assert_eq!(message, "HTTP 502");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn no_content_response_is_success_without_value() {
    let (api, _state) = spawn_stub().await;

    let update = ProfileUpdate {
        full_name: "Anna Serova".to_string(),
        phone: "+79161234567".to_string(),
        car_brand: String::new(),
        car_model: String::new(),
        car_year: 0,
        car_color: String::new(),
        car_number: String::new(),
    };

    api.update_profile(GOOD_TOKEN, UserId::new(3), &update)
        .await
        .expect("204 is success");
}

#[tokio::test]
async fn public_request_omits_authorization_header() {
    let (api, _state) = spawn_stub().await;

    // The stub fails any search request that carries an Authorization
    // header, so success here proves the header was omitted
    let trips = api
        .search_trips(&TripSearch::default())
        .await
        .expect("public search succeeds without a token");

    assert_eq!(trips.len(), 1);
    assert_eq!(trips[0].available_seats, 2);
}

#[tokio::test]
async fn protected_request_attaches_token_verbatim() {
    let (api, _state) = spawn_stub().await;

    // The stub only answers when it sees exactly `Bearer test-jwt-token`
    api.my_trips(GOOD_TOKEN).await.expect("token attached");

    let err = api.my_trips("some-other-token").await.expect_err("stub rejects");
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn profile_is_cached_until_a_mutation() {
    let (api, state) = spawn_stub().await;
    let user_id = UserId::new(3);

    let first = api.profile(GOOD_TOKEN, user_id).await.expect("profile");
    let second = api.profile(GOOD_TOKEN, user_id).await.expect("profile");
    assert_eq!(first.full_name, second.full_name);
    assert_eq!(
        state.profile_hits.load(Ordering::SeqCst),
        1,
        "second read should come from the cache"
    );

    let update = ProfileUpdate {
        full_name: "Anna S.".to_string(),
        phone: "+79161234567".to_string(),
        car_brand: String::new(),
        car_model: String::new(),
        car_year: 0,
        car_color: String::new(),
        car_number: String::new(),
    };
    api.update_profile(GOOD_TOKEN, user_id, &update)
        .await
        .expect("update succeeds");

    api.profile(GOOD_TOKEN, user_id).await.expect("profile");
    assert_eq!(
        state.profile_hits.load(Ordering::SeqCst),
        2,
        "mutation should invalidate the cached profile"
    );
}

#[tokio::test]
async fn forget_profile_drops_the_cache_entry() {
    let (api, state) = spawn_stub().await;
    let user_id = UserId::new(3);

    api.profile(GOOD_TOKEN, user_id).await.expect("profile");
    api.forget_profile(user_id).await;
    api.profile(GOOD_TOKEN, user_id).await.expect("profile");

    assert_eq!(state.profile_hits.load(Ordering::SeqCst), 2);
}
