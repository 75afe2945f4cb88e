//! HTTP route handlers for the web frontend.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Health check
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action
//! GET  /auth/register          - Register page
//! POST /auth/register          - Register action
//! POST /auth/logout            - Logout action
//!
//! # Trips
//! GET  /trips                  - Search form and results
//! GET  /trips/new              - Trip creation form (drivers)
//! POST /trips                  - Create trip
//! GET  /trips/{id}             - Trip details
//! POST /trips/{id}/book        - Book seats (passengers)
//! POST /trips/{id}/cancel      - Cancel own trip
//! POST /trips/{id}/complete    - Complete own trip
//! GET  /trips/{id}/review      - Driver review form
//! POST /trips/{id}/review      - Submit driver review
//!
//! # Profile (requires auth)
//! GET  /profile                - Profile page (tabs: personal, car, trips,
//!                                bookings, reviews)
//! POST /profile/personal       - Save personal details
//! POST /profile/car            - Save car details
//! POST /profile/avatar         - Upload avatar (multipart)
//! GET  /avatars/{id}           - Serve stored avatar bytes
//!
//! # Bookings (requires auth)
//! POST /bookings/{id}/confirm  - Confirm a request (driver)
//! POST /bookings/{id}/reject   - Decline a request (driver)
//! GET  /bookings/{id}/rate     - Passenger rating form (driver)
//! POST /bookings/{id}/rate     - Submit passenger rating
//! ```
//!
//! Action handlers redirect with a URL-encoded `?error=` / `?success=`
//! query parameter; pages render those as dismissible notifications, so a
//! failed action always lands the user back on a usable form.

pub mod auth;
pub mod bookings;
pub mod home;
pub mod profile;
pub mod trips;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    response::Redirect,
    routing::{get, post},
};
use serde::Deserialize;

use crate::state::AppState;
use crate::storage::avatars::MAX_AVATAR_BYTES;

/// Query parameters for error/success display.
#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Redirect to `path` with a flash message in the query string.
fn flash(path: &str, key: &str, message: &str) -> Redirect {
    let sep = if path.contains('?') { '&' } else { '?' };
    Redirect::to(&format!("{path}{sep}{key}={}", urlencoding::encode(message)))
}

/// Redirect back with an error notification.
pub(crate) fn redirect_with_error(path: &str, message: &str) -> Redirect {
    flash(path, "error", message)
}

/// Redirect onward with a success notification.
pub(crate) fn redirect_with_success(path: &str, message: &str) -> Redirect {
    flash(path, "success", message)
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
}

/// Create the trip routes router.
pub fn trip_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(trips::index).post(trips::create))
        .route("/new", get(trips::new_page))
        .route("/{id}", get(trips::show))
        .route("/{id}/book", post(trips::book))
        .route("/{id}/cancel", post(trips::cancel))
        .route("/{id}/complete", post(trips::complete))
        .route("/{id}/review", get(trips::review_page).post(trips::review))
}

/// Create the profile routes router.
pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(profile::show))
        .route("/personal", post(profile::update_personal))
        .route("/car", post(profile::update_car))
        .route("/avatar", post(profile::upload_avatar))
        // Uploads are capped at MAX_AVATAR_BYTES by the store; the body
        // limit just needs to let a full upload through with headroom
        .layer(DefaultBodyLimit::max(MAX_AVATAR_BYTES + 64 * 1024))
}

/// Create the booking routes router.
pub fn booking_routes() -> Router<AppState> {
    Router::new()
        .route("/{id}/confirm", post(bookings::confirm))
        .route("/{id}/reject", post(bookings::reject))
        .route("/{id}/rate", get(bookings::rate_page).post(bookings::rate))
}

/// Create all routes for the web frontend.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Trip routes
        .nest("/trips", trip_routes())
        // Profile routes
        .nest("/profile", profile_routes())
        // Booking routes
        .nest("/bookings", booking_routes())
        // Auth routes
        .nest("/auth", auth_routes())
        // Stored avatar bytes
        .route("/avatars/{id}", get(profile::serve_avatar))
}
