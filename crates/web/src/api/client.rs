//! HTTP client for the Hermes REST backend.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use hermes_core::{BookingId, BookingStatus, TripId, UserId};

use super::types::{
    AuthSession, Booking, Credentials, NewBooking, NewReview, NewTrip, NewUser, PassengerRating,
    Profile, ProfileUpdate, Review, Trip, TripSearch,
};
use super::ApiError;

/// How long a fetched profile stays valid before the next read goes back to
/// the backend. Mutations invalidate eagerly, so this only bounds staleness
/// caused by out-of-band changes (reviews bumping the rating).
const PROFILE_CACHE_TTL: Duration = Duration::from_secs(60);

/// Client for the Hermes REST backend.
///
/// One method per endpoint; protected endpoints take the caller's bearer
/// token. The profile record is cached per user for a short TTL and dropped
/// after every successful profile mutation.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
    profiles: Cache<i64, Profile>,
}

impl ApiClient {
    /// Create a new backend client.
    ///
    /// `api_url` is the backend origin; the versioned `/api/v1` prefix is
    /// appended here.
    #[must_use]
    pub fn new(api_url: &str) -> Self {
        let profiles = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(PROFILE_CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(ApiClientInner {
                client: reqwest::Client::new(),
                base_url: format!("{}/api/v1", api_url.trim_end_matches('/')),
                profiles,
            }),
        }
    }

    /// Issue one request and normalize the response.
    ///
    /// Returns `Ok(None)` for `204 No Content` and for empty success bodies;
    /// non-2xx statuses become [`ApiError::Status`] with the message pulled
    /// out of the JSON body.
    async fn send(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> Result<Option<serde_json::Value>, ApiError> {
        let url = format!("{}{}", self.inner.base_url, path);

        let mut request = self
            .inner
            .client
            .request(method, &url)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let text = response.text().await?;

        if !status.is_success() {
            let message = extract_error_message(status.as_u16(), &text);
            tracing::warn!(
                status = status.as_u16(),
                %path,
                %message,
                "backend returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        if text.is_empty() {
            return Ok(None);
        }

        Ok(Some(serde_json::from_str(&text)?))
    }

    /// Like [`Self::send`], but the caller expects a typed body back.
    async fn fetch<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> Result<T, ApiError> {
        match self.send(method, path, token, body).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Err(ApiError::EmptyBody),
        }
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns an error with the backend's message for bad credentials.
    #[instrument(skip(self, credentials))]
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthSession, ApiError> {
        self.fetch(
            Method::POST,
            "/auth/login",
            None,
            Some(serde_json::to_value(credentials)?),
        )
        .await
    }

    /// Create an account and sign in.
    ///
    /// # Errors
    ///
    /// Returns an error if the email is already registered or the input is
    /// rejected.
    #[instrument(skip(self, new_user))]
    pub async fn register(&self, new_user: &NewUser) -> Result<AuthSession, ApiError> {
        self.fetch(
            Method::POST,
            "/auth/register",
            None,
            Some(serde_json::to_value(new_user)?),
        )
        .await
    }

    // =========================================================================
    // Profile
    // =========================================================================

    /// Get the signed-in user's profile. Cached per user for a short TTL.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected or the request fails.
    #[instrument(skip(self, token), fields(user_id = %user_id))]
    pub async fn profile(&self, token: &str, user_id: UserId) -> Result<Profile, ApiError> {
        if let Some(profile) = self.inner.profiles.get(&user_id.as_i64()).await {
            debug!("cache hit for profile");
            return Ok(profile);
        }

        let profile: Profile = self
            .fetch(Method::GET, "/users/profile", Some(token), None)
            .await?;

        self.inner
            .profiles
            .insert(user_id.as_i64(), profile.clone())
            .await;

        Ok(profile)
    }

    /// Update the signed-in user's profile and drop the cached copy, so the
    /// next read re-fetches.
    ///
    /// # Errors
    ///
    /// Returns an error if the update is rejected.
    #[instrument(skip(self, token, update), fields(user_id = %user_id))]
    pub async fn update_profile(
        &self,
        token: &str,
        user_id: UserId,
        update: &ProfileUpdate,
    ) -> Result<(), ApiError> {
        self.send(
            Method::PUT,
            "/users/profile",
            Some(token),
            Some(serde_json::to_value(update)?),
        )
        .await?;

        self.inner.profiles.invalidate(&user_id.as_i64()).await;
        Ok(())
    }

    /// Drop a user's cached profile (logout).
    pub async fn forget_profile(&self, user_id: UserId) {
        self.inner.profiles.invalidate(&user_id.as_i64()).await;
    }

    // =========================================================================
    // Trips
    // =========================================================================

    /// Search trips. Blank criteria list every active trip.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn search_trips(&self, search: &TripSearch) -> Result<Vec<Trip>, ApiError> {
        let qs = {
            let mut query = url::form_urlencoded::Serializer::new(String::new());
            for (key, value) in [
                ("from", &search.from),
                ("to", &search.to),
                ("date", &search.date),
            ] {
                if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                    query.append_pair(key, value);
                }
            }

            query.finish()
        };
        let path = if qs.is_empty() {
            "/trips/search".to_string()
        } else {
            format!("/trips/search?{qs}")
        };

        self.fetch(Method::GET, &path, None, None).await
    }

    /// Get one trip by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the trip does not exist or the request fails.
    #[instrument(skip(self), fields(trip_id = %trip_id))]
    pub async fn trip(&self, trip_id: TripId) -> Result<Trip, ApiError> {
        self.fetch(Method::GET, &format!("/trips/{trip_id}"), None, None)
            .await
    }

    /// Publish a new trip.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the trip.
    #[instrument(skip(self, token, new_trip))]
    pub async fn create_trip(&self, token: &str, new_trip: &NewTrip) -> Result<(), ApiError> {
        self.send(
            Method::POST,
            "/trips",
            Some(token),
            Some(serde_json::to_value(new_trip)?),
        )
        .await?;
        Ok(())
    }

    /// List the signed-in user's trips (published or ridden).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn my_trips(&self, token: &str) -> Result<Vec<Trip>, ApiError> {
        self.fetch(Method::GET, "/trips/my-trips", Some(token), None)
            .await
    }

    /// Cancel an owned trip; the backend cancels its bookings with it.
    ///
    /// # Errors
    ///
    /// Returns an error if the viewer does not own the trip or the request
    /// fails.
    #[instrument(skip(self, token), fields(trip_id = %trip_id))]
    pub async fn cancel_trip(&self, token: &str, trip_id: TripId) -> Result<(), ApiError> {
        self.send(
            Method::PATCH,
            &format!("/trips/{trip_id}/cancel"),
            Some(token),
            None,
        )
        .await?;
        Ok(())
    }

    /// Mark an owned trip as completed, unlocking reviews.
    ///
    /// # Errors
    ///
    /// Returns an error if the viewer does not own the trip or the request
    /// fails.
    #[instrument(skip(self, token), fields(trip_id = %trip_id))]
    pub async fn complete_trip(&self, token: &str, trip_id: TripId) -> Result<(), ApiError> {
        self.send(
            Method::PATCH,
            &format!("/trips/{trip_id}/complete"),
            Some(token),
            None,
        )
        .await?;
        Ok(())
    }

    // =========================================================================
    // Bookings
    // =========================================================================

    /// Request seats on a trip.
    ///
    /// # Errors
    ///
    /// Returns an error if no seats are left or the request fails.
    #[instrument(skip(self, token, booking))]
    pub async fn create_booking(
        &self,
        token: &str,
        booking: &NewBooking,
    ) -> Result<Booking, ApiError> {
        self.fetch(
            Method::POST,
            "/bookings",
            Some(token),
            Some(serde_json::to_value(booking)?),
        )
        .await
    }

    /// List the signed-in passenger's bookings.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn my_bookings(&self, token: &str) -> Result<Vec<Booking>, ApiError> {
        self.fetch(Method::GET, "/bookings/my-bookings", Some(token), None)
            .await
    }

    /// List booking requests on the signed-in driver's trips.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn driver_bookings(&self, token: &str) -> Result<Vec<Booking>, ApiError> {
        self.fetch(Method::GET, "/bookings/driver", Some(token), None)
            .await
    }

    /// Confirm or reject a booking request.
    ///
    /// # Errors
    ///
    /// Returns an error if the viewer is not the trip's driver or the
    /// request fails.
    #[instrument(skip(self, token), fields(booking_id = %booking_id, status = %status))]
    pub async fn set_booking_status(
        &self,
        token: &str,
        booking_id: BookingId,
        status: BookingStatus,
    ) -> Result<(), ApiError> {
        self.send(
            Method::PATCH,
            &format!("/bookings/{booking_id}/status"),
            Some(token),
            Some(serde_json::json!({ "status": status })),
        )
        .await?;
        Ok(())
    }

    /// Rate the passenger of a confirmed booking.
    ///
    /// # Errors
    ///
    /// Returns an error if the booking was already rated or the request
    /// fails.
    #[instrument(skip(self, token, rating), fields(booking_id = %booking_id))]
    pub async fn rate_passenger(
        &self,
        token: &str,
        booking_id: BookingId,
        rating: &PassengerRating,
    ) -> Result<(), ApiError> {
        self.send(
            Method::POST,
            &format!("/bookings/{booking_id}/rate"),
            Some(token),
            Some(serde_json::to_value(rating)?),
        )
        .await?;
        Ok(())
    }

    // =========================================================================
    // Reviews
    // =========================================================================

    /// Leave a review for the driver of a trip the viewer rode on.
    ///
    /// # Errors
    ///
    /// Returns an error if a review already exists or the viewer did not
    /// participate in the trip.
    #[instrument(skip(self, token, review))]
    pub async fn create_review(&self, token: &str, review: &NewReview) -> Result<(), ApiError> {
        self.send(
            Method::POST,
            "/reviews",
            Some(token),
            Some(serde_json::to_value(review)?),
        )
        .await?;
        Ok(())
    }

    /// Leave a review for a passenger (driver side).
    ///
    /// # Errors
    ///
    /// Returns an error if the review is rejected.
    #[instrument(skip(self, token, review))]
    pub async fn create_passenger_review(
        &self,
        token: &str,
        review: &NewReview,
    ) -> Result<(), ApiError> {
        self.send(
            Method::POST,
            "/reviews/passenger",
            Some(token),
            Some(serde_json::to_value(review)?),
        )
        .await?;
        Ok(())
    }

    /// List reviews left about a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(user_id = %user_id))]
    pub async fn user_reviews(&self, token: &str, user_id: UserId) -> Result<Vec<Review>, ApiError> {
        self.fetch(
            Method::GET,
            &format!("/reviews/user/{user_id}"),
            Some(token),
            None,
        )
        .await
    }

    /// List reviews left about the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn my_reviews(&self, token: &str) -> Result<Vec<Review>, ApiError> {
        self.fetch(Method::GET, "/reviews/my-reviews", Some(token), None)
            .await
    }
}

/// Pull a human-readable message out of an error response body.
///
/// The backend wraps failures as `{"error": "..."}`, occasionally as
/// `{"message": "..."}`; anything else falls back to the bare status code.
fn extract_error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("error")
                .or_else(|| value.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("HTTP {status}"))
}
