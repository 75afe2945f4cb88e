//! Wire types for the Hermes REST backend.
//!
//! The backend speaks camelCase JSON. Some list endpoints also emit
//! all-lowercase keys for joined columns (`carbrand`, `availableseats`, ...);
//! serde aliases keep the dual-read fallback the backend's inconsistency
//! requires. Fields the backend may omit per endpoint are defaulted rather
//! than optional where a zero value renders fine.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use hermes_core::{BookingId, BookingStatus, Rating, ReviewId, TripId, TripStatus, UserId, UserRole};

/// Trip records carry `tripDate` as an RFC 3339 timestamp, but the joined
/// booking and review rows send it as a bare `YYYY-MM-DD` string. Read both;
/// anything else counts as no date.
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };

    if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }

    Ok(NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN).and_utc()))
}

// =============================================================================
// Responses
// =============================================================================

/// Token plus compact user record returned by login and registration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub token: String,
    pub user: AuthUser,
    #[serde(default)]
    pub message: String,
}

/// The compact user object embedded in an [`AuthSession`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    #[serde(default)]
    pub rating: f64,
    #[serde(default, alias = "reviewscount")]
    pub reviews_count: i64,
}

/// Full profile record from `GET /users/profile`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: UserId,
    #[serde(alias = "full_name", alias = "name")]
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub role: UserRole,
    #[serde(default)]
    pub rating: f64,
    #[serde(default, alias = "reviewscount")]
    pub reviews_count: i64,
    #[serde(default, alias = "avatarurl")]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default, alias = "carbrand")]
    pub car_brand: Option<String>,
    #[serde(default, alias = "carmodel")]
    pub car_model: Option<String>,
    #[serde(default, alias = "caryear")]
    pub car_year: Option<i64>,
    #[serde(default, alias = "carcolor")]
    pub car_color: Option<String>,
    #[serde(default, alias = "carnumber")]
    pub car_number: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Profile {
    /// "Brand Model" when both are set; the backend sends empty strings for
    /// missing car columns, so blanks count as unset.
    #[must_use]
    pub fn car_summary(&self) -> Option<String> {
        let brand = self.car_brand.as_deref().filter(|s| !s.is_empty())?;
        let model = self.car_model.as_deref().filter(|s| !s.is_empty())?;
        Some(format!("{brand} {model}"))
    }
}

/// A trip record, including the joined driver columns list endpoints attach.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: TripId,
    #[serde(default, alias = "driverid")]
    pub driver_id: Option<UserId>,
    pub from_city: String,
    pub to_city: String,
    pub trip_date: DateTime<Utc>,
    #[serde(default)]
    pub trip_time: String,
    #[serde(default)]
    pub price: i64,
    #[serde(default)]
    pub seats: i64,
    #[serde(default, alias = "availableseats")]
    pub available_seats: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub no_smoking: bool,
    #[serde(default)]
    pub animals_allowed: bool,
    #[serde(default)]
    pub music_allowed: bool,
    #[serde(default)]
    pub status: TripStatus,
    #[serde(default)]
    pub driver_name: String,
    #[serde(default)]
    pub driver_rating: f64,
    #[serde(default)]
    pub driver_car: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A booking record, including the joined trip and passenger columns.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: BookingId,
    pub trip_id: TripId,
    #[serde(default, alias = "passengerid")]
    pub passenger_id: Option<UserId>,
    #[serde(default)]
    pub seats_booked: i64,
    #[serde(default)]
    pub total_price: i64,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(default)]
    pub has_review: bool,
    #[serde(default)]
    pub driver_name: String,
    #[serde(default)]
    pub from_city: String,
    #[serde(default)]
    pub to_city: String,
    #[serde(default, deserialize_with = "lenient_date")]
    pub trip_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub trip_time: String,
    #[serde(default)]
    pub passenger_name: String,
    #[serde(default)]
    pub passenger_phone: String,
}

/// A review left between trip participants.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    #[serde(default)]
    pub trip_id: Option<TripId>,
    #[serde(default)]
    pub target_id: Option<UserId>,
    #[serde(default)]
    pub author_name: String,
    #[serde(default, alias = "avatar")]
    pub author_avatar: Option<String>,
    #[serde(default)]
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub from_city: String,
    #[serde(default)]
    pub to_city: String,
    #[serde(default, deserialize_with = "lenient_date")]
    pub trip_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Requests
// =============================================================================

/// Login request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Registration request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub is_driver: bool,
}

/// Full profile update sent to `PUT /users/profile`.
///
/// The backend overwrites every column, so callers merge the current profile
/// with the submitted fields before sending.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub full_name: String,
    pub phone: String,
    pub car_brand: String,
    pub car_model: String,
    pub car_year: i64,
    pub car_color: String,
    pub car_number: String,
}

/// Trip creation request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTrip {
    pub from_city: String,
    pub to_city: String,
    /// `YYYY-MM-DD`, as submitted by the date input.
    pub trip_date: String,
    /// `HH:MM`, as submitted by the time input.
    pub trip_time: String,
    pub price: i64,
    pub seats: i64,
    pub description: String,
    pub no_smoking: bool,
    pub animals_allowed: bool,
    pub music_allowed: bool,
}

/// Search criteria for `GET /trips/search`. Blank fields are omitted from
/// the query string.
#[derive(Debug, Clone, Default)]
pub struct TripSearch {
    pub from: Option<String>,
    pub to: Option<String>,
    pub date: Option<String>,
}

impl TripSearch {
    /// True when no criterion is set (lists every active trip).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        let blank = |field: &Option<String>| {
            field.as_deref().is_none_or(|s| s.trim().is_empty())
        };
        blank(&self.from) && blank(&self.to) && blank(&self.date)
    }
}

/// Booking creation request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub trip_id: TripId,
    pub seats_booked: i64,
}

/// Review creation request body (driver review by a passenger).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub trip_id: TripId,
    pub target_id: UserId,
    pub rating: Rating,
    pub comment: String,
}

/// Passenger rating body for `POST /bookings/{id}/rate`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassengerRating {
    pub rating: Rating,
    pub comment: String,
}
