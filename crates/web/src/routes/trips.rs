//! Trip route handlers: search, creation, details, booking and the
//! owner-side lifecycle actions.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use hermes_core::{Rating, TripActions, TripId};

use crate::api::{NewBooking, NewReview, NewTrip, Trip, TripSearch};
use crate::error::Result;
use crate::filters;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::CurrentUser;
use crate::routes::{MessageQuery, redirect_with_error, redirect_with_success};
use crate::state::AppState;

// =============================================================================
// View Models
// =============================================================================

/// Trip display data for search result cards.
#[derive(Clone)]
pub struct TripCardView {
    pub id: i64,
    pub from_city: String,
    pub to_city: String,
    pub date: String,
    pub time: String,
    pub price: i64,
    pub seats: i64,
    pub available_seats: i64,
    pub driver_name: String,
    pub driver_rating: f64,
    pub driver_car: String,
    pub description: String,
    pub no_smoking: bool,
    pub animals_allowed: bool,
    pub music_allowed: bool,
}

impl From<&Trip> for TripCardView {
    fn from(trip: &Trip) -> Self {
        Self {
            id: trip.id.as_i64(),
            from_city: trip.from_city.clone(),
            to_city: trip.to_city.clone(),
            date: filters::format_date(&trip.trip_date),
            time: trip.trip_time.clone(),
            price: trip.price,
            seats: trip.seats,
            available_seats: trip.available_seats,
            driver_name: if trip.driver_name.is_empty() {
                "Driver".to_string()
            } else {
                trip.driver_name.clone()
            },
            driver_rating: trip.driver_rating,
            driver_car: trip.driver_car.clone(),
            description: trip.description.clone(),
            no_smoking: trip.no_smoking,
            animals_allowed: trip.animals_allowed,
            music_allowed: trip.music_allowed,
        }
    }
}

/// Trip display data for the details page.
#[derive(Clone)]
pub struct TripDetailsView {
    pub card: TripCardView,
    pub duration: String,
    pub phone: String,
    pub status_label: &'static str,
    pub status_class: &'static str,
}

impl From<&Trip> for TripDetailsView {
    fn from(trip: &Trip) -> Self {
        Self {
            card: TripCardView::from(trip),
            duration: trip.duration.clone(),
            phone: trip.phone.clone(),
            status_label: trip.status.label(),
            status_class: trip.status.as_str(),
        }
    }
}

// =============================================================================
// Search
// =============================================================================

/// Query parameters for the search page: criteria plus flash messages.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub date: Option<String>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Search page template.
#[derive(Template, WebTemplate)]
#[template(path = "trips/search.html")]
pub struct SearchTemplate {
    pub current_user: Option<CurrentUser>,
    pub from: String,
    pub to: String,
    pub date: String,
    pub trips: Vec<TripCardView>,
    pub searched: bool,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Display the search page.
///
/// Without criteria every active trip is listed; a filtered search needs
/// both cities (the date stays optional). A backend failure renders as a
/// notification over an empty result list rather than an error page.
#[instrument(skip(state, current_user))]
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(current_user): OptionalAuth,
    Query(query): Query<SearchQuery>,
) -> SearchTemplate {
    let mut error = query.error;
    let search = TripSearch {
        from: query.from.clone(),
        to: query.to.clone(),
        date: query.date.clone(),
    };

    let blank = |field: &Option<String>| field.as_deref().is_none_or(|s| s.trim().is_empty());
    let has_both_cities = !blank(&search.from) && !blank(&search.to);
    let filtered = !search.is_empty();

    let trips = if filtered && !has_both_cities {
        error.get_or_insert_with(|| {
            "Enter both departure and destination cities".to_string()
        });
        Vec::new()
    } else {
        match state.api().search_trips(&search).await {
            Ok(trips) => trips.iter().map(TripCardView::from).collect(),
            Err(e) => {
                tracing::warn!("Trip search failed: {e}");
                error.get_or_insert_with(|| e.to_string());
                Vec::new()
            }
        }
    };

    SearchTemplate {
        current_user,
        from: query.from.unwrap_or_default(),
        to: query.to.unwrap_or_default(),
        date: query.date.unwrap_or_default(),
        trips,
        searched: filtered,
        error,
        success: query.success,
    }
}

// =============================================================================
// Creation
// =============================================================================

/// Trip creation form data. Numeric fields arrive as strings so validation
/// can answer with a message instead of a 422.
#[derive(Debug, Deserialize)]
pub struct NewTripForm {
    pub from_city: String,
    pub to_city: String,
    pub trip_date: String,
    pub trip_time: String,
    pub seats: String,
    pub price: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub no_smoking: Option<String>,
    #[serde(default)]
    pub animals_allowed: Option<String>,
    #[serde(default)]
    pub music_allowed: Option<String>,
}

/// Trip creation page template.
#[derive(Template, WebTemplate)]
#[template(path = "trips/new.html")]
pub struct NewTripTemplate {
    pub current_user: Option<CurrentUser>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Check a trip creation form before any network call.
pub(crate) fn validate_new_trip(form: &NewTripForm) -> std::result::Result<NewTrip, String> {
    let from_city = form.from_city.trim();
    let to_city = form.to_city.trim();
    if from_city.is_empty() || to_city.is_empty() {
        return Err("Enter both departure and destination cities".to_string());
    }

    let trip_date = form.trip_date.trim();
    let trip_time = form.trip_time.trim();
    if trip_date.is_empty() || trip_time.is_empty() {
        return Err("Enter the trip date and time".to_string());
    }

    let seats: i64 = form
        .seats
        .trim()
        .parse()
        .map_err(|_| "Enter the number of seats".to_string())?;
    if !(1..=8).contains(&seats) {
        return Err("Seats must be between 1 and 8".to_string());
    }

    let price: i64 = form
        .price
        .trim()
        .parse()
        .map_err(|_| "Enter the price per seat".to_string())?;
    if price < 0 {
        return Err("Price cannot be negative".to_string());
    }

    Ok(NewTrip {
        from_city: from_city.to_string(),
        to_city: to_city.to_string(),
        trip_date: trip_date.to_string(),
        trip_time: trip_time.to_string(),
        price,
        seats,
        description: form.description.trim().to_string(),
        no_smoking: form.no_smoking.is_some(),
        animals_allowed: form.animals_allowed.is_some(),
        music_allowed: form.music_allowed.is_some(),
    })
}

/// Display the trip creation page (drivers only).
pub async fn new_page(
    RequireAuth(user): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> Response {
    if !user.role.is_driver() {
        return redirect_with_error("/trips", "Only drivers can offer trips").into_response();
    }

    NewTripTemplate {
        current_user: Some(user),
        error: query.error,
        success: query.success,
    }
    .into_response()
}

/// Handle trip creation form submission.
#[instrument(skip(state, user, form))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<NewTripForm>,
) -> Response {
    if !user.role.is_driver() {
        return redirect_with_error("/trips", "Only drivers can offer trips").into_response();
    }

    let new_trip = match validate_new_trip(&form) {
        Ok(new_trip) => new_trip,
        Err(message) => return redirect_with_error("/trips/new", &message).into_response(),
    };

    match state.api().create_trip(user.token(), &new_trip).await {
        Ok(()) => {
            redirect_with_success("/profile?tab=trips", "Trip published!").into_response()
        }
        Err(e) => {
            tracing::warn!("Trip creation failed: {e}");
            redirect_with_error("/trips/new", &e.to_string()).into_response()
        }
    }
}

// =============================================================================
// Details & Booking
// =============================================================================

/// Trip details page template.
#[derive(Template, WebTemplate)]
#[template(path = "trips/show.html")]
pub struct TripShowTemplate {
    pub current_user: Option<CurrentUser>,
    pub trip: TripDetailsView,
    pub actions: TripActions,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Display a trip's details with the viewer's action set.
#[instrument(skip(state, current_user))]
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(current_user): OptionalAuth,
    Path(id): Path<i64>,
    Query(query): Query<MessageQuery>,
) -> Result<TripShowTemplate> {
    let trip = state.api().trip(TripId::new(id)).await?;

    let viewer = current_user.as_ref().map(CurrentUser::viewer);
    let actions =
        TripActions::compute(trip.status, trip.driver_id, trip.available_seats, viewer);

    Ok(TripShowTemplate {
        current_user,
        trip: TripDetailsView::from(&trip),
        actions,
        error: query.error,
        success: query.success,
    })
}

/// Booking form data; the seat count input defaults to one seat.
#[derive(Debug, Deserialize)]
pub struct BookForm {
    #[serde(default)]
    pub seats: Option<String>,
}

/// Handle a booking request (passengers only).
#[instrument(skip(state, user, form))]
pub async fn book(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i64>,
    Form(form): Form<BookForm>,
) -> Response {
    let back = format!("/trips/{id}");

    if !user.role.is_passenger() {
        return redirect_with_error(&back, "Only passengers can book seats").into_response();
    }

    let seats = match form
        .seats
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map_or(Ok(1), str::parse::<i64>)
    {
        Ok(seats) if (1..=8).contains(&seats) => seats,
        _ => {
            return redirect_with_error(&back, "You can book between 1 and 8 seats")
                .into_response();
        }
    };

    let booking = NewBooking {
        trip_id: TripId::new(id),
        seats_booked: seats,
    };

    match state.api().create_booking(user.token(), &booking).await {
        Ok(_) => redirect_with_success(
            "/profile?tab=bookings",
            "Request sent! Wait for the driver to confirm.",
        )
        .into_response(),
        Err(e) => {
            tracing::warn!("Booking failed: {e}");
            redirect_with_error(&back, &e.to_string()).into_response()
        }
    }
}

// =============================================================================
// Owner Actions
// =============================================================================

/// Cancel an owned trip.
#[instrument(skip(state, user))]
pub async fn cancel(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i64>,
) -> Redirect {
    match state.api().cancel_trip(user.token(), TripId::new(id)).await {
        Ok(()) => redirect_with_success("/profile?tab=trips", "Trip cancelled"),
        Err(e) => {
            tracing::warn!("Trip cancellation failed: {e}");
            redirect_with_error("/profile?tab=trips", &e.to_string())
        }
    }
}

/// Complete an owned trip, unlocking reviews for its passengers.
#[instrument(skip(state, user))]
pub async fn complete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i64>,
) -> Redirect {
    match state.api().complete_trip(user.token(), TripId::new(id)).await {
        Ok(()) => redirect_with_success("/profile?tab=trips", "Trip completed!"),
        Err(e) => {
            tracing::warn!("Trip completion failed: {e}");
            redirect_with_error("/profile?tab=trips", &e.to_string())
        }
    }
}

// =============================================================================
// Driver Review
// =============================================================================

/// Review form data. The rating arrives from a radio group, so it is absent
/// when nothing was picked.
#[derive(Debug, Deserialize)]
pub struct ReviewForm {
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default)]
    pub comment: String,
}

/// Driver review page template.
#[derive(Template, WebTemplate)]
#[template(path = "trips/review.html")]
pub struct ReviewTemplate {
    pub current_user: Option<CurrentUser>,
    pub trip: TripCardView,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Display the driver review form for a trip the viewer rode on.
#[instrument(skip(state, user))]
pub async fn review_page(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i64>,
    Query(query): Query<MessageQuery>,
) -> Result<ReviewTemplate> {
    let trip = state.api().trip(TripId::new(id)).await?;

    Ok(ReviewTemplate {
        current_user: Some(user),
        trip: TripCardView::from(&trip),
        error: query.error,
        success: query.success,
    })
}

/// Handle driver review submission.
#[instrument(skip(state, user, form))]
pub async fn review(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i64>,
    Form(form): Form<ReviewForm>,
) -> Response {
    let back = format!("/trips/{id}/review");

    let Some(rating) = form
        .rating
        .as_deref()
        .and_then(|r| r.trim().parse::<u8>().ok())
        .and_then(|r| Rating::new(r).ok())
    else {
        return redirect_with_error(&back, "Choose a rating").into_response();
    };

    // The review targets the trip's driver; fetch the trip to resolve them
    let trip = match state.api().trip(TripId::new(id)).await {
        Ok(trip) => trip,
        Err(e) => return redirect_with_error(&back, &e.to_string()).into_response(),
    };

    let Some(driver_id) = trip.driver_id else {
        return redirect_with_error(&back, "This trip has no driver to review").into_response();
    };

    let review = NewReview {
        trip_id: trip.id,
        target_id: driver_id,
        rating,
        comment: form.comment.trim().to_string(),
    };

    match state.api().create_review(user.token(), &review).await {
        Ok(()) => {
            redirect_with_success("/profile?tab=trips", "Thanks for your review!").into_response()
        }
        Err(e) => {
            tracing::warn!("Review creation failed: {e}");
            redirect_with_error(&back, &e.to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_trip_form() -> NewTripForm {
        NewTripForm {
            from_city: "Moscow".to_string(),
            to_city: "Tver".to_string(),
            trip_date: "2026-09-01".to_string(),
            trip_time: "10:30".to_string(),
            seats: "3".to_string(),
            price: "700".to_string(),
            description: String::new(),
            no_smoking: Some("on".to_string()),
            animals_allowed: None,
            music_allowed: None,
        }
    }

    #[test]
    fn test_validate_new_trip_accepts_good_input() {
        let trip = validate_new_trip(&new_trip_form()).expect("valid form");
        assert_eq!(trip.seats, 3);
        assert_eq!(trip.price, 700);
        assert!(trip.no_smoking);
        assert!(!trip.animals_allowed);
    }

    #[test]
    fn test_validate_new_trip_rejects_nine_seats() {
        // Rejected locally, before any network call
        let mut form = new_trip_form();
        form.seats = "9".to_string();
        assert_eq!(
            validate_new_trip(&form).unwrap_err(),
            "Seats must be between 1 and 8"
        );

        form.seats = "0".to_string();
        assert_eq!(
            validate_new_trip(&form).unwrap_err(),
            "Seats must be between 1 and 8"
        );
    }

    #[test]
    fn test_validate_new_trip_rejects_negative_price() {
        let mut form = new_trip_form();
        form.price = "-50".to_string();
        assert_eq!(
            validate_new_trip(&form).unwrap_err(),
            "Price cannot be negative"
        );
    }

    #[test]
    fn test_validate_new_trip_requires_cities_and_schedule() {
        let mut form = new_trip_form();
        form.to_city = "  ".to_string();
        assert_eq!(
            validate_new_trip(&form).unwrap_err(),
            "Enter both departure and destination cities"
        );

        let mut form = new_trip_form();
        form.trip_time = String::new();
        assert_eq!(
            validate_new_trip(&form).unwrap_err(),
            "Enter the trip date and time"
        );
    }

    #[test]
    fn test_validate_new_trip_rejects_unparseable_numbers() {
        let mut form = new_trip_form();
        form.seats = "lots".to_string();
        assert_eq!(
            validate_new_trip(&form).unwrap_err(),
            "Enter the number of seats"
        );
    }
}
