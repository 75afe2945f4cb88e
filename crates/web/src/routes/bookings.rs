//! Booking route handlers: the driver-side confirm/reject decisions and
//! the one-time passenger rating.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use hermes_core::{BookingActions, BookingId, BookingStatus, Rating};

use crate::api::{Booking, PassengerRating};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::CurrentUser;
use crate::routes::{MessageQuery, redirect_with_error, redirect_with_success};
use crate::state::AppState;

/// Booking display data for request cards and the rating page.
#[derive(Clone)]
pub struct BookingCardView {
    pub id: i64,
    pub from_city: String,
    pub to_city: String,
    pub date: String,
    pub time: String,
    pub driver_name: String,
    pub passenger_name: String,
    pub passenger_phone: String,
    pub seats_booked: i64,
    pub total_price: i64,
    pub status_label: &'static str,
    pub status_class: &'static str,
    pub actions: BookingActions,
}

impl BookingCardView {
    /// Build the card a driver sees for a request on their trip, action
    /// buttons included.
    #[must_use]
    pub fn for_driver(booking: &Booking) -> Self {
        Self::build(booking, BookingActions::for_driver(booking.status, booking.has_review))
    }

    /// Build the card a passenger sees for their own request (no actions;
    /// the driver decides).
    #[must_use]
    pub fn for_passenger(booking: &Booking) -> Self {
        Self::build(booking, BookingActions::default())
    }

    fn build(booking: &Booking, actions: BookingActions) -> Self {
        Self {
            id: booking.id.as_i64(),
            from_city: booking.from_city.clone(),
            to_city: booking.to_city.clone(),
            date: booking
                .trip_date
                .as_ref()
                .map(filters::format_date)
                .unwrap_or_default(),
            time: booking.trip_time.clone(),
            driver_name: booking.driver_name.clone(),
            passenger_name: booking.passenger_name.clone(),
            passenger_phone: booking.passenger_phone.clone(),
            seats_booked: booking.seats_booked,
            total_price: booking.total_price,
            status_label: booking.status.label(),
            status_class: booking.status.as_str(),
            actions,
        }
    }
}

/// Apply a driver's decision to a booking request.
async fn decide(
    state: &AppState,
    user: &CurrentUser,
    booking_id: BookingId,
    status: BookingStatus,
    success_message: &str,
) -> Redirect {
    match state
        .api()
        .set_booking_status(user.token(), booking_id, status)
        .await
    {
        Ok(()) => redirect_with_success("/profile?tab=bookings", success_message),
        Err(e) => {
            tracing::warn!("Booking status update failed: {e}");
            redirect_with_error("/profile?tab=bookings", &e.to_string())
        }
    }
}

/// Confirm a booking request.
#[instrument(skip(state, user))]
pub async fn confirm(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i64>,
) -> Redirect {
    decide(
        &state,
        &user,
        BookingId::new(id),
        BookingStatus::Confirmed,
        "Booking confirmed!",
    )
    .await
}

/// Decline a booking request.
#[instrument(skip(state, user))]
pub async fn reject(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i64>,
) -> Redirect {
    decide(
        &state,
        &user,
        BookingId::new(id),
        BookingStatus::Cancelled,
        "Booking declined",
    )
    .await
}

// =============================================================================
// Passenger Rating
// =============================================================================

/// Passenger rating form data.
#[derive(Debug, Deserialize)]
pub struct RateForm {
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default)]
    pub comment: String,
}

/// Passenger rating page template.
#[derive(Template, WebTemplate)]
#[template(path = "bookings/rate.html")]
pub struct RatePassengerTemplate {
    pub current_user: Option<CurrentUser>,
    pub booking: BookingCardView,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Look up one of the driver's bookings by ID.
///
/// There is no single-booking endpoint, so this filters the driver's
/// request list the same way the profile tab does.
async fn find_driver_booking(
    state: &AppState,
    user: &CurrentUser,
    booking_id: BookingId,
) -> Result<Booking> {
    let bookings = state.api().driver_bookings(user.token()).await?;
    bookings
        .into_iter()
        .find(|b| b.id == booking_id)
        .ok_or_else(|| AppError::NotFound(format!("booking {booking_id}")))
}

/// Display the passenger rating form.
#[instrument(skip(state, user))]
pub async fn rate_page(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i64>,
    Query(query): Query<MessageQuery>,
) -> Result<RatePassengerTemplate> {
    let booking = find_driver_booking(&state, &user, BookingId::new(id)).await?;

    Ok(RatePassengerTemplate {
        current_user: Some(user),
        booking: BookingCardView::for_driver(&booking),
        error: query.error,
        success: query.success,
    })
}

/// Handle passenger rating submission.
#[instrument(skip(state, user, form))]
pub async fn rate(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i64>,
    Form(form): Form<RateForm>,
) -> Response {
    let back = format!("/bookings/{id}/rate");

    let Some(rating) = form
        .rating
        .as_deref()
        .and_then(|r| r.trim().parse::<u8>().ok())
        .and_then(|r| Rating::new(r).ok())
    else {
        return redirect_with_error(&back, "Choose a rating").into_response();
    };

    let rating = PassengerRating {
        rating,
        comment: form.comment.trim().to_string(),
    };

    match state
        .api()
        .rate_passenger(user.token(), BookingId::new(id), &rating)
        .await
    {
        Ok(()) => {
            redirect_with_success("/profile?tab=bookings", "Passenger rated!").into_response()
        }
        Err(e) => {
            tracing::warn!("Passenger rating failed: {e}");
            redirect_with_error(&back, &e.to_string()).into_response()
        }
    }
}
