//! Profile route handlers.
//!
//! One page with tabbed sections (personal, car, trips, bookings, reviews);
//! each tab's list is fetched only when that tab is open. Saves follow the
//! backend's overwrite-everything contract: fetch the current profile,
//! overlay the submitted fields, send the whole record back, then re-fetch
//! so the session mirror and the cache match what the backend stored.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Multipart, Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use hermes_core::{Phone, TripActions, UserId};

use crate::api::{Profile, ProfileUpdate, Review, Trip};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{RequireAuth, set_current_user};
use crate::models::CurrentUser;
use crate::routes::{bookings::BookingCardView, redirect_with_error, redirect_with_success};
use crate::state::AppState;
use crate::storage::AvatarError;

// =============================================================================
// View Models
// =============================================================================

/// Profile display data for the header and the personal/car forms.
#[derive(Clone)]
pub struct ProfileView {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub role_label: &'static str,
    pub is_driver: bool,
    pub rating: f64,
    pub reviews_count: i64,
    pub car_brand: String,
    pub car_model: String,
    pub car_year: String,
    pub car_color: String,
    pub car_number: String,
    pub car_summary: Option<String>,
}

impl From<&Profile> for ProfileView {
    fn from(profile: &Profile) -> Self {
        Self {
            full_name: profile.full_name.clone(),
            email: profile.email.clone(),
            phone: profile.phone.clone(),
            role_label: if profile.role.is_driver() {
                "Driver"
            } else {
                "Passenger"
            },
            is_driver: profile.role.is_driver(),
            rating: profile.rating,
            reviews_count: profile.reviews_count,
            car_brand: profile.car_brand.clone().unwrap_or_default(),
            car_model: profile.car_model.clone().unwrap_or_default(),
            car_year: profile
                .car_year
                .filter(|year| *year > 0)
                .map(|year| year.to_string())
                .unwrap_or_default(),
            car_color: profile.car_color.clone().unwrap_or_default(),
            car_number: profile.car_number.clone().unwrap_or_default(),
            car_summary: profile.car_summary(),
        }
    }
}

/// One of the viewer's trips, with the owner/participant action set.
#[derive(Clone)]
pub struct MyTripView {
    pub id: i64,
    pub from_city: String,
    pub to_city: String,
    pub date: String,
    pub time: String,
    pub seats: i64,
    pub available_seats: i64,
    pub status_label: &'static str,
    pub status_class: &'static str,
    pub actions: TripActions,
}

impl MyTripView {
    fn build(trip: &Trip, user: &CurrentUser) -> Self {
        Self {
            id: trip.id.as_i64(),
            from_city: trip.from_city.clone(),
            to_city: trip.to_city.clone(),
            date: filters::format_date(&trip.trip_date),
            time: trip.trip_time.clone(),
            seats: trip.seats,
            available_seats: trip.available_seats,
            status_label: trip.status.label(),
            status_class: trip.status.as_str(),
            actions: TripActions::compute(
                trip.status,
                trip.driver_id,
                trip.available_seats,
                Some(user.viewer()),
            ),
        }
    }
}

/// Review display data for the reviews tab.
#[derive(Clone)]
pub struct ReviewCardView {
    pub author_name: String,
    pub author_avatar: Option<String>,
    pub stars: String,
    pub trip_line: String,
    pub comment: String,
    pub date: String,
}

impl From<&Review> for ReviewCardView {
    fn from(review: &Review) -> Self {
        let route = if review.from_city.is_empty() || review.to_city.is_empty() {
            String::new()
        } else {
            format!("{} → {}", review.from_city, review.to_city)
        };
        let trip_line = match (route.is_empty(), &review.trip_date) {
            (false, Some(date)) => format!("{route} ({})", filters::format_date(date)),
            (false, None) => route,
            (true, _) => String::new(),
        };

        Self {
            author_name: review.author_name.clone(),
            author_avatar: review.author_avatar.clone(),
            stars: filters::star_row(f64::from(review.rating)),
            trip_line,
            comment: review.comment.clone(),
            date: review
                .created_at
                .as_ref()
                .map(filters::format_date)
                .unwrap_or_default(),
        }
    }
}

// =============================================================================
// Profile Page
// =============================================================================

/// Query parameters for the profile page: open tab plus flash messages.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileQuery {
    pub tab: Option<String>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "profile/show.html")]
pub struct ProfileTemplate {
    pub current_user: Option<CurrentUser>,
    pub user_id: i64,
    pub profile: ProfileView,
    pub has_avatar: bool,
    pub tab: String,
    pub trips: Vec<MyTripView>,
    pub bookings: Vec<BookingCardView>,
    pub reviews: Vec<ReviewCardView>,
    pub error: Option<String>,
    pub success: Option<String>,
}

const TABS: &[&str] = &["personal", "car", "trips", "bookings", "reviews"];

/// Display the profile page with the requested tab's data loaded.
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<ProfileQuery>,
) -> Result<ProfileTemplate> {
    let tab = query
        .tab
        .filter(|t| TABS.contains(&t.as_str()))
        .unwrap_or_else(|| "personal".to_string());

    let profile = state.api().profile(user.token(), user.id).await?;
    let has_avatar = state.avatars().exists(user.id).await;

    let mut trips = Vec::new();
    let mut bookings = Vec::new();
    let mut reviews = Vec::new();

    match tab.as_str() {
        "trips" => {
            trips = state
                .api()
                .my_trips(user.token())
                .await?
                .iter()
                .map(|trip| MyTripView::build(trip, &user))
                .collect();
        }
        "bookings" => {
            // Drivers review incoming requests; passengers track their own
            bookings = if user.role.is_driver() {
                state
                    .api()
                    .driver_bookings(user.token())
                    .await?
                    .iter()
                    .map(BookingCardView::for_driver)
                    .collect()
            } else {
                state
                    .api()
                    .my_bookings(user.token())
                    .await?
                    .iter()
                    .map(BookingCardView::for_passenger)
                    .collect()
            };
        }
        "reviews" => {
            reviews = state
                .api()
                .my_reviews(user.token())
                .await?
                .iter()
                .map(ReviewCardView::from)
                .collect();
        }
        _ => {}
    }

    Ok(ProfileTemplate {
        user_id: user.id.as_i64(),
        profile: ProfileView::from(&profile),
        has_avatar,
        tab,
        trips,
        bookings,
        reviews,
        error: query.error,
        success: query.success,
        current_user: Some(user),
    })
}

// =============================================================================
// Personal & Car Forms
// =============================================================================

/// Personal details form data. Email is shown read-only; the backend does
/// not accept email changes.
#[derive(Debug, Deserialize)]
pub struct PersonalForm {
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
}

/// Car details form data.
#[derive(Debug, Deserialize)]
pub struct CarForm {
    pub car_brand: String,
    pub car_model: String,
    #[serde(default)]
    pub car_year: String,
    #[serde(default)]
    pub car_color: String,
    #[serde(default)]
    pub car_number: String,
}

/// Send a full profile update and refresh the session mirror from the
/// backend's post-write state.
async fn save_profile(
    state: &AppState,
    session: &Session,
    user: &CurrentUser,
    update: ProfileUpdate,
) -> std::result::Result<(), String> {
    state
        .api()
        .update_profile(user.token(), user.id, &update)
        .await
        .map_err(|e| e.to_string())?;

    // The update invalidated the cache; this read is the re-fetch-after-write
    let mut refreshed = user.clone();
    match state.api().profile(user.token(), user.id).await {
        Ok(profile) => refreshed.absorb_profile(&profile),
        Err(e) => {
            tracing::warn!("Profile re-fetch after save failed: {e}");
            refreshed.name = update.full_name;
            refreshed.phone = update.phone;
        }
    }

    set_current_user(session, &refreshed)
        .await
        .map_err(|e| format!("Session error: {e}"))
}

/// Handle personal details form submission.
#[instrument(skip(state, session, user, form))]
pub async fn update_personal(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<PersonalForm>,
) -> Response {
    let back = "/profile?tab=personal";

    let full_name = form.full_name.trim();
    if full_name.len() < 2 {
        return redirect_with_error(back, "Enter your full name").into_response();
    }

    let phone = if form.phone.trim().is_empty() {
        None
    } else {
        match Phone::parse(&form.phone) {
            Ok(phone) => Some(phone.into_inner()),
            Err(_) => {
                return redirect_with_error(back, "Enter a valid phone number").into_response();
            }
        }
    };

    let profile = match state.api().profile(user.token(), user.id).await {
        Ok(profile) => profile,
        Err(e) => return redirect_with_error(back, &e.to_string()).into_response(),
    };

    let update = ProfileUpdate {
        full_name: full_name.to_string(),
        phone: phone.unwrap_or_else(|| profile.phone.clone()),
        car_brand: profile.car_brand.clone().unwrap_or_default(),
        car_model: profile.car_model.clone().unwrap_or_default(),
        car_year: profile.car_year.unwrap_or_default(),
        car_color: profile.car_color.clone().unwrap_or_default(),
        car_number: profile.car_number.clone().unwrap_or_default(),
    };

    match save_profile(&state, &session, &user, update).await {
        Ok(()) => redirect_with_success(back, "Profile saved!").into_response(),
        Err(message) => {
            tracing::warn!("Personal details save failed: {message}");
            redirect_with_error(back, &message).into_response()
        }
    }
}

/// Handle car details form submission.
#[instrument(skip(state, session, user, form))]
pub async fn update_car(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<CarForm>,
) -> Response {
    let back = "/profile?tab=car";

    let car_brand = form.car_brand.trim();
    let car_model = form.car_model.trim();
    if car_brand.is_empty() {
        return redirect_with_error(back, "Enter the car brand").into_response();
    }
    if car_model.is_empty() {
        return redirect_with_error(back, "Enter the car model").into_response();
    }

    let car_year = match form.car_year.trim() {
        "" => 0,
        year => match year.parse::<i64>() {
            Ok(year) if (1900..=2100).contains(&year) => year,
            _ => return redirect_with_error(back, "Enter a valid car year").into_response(),
        },
    };

    let profile = match state.api().profile(user.token(), user.id).await {
        Ok(profile) => profile,
        Err(e) => return redirect_with_error(back, &e.to_string()).into_response(),
    };

    let update = ProfileUpdate {
        full_name: profile.full_name.clone(),
        phone: profile.phone.clone(),
        car_brand: car_brand.to_string(),
        car_model: car_model.to_string(),
        car_year,
        car_color: form.car_color.trim().to_string(),
        car_number: form.car_number.trim().to_string(),
    };

    match save_profile(&state, &session, &user, update).await {
        Ok(()) => redirect_with_success(back, "Car details saved!").into_response(),
        Err(message) => {
            tracing::warn!("Car details save failed: {message}");
            redirect_with_error(back, &message).into_response()
        }
    }
}

// =============================================================================
// Avatar
// =============================================================================

/// Handle an avatar upload (multipart, single `avatar` field).
#[instrument(skip(state, user, multipart))]
pub async fn upload_avatar(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    mut multipart: Multipart,
) -> Response {
    let back = "/profile?tab=personal";

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("Avatar upload failed to parse: {e}");
                return redirect_with_error(back, "Upload failed, try again").into_response();
            }
        };

        if field.name() != Some("avatar") {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Avatar upload failed to read: {e}");
                return redirect_with_error(back, "Upload failed, try again").into_response();
            }
        };

        if bytes.is_empty() {
            return redirect_with_error(back, "Choose an image").into_response();
        }

        return match state.avatars().save(user.id, &content_type, &bytes).await {
            Ok(()) => redirect_with_success(back, "Avatar updated!").into_response(),
            Err(e @ (AvatarError::TooLarge | AvatarError::UnsupportedType(_))) => {
                redirect_with_error(back, &e.to_string()).into_response()
            }
            Err(e) => {
                tracing::error!("Avatar save failed: {e}");
                redirect_with_error(back, "Could not save the avatar").into_response()
            }
        };
    }

    redirect_with_error(back, "Choose an image").into_response()
}

/// Serve a stored avatar.
pub async fn serve_avatar(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response> {
    match state.avatars().load(UserId::new(id)).await? {
        Some((content_type, bytes)) => {
            Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
        }
        None => Err(AppError::NotFound(format!("avatar for user {id}"))),
    }
}
