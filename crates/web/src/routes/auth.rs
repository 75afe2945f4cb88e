//! Authentication route handlers.
//!
//! Handles login, registration and logout against the backend's auth
//! endpoints. A successful login or registration stores the bearer token and
//! the compact user record in the session; everything else reads them from
//! there.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use hermes_core::{Email, Phone};

use crate::api::{Credentials, NewUser};
use crate::error;
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, session_keys};
use crate::routes::{MessageQuery, redirect_with_error};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub password_confirm: String,
    /// Checkbox; present ("on") when the user registers as a driver.
    #[serde(default)]
    pub is_driver: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub current_user: Option<CurrentUser>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub current_user: Option<CurrentUser>,
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Validation
// =============================================================================

/// Check a login form before any network call.
fn validate_login(form: &LoginForm) -> Result<Credentials, String> {
    let email = form.email.trim();
    if email.is_empty() {
        return Err("Enter your email".to_string());
    }
    let email = Email::parse(email).map_err(|_| "Enter a valid email address".to_string())?;
    if form.password.is_empty() {
        return Err("Enter your password".to_string());
    }

    Ok(Credentials {
        email: email.into_inner(),
        password: form.password.clone(),
    })
}

/// Check a registration form before any network call.
fn validate_register(form: &RegisterForm) -> Result<NewUser, String> {
    let full_name = form.full_name.trim();
    if full_name.len() < 2 {
        return Err("Enter your full name (at least 2 characters)".to_string());
    }
    let email = Email::parse(&form.email).map_err(|_| "Enter a valid email address".to_string())?;
    let phone = Phone::parse(&form.phone).map_err(|_| "Enter a valid phone number".to_string())?;
    if form.password.len() < 6 {
        return Err("Password must be at least 6 characters".to_string());
    }
    if form.password != form.password_confirm {
        return Err("Passwords do not match".to_string());
    }

    Ok(NewUser {
        full_name: full_name.to_string(),
        email: email.into_inner(),
        phone: phone.into_inner(),
        password: form.password.clone(),
        is_driver: form.is_driver.is_some(),
    })
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page. A signed-in visitor is sent home instead.
pub async fn login_page(
    OptionalAuth(current_user): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> Response {
    if current_user.is_some() {
        return Redirect::to("/").into_response();
    }

    LoginTemplate {
        current_user: None,
        error: query.error,
        success: query.success,
    }
    .into_response()
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let credentials = match validate_login(&form) {
        Ok(credentials) => credentials,
        Err(message) => return redirect_with_error("/auth/login", &message).into_response(),
    };

    match state.api().login(&credentials).await {
        Ok(auth) => {
            let user = CurrentUser::from_auth(&auth.user, auth.token);
            error::set_sentry_user(&user.id, Some(&user.email));

            if let Err(e) = set_current_user(&session, &user).await {
                tracing::error!("Failed to set session: {e}");
                return redirect_with_error("/auth/login", "Session error, please try again")
                    .into_response();
            }

            Redirect::to("/").into_response()
        }
        Err(e) => {
            tracing::warn!("Login failed: {e}");
            redirect_with_error("/auth/login", &e.to_string()).into_response()
        }
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page. A signed-in visitor is sent home instead.
pub async fn register_page(
    OptionalAuth(current_user): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> Response {
    if current_user.is_some() {
        return Redirect::to("/").into_response();
    }

    RegisterTemplate {
        current_user: None,
        error: query.error,
        success: query.success,
    }
    .into_response()
}

/// Handle registration form submission.
///
/// The backend signs freshly registered users in, so on success the token
/// goes straight into the session.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Response {
    let new_user = match validate_register(&form) {
        Ok(new_user) => new_user,
        Err(message) => return redirect_with_error("/auth/register", &message).into_response(),
    };

    match state.api().register(&new_user).await {
        Ok(auth) => {
            let mut user = CurrentUser::from_auth(&auth.user, auth.token);
            user.phone = new_user.phone;
            error::set_sentry_user(&user.id, Some(&user.email));

            if let Err(e) = set_current_user(&session, &user).await {
                tracing::error!("Failed to set session after registration: {e}");
                return redirect_with_error("/auth/login", "Session error, please try again")
                    .into_response();
            }

            Redirect::to("/").into_response()
        }
        Err(e) => {
            tracing::warn!("Registration failed: {e}");
            redirect_with_error("/auth/register", &e.to_string()).into_response()
        }
    }
}

// =============================================================================
// Logout Route
// =============================================================================

/// Handle logout.
///
/// Drops the cached profile, clears the session entry and destroys the
/// session itself.
pub async fn logout(State(state): State<AppState>, session: Session) -> Response {
    if let Ok(Some(user)) = session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
    {
        state.api().forget_profile(user.id).await;
    }

    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session: {e}");
    }

    if let Err(e) = session.flush().await {
        tracing::error!("Failed to flush session: {e}");
    }

    error::clear_sentry_user();

    Redirect::to("/").into_response()
}
