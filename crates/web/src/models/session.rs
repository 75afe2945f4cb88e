//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use hermes_core::{UserId, UserRole, Viewer};

use crate::api::{AuthUser, Profile};

/// Session-stored user identity.
///
/// This is the client-held mirror of the signed-in user: enough to render
/// the nav and authorize page access without a backend round trip, plus the
/// bearer token every protected API call attaches. It is overwritten whole
/// after profile mutations and cleared on logout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's backend ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Phone number (may be blank right after registration).
    #[serde(default)]
    pub phone: String,
    /// Registered role.
    pub role: UserRole,
    /// Bearer token for the backend. Sessions live server-side, so the
    /// token never reaches the browser.
    token: String,
}

impl CurrentUser {
    /// Build the session record from an auth response.
    #[must_use]
    pub fn from_auth(user: &AuthUser, token: String) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            phone: String::new(),
            role: user.role,
            token,
        }
    }

    /// The bearer token for backend calls.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The viewer this user is, for action predicates.
    #[must_use]
    pub const fn viewer(&self) -> Viewer {
        Viewer::new(self.id, self.role)
    }

    /// Overlay the fields a profile fetch is authoritative for.
    pub fn absorb_profile(&mut self, profile: &Profile) {
        self.name = profile.full_name.clone();
        self.email = profile.email.clone();
        self.phone = profile.phone.clone();
        self.role = profile.role;
    }
}

/// Session keys for authentication data.
pub mod session_keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_user() -> CurrentUser {
        CurrentUser {
            id: UserId::new(3),
            name: "Ivan Petrov".to_string(),
            email: "ivan@example.com".to_string(),
            phone: String::new(),
            role: UserRole::Driver,
            token: "jwt-token".to_string(),
        }
    }

    #[test]
    fn test_viewer_carries_id_and_role() {
        let viewer = sample_user().viewer();
        assert_eq!(viewer.id, UserId::new(3));
        assert!(viewer.role.is_driver());
    }

    #[test]
    fn test_absorb_profile_overwrites_identity_fields() {
        let mut user = sample_user();
        let profile: Profile = serde_json::from_str(
            r#"{
                "id": 3,
                "fullName": "Ivan P.",
                "email": "ivan@example.com",
                "phone": "+79161234567",
                "role": "driver"
            }"#,
        )
        .unwrap();

        user.absorb_profile(&profile);
        assert_eq!(user.name, "Ivan P.");
        assert_eq!(user.phone, "+79161234567");
        // Token survives the overlay
        assert_eq!(user.token(), "jwt-token");
    }

    #[test]
    fn test_session_roundtrip_keeps_token() {
        let user = sample_user();
        let json = serde_json::to_string(&user).unwrap();
        let back: CurrentUser = serde_json::from_str(&json).unwrap();
        assert_eq!(back.token(), "jwt-token");
        assert_eq!(back.name, user.name);
    }
}
