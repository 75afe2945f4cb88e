//! Role and status enums.
//!
//! The backend stores these as lowercase strings; serde mirrors that
//! representation exactly so records round-trip unchanged.

use serde::{Deserialize, Serialize};

/// The role a user registered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Offers trips and reviews passengers.
    Driver,
    /// Books seats and reviews drivers.
    #[default]
    Passenger,
}

impl UserRole {
    /// Whether this role may publish trips.
    #[must_use]
    pub const fn is_driver(self) -> bool {
        matches!(self, Self::Driver)
    }

    /// Whether this role may book seats.
    #[must_use]
    pub const fn is_passenger(self) -> bool {
        matches!(self, Self::Passenger)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Driver => write!(f, "driver"),
            Self::Passenger => write!(f, "passenger"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "driver" => Ok(Self::Driver),
            "passenger" => Ok(Self::Passenger),
            _ => Err(format!("invalid user role: {s}")),
        }
    }
}

/// Lifecycle status of a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TripStatus {
    /// Published and accepting bookings.
    #[default]
    Active,
    /// Awaiting driver confirmation.
    Pending,
    /// Confirmed by the driver.
    Confirmed,
    /// Cancelled by the driver; bookings are cancelled with it.
    Cancelled,
    /// Driven to completion; reviews may be left.
    Completed,
}

impl TripStatus {
    /// Human-readable label for trip cards.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Pending => "Awaiting confirmation",
            Self::Confirmed => "Confirmed",
            Self::Cancelled => "Cancelled",
            Self::Completed => "Completed",
        }
    }

    /// CSS class suffix used by the templates.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for TripStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle status of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Requested by the passenger, awaiting the driver's decision.
    #[default]
    Pending,
    /// Accepted by the driver.
    Confirmed,
    /// Rejected by the driver or withdrawn.
    Cancelled,
}

impl BookingStatus {
    /// Human-readable label for booking cards.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Awaiting confirmation",
            Self::Confirmed => "Confirmed",
            Self::Cancelled => "Declined",
        }
    }

    /// CSS class suffix used by the templates.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serde_lowercase() {
        let role: UserRole = serde_json::from_str("\"driver\"").unwrap();
        assert_eq!(role, UserRole::Driver);
        assert_eq!(serde_json::to_string(&UserRole::Passenger).unwrap(), "\"passenger\"");
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("driver".parse::<UserRole>().unwrap(), UserRole::Driver);
        assert!("admin".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_trip_status_roundtrip() {
        for status in [
            TripStatus::Active,
            TripStatus::Pending,
            TripStatus::Confirmed,
            TripStatus::Cancelled,
            TripStatus::Completed,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
            let back: TripStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(back, status);
        }
    }

    #[test]
    fn test_booking_status_roundtrip() {
        let status: BookingStatus = serde_json::from_str("\"pending\"").unwrap();
        assert_eq!(status, BookingStatus::Pending);
        assert_eq!(
            serde_json::to_string(&BookingStatus::Cancelled).unwrap(),
            "\"cancelled\""
        );
    }

    #[test]
    fn test_labels() {
        assert_eq!(TripStatus::Completed.label(), "Completed");
        assert_eq!(BookingStatus::Cancelled.label(), "Declined");
    }
}
