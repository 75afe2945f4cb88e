//! Star rating type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a rating is outside the 1-5 range.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("rating must be between 1 and 5, got {0}")]
pub struct RatingError(pub u8);

/// A 1-5 star rating given in a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rating(u8);

impl Rating {
    /// Lowest allowed rating.
    pub const MIN: u8 = 1;

    /// Highest allowed rating.
    pub const MAX: u8 = 5;

    /// Create a rating, rejecting values outside 1..=5.
    ///
    /// # Errors
    ///
    /// Returns [`RatingError`] if `value` is 0 or greater than 5.
    pub const fn new(value: u8) -> Result<Self, RatingError> {
        if value >= Self::MIN && value <= Self::MAX {
            Ok(Self(value))
        } else {
            Err(RatingError(value))
        }
    }

    /// Get the underlying value.
    #[must_use]
    pub const fn as_u8(&self) -> u8 {
        self.0
    }

    /// Render the rating as filled stars, e.g. `★★★★` for 4.
    #[must_use]
    pub fn stars(&self) -> String {
        "★".repeat(usize::from(self.0))
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for Rating {
    type Error = RatingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
