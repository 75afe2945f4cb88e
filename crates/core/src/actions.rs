//! Pure predicates deciding which action controls appear on trip and
//! booking cards.
//!
//! These are stateless display computations over a record's status, its
//! ownership and the viewer's role. Handlers compute them once per record
//! and hand the result to the templates; the backend independently enforces
//! the same rules, so a stale page can never do more than send a request
//! that gets rejected.

use crate::types::{BookingStatus, TripStatus, UserId, UserRole};

/// The signed-in user looking at a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewer {
    /// The viewer's user ID.
    pub id: UserId,
    /// The viewer's role.
    pub role: UserRole,
}

impl Viewer {
    /// Create a viewer.
    #[must_use]
    pub const fn new(id: UserId, role: UserRole) -> Self {
        Self { id, role }
    }
}

/// Which controls a viewer sees on a trip card or detail page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TripActions {
    /// Show the booking button (passenger, seats left).
    pub can_book: bool,
    /// Show a "log in to book" prompt instead of the booking button.
    pub needs_login: bool,
    /// Show a disabled "no seats left" control.
    pub sold_out: bool,
    /// Show the cancel button (owner, trip still active or pending).
    pub can_cancel: bool,
    /// Show the complete button (owner, trip active).
    pub can_complete: bool,
    /// Show the "leave a review" button (confirmed trip the viewer rode on).
    pub can_review: bool,
}

impl TripActions {
    /// Compute the action set for one trip.
    ///
    /// `driver_id` is optional because list endpoints occasionally omit the
    /// joined driver column; a trip without a known driver never offers the
    /// review action.
    #[must_use]
    pub fn compute(
        status: TripStatus,
        driver_id: Option<UserId>,
        available_seats: i64,
        viewer: Option<Viewer>,
    ) -> Self {
        let is_owner = matches!((viewer, driver_id), (Some(v), Some(d)) if v.id == d);
        let seats_left = available_seats > 0;

        Self {
            can_book: viewer.is_some_and(|v| v.role.is_passenger()) && seats_left && !is_owner,
            needs_login: viewer.is_none(),
            sold_out: !seats_left,
            can_cancel: is_owner && matches!(status, TripStatus::Active | TripStatus::Pending),
            can_complete: is_owner && status == TripStatus::Active,
            can_review: status == TripStatus::Confirmed
                && driver_id.is_some()
                && viewer.is_some()
                && !is_owner,
        }
    }
}

/// Which controls a driver sees on a booking request card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BookingActions {
    /// Show the confirm button.
    pub can_confirm: bool,
    /// Show the reject button.
    pub can_reject: bool,
    /// Show the "rate passenger" button.
    pub can_rate: bool,
}

impl BookingActions {
    /// Compute the action set the trip's driver sees for one booking.
    ///
    /// Pending requests offer confirm/reject; a confirmed booking offers a
    /// one-time passenger rating.
    #[must_use]
    pub fn for_driver(status: BookingStatus, has_review: bool) -> Self {
        let pending = status == BookingStatus::Pending;
        Self {
            can_confirm: pending,
            can_reject: pending,
            can_rate: status == BookingStatus::Confirmed && !has_review,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver(id: i64) -> Viewer {
        Viewer::new(UserId::new(id), UserRole::Driver)
    }

    fn passenger(id: i64) -> Viewer {
        Viewer::new(UserId::new(id), UserRole::Passenger)
    }

    #[test]
    fn test_passenger_with_seats_can_book() {
        let actions = TripActions::compute(
            TripStatus::Active,
            Some(UserId::new(1)),
            3,
            Some(passenger(2)),
        );
        assert!(actions.can_book);
        assert!(!actions.needs_login);
        assert!(!actions.sold_out);
    }

    #[test]
    fn test_guest_is_prompted_to_log_in() {
        let actions = TripActions::compute(TripStatus::Active, Some(UserId::new(1)), 3, None);
        assert!(actions.needs_login);
        assert!(!actions.can_book);
    }

    #[test]
    fn test_driver_never_books() {
        let actions = TripActions::compute(
            TripStatus::Active,
            Some(UserId::new(1)),
            3,
            Some(driver(2)),
        );
        assert!(!actions.can_book);
    }

    #[test]
    fn test_sold_out_disables_booking() {
        let actions = TripActions::compute(
            TripStatus::Active,
            Some(UserId::new(1)),
            0,
            Some(passenger(2)),
        );
        assert!(actions.sold_out);
        assert!(!actions.can_book);
    }

    #[test]
    fn test_owner_can_cancel_active_and_pending() {
        for status in [TripStatus::Active, TripStatus::Pending] {
            let actions =
                TripActions::compute(status, Some(UserId::new(1)), 3, Some(driver(1)));
            assert!(actions.can_cancel, "cancel should show for {status}");
        }
        let done = TripActions::compute(
            TripStatus::Completed,
            Some(UserId::new(1)),
            3,
            Some(driver(1)),
        );
        assert!(!done.can_cancel);
    }

    #[test]
    fn test_owner_can_complete_only_active() {
        let active =
            TripActions::compute(TripStatus::Active, Some(UserId::new(1)), 3, Some(driver(1)));
        assert!(active.can_complete);

        let pending = TripActions::compute(
            TripStatus::Pending,
            Some(UserId::new(1)),
            3,
            Some(driver(1)),
        );
        assert!(!pending.can_complete);
    }

    #[test]
    fn test_non_owner_cannot_manage() {
        let actions = TripActions::compute(
            TripStatus::Active,
            Some(UserId::new(1)),
            3,
            Some(driver(2)),
        );
        assert!(!actions.can_cancel);
        assert!(!actions.can_complete);
    }

    #[test]
    fn test_review_requires_confirmed_trip_and_other_driver() {
        let confirmed = TripActions::compute(
            TripStatus::Confirmed,
            Some(UserId::new(1)),
            0,
            Some(passenger(2)),
        );
        assert!(confirmed.can_review);

        // Own trip: no self-review
        let own = TripActions::compute(
            TripStatus::Confirmed,
            Some(UserId::new(1)),
            0,
            Some(driver(1)),
        );
        assert!(!own.can_review);

        // No known driver: nothing to review
        let unknown = TripActions::compute(TripStatus::Confirmed, None, 0, Some(passenger(2)));
        assert!(!unknown.can_review);

        // Not yet confirmed
        let active = TripActions::compute(
            TripStatus::Active,
            Some(UserId::new(1)),
            0,
            Some(passenger(2)),
        );
        assert!(!active.can_review);
    }

    #[test]
    fn test_pending_booking_offers_confirm_and_reject() {
        let actions = BookingActions::for_driver(BookingStatus::Pending, false);
        assert!(actions.can_confirm);
        assert!(actions.can_reject);
        assert!(!actions.can_rate);
    }

    #[test]
    fn test_confirmed_booking_hides_confirm_and_reject() {
        let actions = BookingActions::for_driver(BookingStatus::Confirmed, false);
        assert!(!actions.can_confirm);
        assert!(!actions.can_reject);
        assert!(actions.can_rate);
    }

    #[test]
    fn test_rating_is_one_time() {
        let actions = BookingActions::for_driver(BookingStatus::Confirmed, true);
        assert!(!actions.can_rate);
    }

    #[test]
    fn test_cancelled_booking_offers_nothing() {
        let actions = BookingActions::for_driver(BookingStatus::Cancelled, false);
        assert_eq!(actions, BookingActions::default());
    }
}
