use chrono::{DateTime, Duration, Utc};

use crate::models::BookingStatus;
use crate::CoreError;

/// Whether `from -> to` is a legal lifecycle move.
pub fn can_transition(from: BookingStatus, to: BookingStatus) -> bool {
    use crate::models::BookingStatus::*;
    if from.is_terminal() {
        return false;
    }
    matches!(
        (from, to),
        (Pending, Approved)
            | (Pending, Rejected)
            | (Pending, Expired)
            | (Pending, Cancelled)
            | (Approved, Paid)
            | (Approved, Cancelled)
            | (Paid, Cancelled)
    )
}

pub fn transition(from: BookingStatus, to: BookingStatus) -> Result<BookingStatus, CoreError> {
    if can_transition(from, to) {
        Ok(to)
    } else {
        Err(CoreError::InvalidTransition { from, to })
    }
}

/// Whether a booking in this state keeps other trips off the calendar.
/// A pending booking whose deadline has lapsed stops blocking even before
/// the sweep marks it expired.
pub fn blocks_calendar(
    status: BookingStatus,
    expires_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    if status.is_terminal() {
        return false;
    }
    match status {
        BookingStatus::Pending => expires_at.map_or(true, |deadline| deadline >= now),
        _ => true,
    }
}

pub fn default_expiry(created_at: DateTime<Utc>, hold: Duration) -> DateTime<Utc> {
    created_at + hold
}
