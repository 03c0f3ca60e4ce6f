use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::lifecycle::{default_expiry, transition};
use crate::models::{Booking, BookingStatus, Charter, NewBooking};
use crate::overlap::{find_conflict, ConflictOptions};
use crate::repository::BookingRepository;
use crate::{CoreError, CoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub conflict: bool,
}

/// Booking placement and lifecycle over a [`BookingRepository`]
#[derive(Clone)]
pub struct BookingService {
    store: Arc<dyn BookingRepository>,
    clock: Arc<dyn Clock>,
    pending_hold: Duration,
}

impl BookingService {
    pub fn new(
        store: Arc<dyn BookingRepository>,
        clock: Arc<dyn Clock>,
        pending_hold: Duration,
    ) -> Self {
        Self {
            store,
            clock,
            pending_hold,
        }
    }

    async fn load_charter(&self, charter_id: Uuid) -> CoreResult<Charter> {
        self.store
            .get_charter(charter_id)
            .await?
            .ok_or(CoreError::CharterNotFound(charter_id))
    }

    async fn load_booking(&self, booking_id: Uuid) -> CoreResult<Booking> {
        self.store
            .get_booking(booking_id)
            .await?
            .ok_or(CoreError::BookingNotFound(booking_id))
    }

    fn conflict_options(charter: &Charter, start_time: Option<&str>) -> ConflictOptions {
        ConflictOptions {
            uses_start_times: charter.uses_start_times,
            selected_start_time: start_time.map(String::from),
        }
    }

    /// Advisory check; a later `create_booking` re-checks before inserting.
    pub async fn check_availability(
        &self,
        charter_id: Uuid,
        date: DateTime<Utc>,
        days: i32,
        start_time: Option<&str>,
    ) -> CoreResult<Availability> {
        let charter = self.load_charter(charter_id).await?;
        let existing = self.store.list_blocking_bookings(charter_id, self.clock.now()).await?;
        let options = Self::conflict_options(&charter, start_time);

        let conflict = find_conflict(&existing, date, days, &options).is_some();
        Ok(Availability { conflict })
    }

    pub async fn create_booking(&self, request: NewBooking) -> CoreResult<Booking> {
        let charter = self.load_charter(request.charter_id).await?;
        validate_request(&charter, &request)?;

        let now = self.clock.now();
        let existing = self.store.list_blocking_bookings(charter.id, now).await?;
        let options = Self::conflict_options(&charter, request.start_time.as_deref());

        if let Some(blocking) = find_conflict(&existing, request.date, request.days, &options) {
            warn!(
                charter_id = %charter.id,
                blocking_booking = %blocking.id,
                "Rejected booking request: dates already taken"
            );
            return Err(CoreError::Conflict(blocking.id));
        }

        let expires_at = default_expiry(now, self.pending_hold);
        let booking = Booking::pending(request, now, expires_at);
        self.store.insert_booking(&booking).await?;

        info!(booking_id = %booking.id, charter_id = %charter.id, %expires_at, "Booking created");
        Ok(booking)
    }

    pub async fn get_booking(&self, booking_id: Uuid) -> CoreResult<Booking> {
        self.load_booking(booking_id).await
    }

    /// Pending -> Approved, refused once the approval deadline has passed
    pub async fn approve(&self, booking_id: Uuid) -> CoreResult<Booking> {
        let booking = self.load_booking(booking_id).await?;
        let now = self.clock.now();
        if booking.status == BookingStatus::Pending && booking.is_past_deadline(now) {
            return Err(CoreError::Expired(booking_id));
        }
        self.apply(booking, BookingStatus::Approved, now).await
    }

    pub async fn reject(&self, booking_id: Uuid) -> CoreResult<Booking> {
        self.move_to(booking_id, BookingStatus::Rejected).await
    }

    pub async fn cancel(&self, booking_id: Uuid) -> CoreResult<Booking> {
        self.move_to(booking_id, BookingStatus::Cancelled).await
    }

    pub async fn mark_paid(&self, booking_id: Uuid) -> CoreResult<Booking> {
        self.move_to(booking_id, BookingStatus::Paid).await
    }

    async fn move_to(&self, booking_id: Uuid, to: BookingStatus) -> CoreResult<Booking> {
        let booking = self.load_booking(booking_id).await?;
        self.apply(booking, to, self.clock.now()).await
    }

    async fn apply(
        &self,
        mut booking: Booking,
        to: BookingStatus,
        now: DateTime<Utc>,
    ) -> CoreResult<Booking> {
        let from = booking.status;
        let next = transition(from, to)?;
        self.store.update_status(booking.id, next, now).await?;
        booking.update_status(next, now);

        info!(booking_id = %booking.id, %from, to = %next, "Booking status changed");
        Ok(booking)
    }
}

fn validate_request(charter: &Charter, request: &NewBooking) -> CoreResult<()> {
    if request.guests < 1 {
        return Err(CoreError::ValidationError("at least one guest is required".to_string()));
    }
    if request.customer_email.trim().is_empty() {
        return Err(CoreError::ValidationError("customer email is required".to_string()));
    }

    if charter.uses_start_times {
        let start_time = request
            .start_time
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| {
                CoreError::ValidationError("this charter requires a start time".to_string())
            })?;

        if !charter.offers_start_time(start_time) {
            return Err(CoreError::ValidationError(format!(
                "start time {start_time} is not offered by this charter"
            )));
        }
    }

    Ok(())
}
