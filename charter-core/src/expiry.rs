use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::repository::BookingRepository;
use crate::CoreResult;

/// Outcome of one sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    #[serde(rename = "expired")]
    pub expired_count: u64,
}

/// Moves pending bookings past their approval deadline to `EXPIRED`.
///
/// The sweep is trigger-agnostic: the background worker and the cron
/// endpoint both call [`ExpirySweep::run`]. Running it twice in a row is
/// harmless because the store filter re-checks `status = PENDING`.
#[derive(Clone)]
pub struct ExpirySweep {
    store: Arc<dyn BookingRepository>,
    clock: Arc<dyn Clock>,
}

impl ExpirySweep {
    pub fn new(store: Arc<dyn BookingRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub async fn run(&self) -> CoreResult<SweepReport> {
        self.run_at(self.clock.now()).await
    }

    /// Store failures propagate; they are never reported as zero expirations.
    pub async fn run_at(&self, now: DateTime<Utc>) -> CoreResult<SweepReport> {
        let expired_count = self.store.expire_pending(now).await?;

        if expired_count > 0 {
            info!(expired = expired_count, %now, "Expired pending bookings");
        } else {
            debug!(%now, "No pending bookings past their deadline");
        }

        Ok(SweepReport { expired_count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::memory::InMemoryBookingRepository;
    use crate::models::{Booking, BookingStatus, Charter, NewBooking};
    use crate::CoreError;
    use chrono::{Duration, TimeZone};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 10, 9, 0, 0).unwrap()
    }

    fn pending(charter: &Charter, expires_at: DateTime<Utc>) -> Booking {
        let request = NewBooking {
            charter_id: charter.id,
            customer_email: "angler@example.com".to_string(),
            date: start() + Duration::days(14),
            days: 1,
            start_time: None,
            guests: 2,
        };
        Booking::pending(request, start(), expires_at)
    }

    #[tokio::test]
    async fn test_sweep_is_idempotent() {
        let store = Arc::new(InMemoryBookingRepository::new());
        let charter = Charter::whole_day("Offshore tuna");
        store.add_charter(charter.clone());

        for _ in 0..3 {
            store.insert_booking(&pending(&charter, start() + Duration::hours(24))).await.unwrap();
        }
        let fresh = pending(&charter, start() + Duration::hours(72));
        store.insert_booking(&fresh).await.unwrap();

        let clock = Arc::new(FixedClock::new(start() + Duration::hours(48)));
        let sweep = ExpirySweep::new(store.clone(), clock);

        assert_eq!(sweep.run().await.unwrap().expired_count, 3);
        assert_eq!(sweep.run().await.unwrap().expired_count, 0);

        let untouched = store.get_booking(fresh.id).await.unwrap().unwrap();
        assert_eq!(untouched.status, BookingStatus::Pending);
    }

    #[tokio::test]
    async fn test_deadline_is_strict() {
        let store = Arc::new(InMemoryBookingRepository::new());
        let charter = Charter::whole_day("Bay trip");
        let deadline = start() + Duration::hours(24);
        store.insert_booking(&pending(&charter, deadline)).await.unwrap();

        let clock = Arc::new(FixedClock::new(deadline));
        let sweep = ExpirySweep::new(store.clone(), clock.clone());
        assert_eq!(sweep.run().await.unwrap().expired_count, 0);

        clock.advance(Duration::seconds(1));
        assert_eq!(sweep.run().await.unwrap().expired_count, 1);
    }

    #[tokio::test]
    async fn test_only_pending_bookings_expire() {
        let store = Arc::new(InMemoryBookingRepository::new());
        let charter = Charter::whole_day("Bay trip");
        let deadline = start() + Duration::hours(1);

        let approved = pending(&charter, deadline);
        store.insert_booking(&approved).await.unwrap();
        store.update_status(approved.id, BookingStatus::Approved, start()).await.unwrap();

        let mut no_deadline = pending(&charter, deadline);
        no_deadline.expires_at = None;
        store.insert_booking(&no_deadline).await.unwrap();

        let sweep = ExpirySweep::new(store.clone(), Arc::new(FixedClock::new(start())));
        let report = sweep.run_at(start() + Duration::days(30)).await.unwrap();
        assert_eq!(report.expired_count, 0);

        let approved = store.get_booking(approved.id).await.unwrap().unwrap();
        assert_eq!(approved.status, BookingStatus::Approved);
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let store = Arc::new(InMemoryBookingRepository::new());
        store.set_offline(true);

        let sweep = ExpirySweep::new(store, Arc::new(FixedClock::new(start())));
        let err = sweep.run().await.unwrap_err();
        assert!(matches!(err, CoreError::Store(_)));
    }

    #[test]
    fn test_report_serializes_as_expired() {
        let json = serde_json::to_value(SweepReport { expired_count: 4 }).unwrap();
        assert_eq!(json, serde_json::json!({ "expired": 4 }));
    }
}
