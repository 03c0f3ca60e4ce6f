use std::sync::Arc;
use charter_core::{BookingRepository, BookingService, Clock, ExpirySweep};
use charter_store::app_config::CronConfig;
use chrono::Duration;

#[derive(Clone)]
pub struct AppState {
    pub bookings: BookingService,
    pub sweep: ExpirySweep,
    pub cron: CronConfig,
}

impl AppState {
    pub fn new(
        store: Arc<dyn BookingRepository>,
        clock: Arc<dyn Clock>,
        cron: CronConfig,
        pending_hold: Duration,
    ) -> Self {
        Self {
            bookings: BookingService::new(store.clone(), clock.clone(), pending_hold),
            sweep: ExpirySweep::new(store, clock),
            cron,
        }
    }
}
