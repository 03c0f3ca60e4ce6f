use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{Booking, BookingStatus, Charter};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Booking store unavailable: {0}")]
    Unavailable(String),
    #[error("Booking store query failed: {0}")]
    Query(String),
    #[error("Corrupt booking row: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Repository trait for charter and booking data access
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn get_charter(&self, id: Uuid) -> StoreResult<Option<Charter>>;

    async fn get_booking(&self, id: Uuid) -> StoreResult<Option<Booking>>;

    /// Bookings that currently hold the charter's calendar at `now`.
    async fn list_blocking_bookings(
        &self,
        charter_id: Uuid,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<Booking>>;

    async fn insert_booking(&self, booking: &Booking) -> StoreResult<()>;

    async fn update_status(
        &self,
        id: Uuid,
        status: BookingStatus,
        now: DateTime<Utc>,
    ) -> StoreResult<()>;

    /// Bulk `PENDING -> EXPIRED` for every booking whose deadline is strictly
    /// before `now`. Returns the number of rows transitioned.
    async fn expire_pending(&self, now: DateTime<Utc>) -> StoreResult<u64>;
}
