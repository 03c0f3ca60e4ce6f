use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::lifecycle::blocks_calendar;
use crate::models::{Booking, BookingStatus, Charter};
use crate::repository::{BookingRepository, StoreError, StoreResult};

#[derive(Default)]
struct Tables {
    charters: HashMap<Uuid, Charter>,
    bookings: HashMap<Uuid, Booking>,
}

/// In-memory booking store for local runs and tests
#[derive(Default)]
pub struct InMemoryBookingRepository {
    tables: RwLock<Tables>,
    offline: AtomicBool,
}

impl InMemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a charter. Never drops the insert, even after a writer panicked.
    pub fn add_charter(&self, charter: Charter) {
        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        tables.charters.insert(charter.id, charter);
    }

    /// Simulate an unreachable store: every call fails until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory store is offline".to_string()));
        }
        self.tables
            .read()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory store is offline".to_string()));
        }
        self.tables
            .write()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn get_charter(&self, id: Uuid) -> StoreResult<Option<Charter>> {
        Ok(self.read()?.charters.get(&id).cloned())
    }

    async fn get_booking(&self, id: Uuid) -> StoreResult<Option<Booking>> {
        Ok(self.read()?.bookings.get(&id).cloned())
    }

    async fn list_blocking_bookings(
        &self,
        charter_id: Uuid,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<Booking>> {
        let tables = self.read()?;
        let mut bookings: Vec<Booking> = tables
            .bookings
            .values()
            .filter(|b| b.charter_id == charter_id)
            .filter(|b| blocks_calendar(b.status, b.expires_at, now))
            .cloned()
            .collect();
        bookings.sort_by_key(|b| b.date);
        Ok(bookings)
    }

    async fn insert_booking(&self, booking: &Booking) -> StoreResult<()> {
        self.write()?.bookings.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: BookingStatus,
        now: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut tables = self.write()?;
        let booking = tables
            .bookings
            .get_mut(&id)
            .ok_or_else(|| StoreError::Query(format!("no booking with id {id}")))?;
        booking.update_status(status, now);
        Ok(())
    }

    async fn expire_pending(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let mut tables = self.write()?;
        let mut expired = 0;
        for booking in tables.bookings.values_mut() {
            if booking.status == BookingStatus::Pending && booking.is_past_deadline(now) {
                booking.update_status(BookingStatus::Expired, now);
                expired += 1;
            }
        }
        Ok(expired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_add_charter_is_readable() {
        let store = InMemoryBookingRepository::new();
        let charter = Charter::whole_day("Reef drift");
        store.add_charter(charter.clone());

        let found = store.get_charter(charter.id).await.unwrap().unwrap();
        assert_eq!(found.name, "Reef drift");
    }

    #[test]
    fn test_add_charter_after_poisoned_lock() {
        let store = Arc::new(InMemoryBookingRepository::new());

        let poisoner = store.clone();
        let result = std::thread::spawn(move || {
            let _guard = poisoner.tables.write().unwrap();
            panic!("writer died holding the lock");
        })
        .join();
        assert!(result.is_err());
        assert!(store.tables.is_poisoned());

        let charter = Charter::whole_day("Night swordfish");
        store.add_charter(charter.clone());

        let tables = store.tables.read().unwrap_or_else(|e| e.into_inner());
        assert!(tables.charters.contains_key(&charter.id));
    }
}
