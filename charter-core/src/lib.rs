pub mod booking;
pub mod clock;
pub mod expiry;
pub mod lifecycle;
pub mod memory;
pub mod models;
pub mod overlap;
pub mod repository;

use uuid::Uuid;

pub use booking::{Availability, BookingService};
pub use clock::{Clock, FixedClock, SystemClock};
pub use expiry::{ExpirySweep, SweepReport};
pub use memory::InMemoryBookingRepository;
pub use models::{Booking, BookingStatus, Charter, NewBooking};
pub use overlap::{has_conflict, range_overlaps, ConflictOptions};
pub use repository::{BookingRepository, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Charter not found: {0}")]
    CharterNotFound(Uuid),
    #[error("Booking not found: {0}")]
    BookingNotFound(Uuid),
    #[error("Requested dates conflict with existing booking {0}")]
    Conflict(Uuid),
    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },
    #[error("Booking {0} expired before it was approved")]
    Expired(Uuid),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type CoreResult<T> = Result<T, CoreError>;
