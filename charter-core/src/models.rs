use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::overlap::Reservation;

/// Booking status in the lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Approved,
    Paid,
    Rejected,
    Expired,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Approved => "APPROVED",
            BookingStatus::Paid => "PAID",
            BookingStatus::Rejected => "REJECTED",
            BookingStatus::Expired => "EXPIRED",
            BookingStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::Rejected | BookingStatus::Expired | BookingStatus::Cancelled
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown booking status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for BookingStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(BookingStatus::Pending),
            "APPROVED" => Ok(BookingStatus::Approved),
            "PAID" => Ok(BookingStatus::Paid),
            "REJECTED" => Ok(BookingStatus::Rejected),
            "EXPIRED" => Ok(BookingStatus::Expired),
            "CANCELLED" => Ok(BookingStatus::Cancelled),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

/// A bookable fishing trip offering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Charter {
    pub id: Uuid,
    pub name: String,
    /// Sells fixed daily slots instead of whole-boat days
    pub uses_start_times: bool,
    pub start_times: Vec<String>,
}

impl Charter {
    pub fn whole_day(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            uses_start_times: false,
            start_times: Vec::new(),
        }
    }

    pub fn timed(name: impl Into<String>, start_times: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            uses_start_times: true,
            start_times,
        }
    }

    pub fn offers_start_time(&self, start_time: &str) -> bool {
        self.start_times.is_empty()
            || self.start_times.iter().any(|s| s.trim() == start_time.trim())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub charter_id: Uuid,
    pub customer_email: String,
    pub date: DateTime<Utc>,
    pub days: i32,
    pub start_time: Option<String>,
    pub guests: i32,
    pub status: BookingStatus,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn pending(request: NewBooking, now: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            charter_id: request.charter_id,
            customer_email: request.customer_email,
            date: request.date,
            days: request.days,
            start_time: request.start_time,
            guests: request.guests,
            status: BookingStatus::Pending,
            expires_at: Some(expires_at),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn update_status(&mut self, new_status: BookingStatus, now: DateTime<Utc>) {
        self.status = new_status;
        self.updated_at = now;
    }

    pub fn is_past_deadline(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|deadline| deadline < now)
    }
}

impl Reservation for Booking {
    fn date(&self) -> DateTime<Utc> {
        self.date
    }

    fn days(&self) -> i32 {
        self.days
    }

    fn start_time(&self) -> Option<&str> {
        self.start_time.as_deref()
    }
}

/// Request to place a booking on a charter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBooking {
    pub charter_id: Uuid,
    pub customer_email: String,
    pub date: DateTime<Utc>,
    pub days: i32,
    pub start_time: Option<String>,
    pub guests: i32,
}
