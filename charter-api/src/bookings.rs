use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use charter_core::{Availability, Booking, NewBooking};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Trip start as either a full timestamp or a plain calendar day
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum TripDate {
    Timestamp(DateTime<Utc>),
    Day(NaiveDate),
}

impl From<TripDate> for DateTime<Utc> {
    fn from(value: TripDate) -> Self {
        match value {
            TripDate::Timestamp(ts) => ts,
            TripDate::Day(day) => day.and_time(chrono::NaiveTime::MIN).and_utc(),
        }
    }
}

fn default_days() -> i32 { 1 }

#[derive(Debug, Deserialize)]
pub struct AvailabilityRequest {
    pub date: TripDate,
    #[serde(default = "default_days")]
    pub days: i32,
    pub start_time: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub customer_email: String,
    pub date: TripDate,
    #[serde(default = "default_days")]
    pub days: i32,
    pub start_time: Option<String>,
    pub guests: i32,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/charters/{charter_id}/availability", post(check_availability))
        .route("/v1/charters/{charter_id}/bookings", post(create_booking))
        .route("/v1/bookings/{booking_id}", get(get_booking))
        .route("/v1/bookings/{booking_id}/approve", post(approve_booking))
        .route("/v1/bookings/{booking_id}/reject", post(reject_booking))
        .route("/v1/bookings/{booking_id}/cancel", post(cancel_booking))
        .route("/v1/bookings/{booking_id}/pay", post(pay_booking))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/charters/:id/availability
async fn check_availability(
    State(state): State<AppState>,
    Path(charter_id): Path<Uuid>,
    Json(req): Json<AvailabilityRequest>,
) -> Result<Json<Availability>, AppError> {
    let availability = state
        .bookings
        .check_availability(charter_id, req.date.into(), req.days, req.start_time.as_deref())
        .await?;
    Ok(Json(availability))
}

/// POST /v1/charters/:id/bookings
/// Places a pending booking awaiting captain approval
async fn create_booking(
    State(state): State<AppState>,
    Path(charter_id): Path<Uuid>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let booking = state
        .bookings
        .create_booking(NewBooking {
            charter_id,
            customer_email: req.customer_email,
            date: req.date.into(),
            days: req.days,
            start_time: req.start_time,
            guests: req.guests,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(booking)))
}

/// GET /v1/bookings/:id
async fn get_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(state.bookings.get_booking(booking_id).await?))
}

async fn approve_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(state.bookings.approve(booking_id).await?))
}

async fn reject_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(state.bookings.reject(booking_id).await?))
}

async fn cancel_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(state.bookings.cancel(booking_id).await?))
}

/// POST /v1/bookings/:id/pay
/// Payment capture lives with the payment provider; this only records it
async fn pay_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(state.bookings.mark_paid(booking_id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trip_date_accepts_day_or_timestamp() {
        let day: AvailabilityRequest =
            serde_json::from_str(r#"{"date": "2026-07-04"}"#).unwrap();
        let day_start: DateTime<Utc> = day.date.into();
        assert_eq!(day_start.to_rfc3339(), "2026-07-04T00:00:00+00:00");
        assert_eq!(day.days, 1);

        let ts: AvailabilityRequest = serde_json::from_str(
            r#"{"date": "2026-07-04T06:30:00Z", "days": 3, "start_time": "07:00"}"#,
        )
        .unwrap();
        let ts_start: DateTime<Utc> = ts.date.into();
        assert_eq!(ts_start.to_rfc3339(), "2026-07-04T06:30:00+00:00");
        assert_eq!(ts.days, 3);
        assert_eq!(ts.start_time.as_deref(), Some("07:00"));
    }
}
