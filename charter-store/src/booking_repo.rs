use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use charter_core::repository::{BookingRepository, StoreError, StoreResult};
use charter_core::{Booking, BookingStatus, Charter};

pub struct PostgresBookingRepository {
    pool: PgPool,
}

impl PostgresBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct CharterRow {
    id: Uuid,
    name: String,
    uses_start_times: bool,
    start_times: Vec<String>,
}

impl From<CharterRow> for Charter {
    fn from(row: CharterRow) -> Self {
        Charter {
            id: row.id,
            name: row.name,
            uses_start_times: row.uses_start_times,
            start_times: row.start_times,
        }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    charter_id: Uuid,
    customer_email: String,
    trip_date: DateTime<Utc>,
    days: i32,
    start_time: Option<String>,
    guests: i32,
    status: String,
    expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = StoreError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<BookingStatus>()
            .map_err(|e| StoreError::Corrupt(format!("booking {}: {}", row.id, e)))?;

        Ok(Booking {
            id: row.id,
            charter_id: row.charter_id,
            customer_email: row.customer_email,
            date: row.trip_date,
            days: row.days,
            start_time: row.start_time,
            guests: row.guests,
            status,
            expires_at: row.expires_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const BOOKING_COLUMNS: &str = "id, charter_id, customer_email, trip_date, days, start_time, \
    guests, status, expires_at, created_at, updated_at";

fn store_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StoreError::Unavailable(err.to_string()),
        other => StoreError::Query(other.to_string()),
    }
}

#[async_trait]
impl BookingRepository for PostgresBookingRepository {
    async fn get_charter(&self, id: Uuid) -> StoreResult<Option<Charter>> {
        let row = sqlx::query_as::<_, CharterRow>(
            "SELECT id, name, uses_start_times, start_times FROM charters WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.map(Charter::from))
    }

    async fn get_booking(&self, id: Uuid) -> StoreResult<Option<Booking>> {
        let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1");
        let row = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        row.map(Booking::try_from).transpose()
    }

    async fn list_blocking_bookings(
        &self,
        charter_id: Uuid,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<Booking>> {
        // Mirrors charter_core::lifecycle::blocks_calendar
        let sql = format!(
            r#"
            SELECT {BOOKING_COLUMNS}
            FROM bookings
            WHERE charter_id = $1
              AND (
                status IN ('APPROVED', 'PAID')
                OR (status = 'PENDING' AND (expires_at IS NULL OR expires_at >= $2))
              )
            ORDER BY trip_date
            "#
        );

        let rows = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(charter_id)
            .bind(now)
            .fetch_all(&self.pool)
            .await
            .map_err(store_error)?;

        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn insert_booking(&self, booking: &Booking) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO bookings (
                id, charter_id, customer_email, trip_date, days, start_time, guests,
                status, expires_at, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(booking.id)
        .bind(booking.charter_id)
        .bind(&booking.customer_email)
        .bind(booking.date)
        .bind(booking.days)
        .bind(booking.start_time.as_deref())
        .bind(booking.guests)
        .bind(booking.status.as_str())
        .bind(booking.expires_at)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(())
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: BookingStatus,
        now: DateTime<Utc>,
    ) -> StoreResult<()> {
        let result = sqlx::query("UPDATE bookings SET status = $1, updated_at = $2 WHERE id = $3")
            .bind(status.as_str())
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Query(format!("no booking with id {id}")));
        }
        Ok(())
    }

    async fn expire_pending(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE bookings
            SET status = 'EXPIRED', updated_at = $1
            WHERE status = 'PENDING' AND expires_at < $1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(result.rows_affected())
    }
}
