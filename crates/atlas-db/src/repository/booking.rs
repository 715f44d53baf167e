//! # Booking Repository
//!
//! Database operations for bookings.
//!
//! ## Booking Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Booking Lifecycle                                 │
//! │                                                                         │
//! │  1. CREATE                                                             │
//! │     └── has_conflict() + insert() inside one transaction,              │
//! │         under the engine's per-car lock → status: pending              │
//! │                                                                         │
//! │  2. CONFIRM                                                            │
//! │     └── confirm() → status: confirmed (guarded UPDATE)                 │
//! │                                                                         │
//! │  3. COMPLETE                                                           │
//! │     └── complete() → status: completed                                 │
//! │         (same transaction as the reward award)                         │
//! │                                                                         │
//! │  4. (ALTERNATIVE) CANCEL                                               │
//! │     └── cancel() → status: cancelled (after any refund succeeded)      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Guarded Updates
//! Every status write carries its precondition in the WHERE clause
//! (`... AND status = 'pending'`). A racing writer that moved the booking
//! first makes the UPDATE touch zero rows, which callers surface as an
//! invalid transition instead of silently clobbering state.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use atlas_core::{Booking, PaymentStatus, RentalPeriod, TurnoverPolicy};

/// Columns fetched for every booking read, matching `Booking`'s fields.
const BOOKING_COLUMNS: &str = "id, car_id, renter_id, start_date, end_date, \
     total_price_cents, status, payment_ref, payment_status, created_at, updated_at";

/// Repository for booking database operations.
#[derive(Debug, Clone)]
pub struct BookingRepository {
    pool: SqlitePool,
}

impl BookingRepository {
    /// Creates a new BookingRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BookingRepository { pool }
    }

    /// Gets a booking by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Booking>> {
        let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1");

        let booking: Option<Booking> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(booking)
    }

    /// Checks whether any non-cancelled booking on the car overlaps the
    /// candidate period.
    ///
    /// ## Note
    /// This is a pure predicate, not a lock. Callers that go on to insert
    /// must run it on the inserting transaction's connection, under the
    /// engine's per-car lock, or the check is unsound.
    pub async fn has_conflict(
        &self,
        conn: &mut SqliteConnection,
        car_id: &str,
        period: &RentalPeriod,
        policy: TurnoverPolicy,
    ) -> DbResult<bool> {
        // Closed-interval overlap; the policy decides whether a shared
        // handover day counts. ISO dates compare correctly as text.
        let sql = match policy {
            TurnoverPolicy::SameDayBlocked => {
                "SELECT COUNT(*) FROM bookings \
                 WHERE car_id = ?1 AND status != 'cancelled' \
                 AND NOT (end_date < ?2 OR start_date > ?3)"
            }
            TurnoverPolicy::SameDayAllowed => {
                "SELECT COUNT(*) FROM bookings \
                 WHERE car_id = ?1 AND status != 'cancelled' \
                 AND NOT (end_date <= ?2 OR start_date >= ?3)"
            }
        };

        let count: i64 = sqlx::query_scalar(sql)
            .bind(car_id)
            .bind(period.start)
            .bind(period.end)
            .fetch_one(&mut *conn)
            .await?;

        Ok(count > 0)
    }

    /// Inserts a booking.
    ///
    /// Runs on the caller's connection so the insert commits (or rolls
    /// back) together with the conflict re-check.
    pub async fn insert(&self, conn: &mut SqliteConnection, booking: &Booking) -> DbResult<()> {
        debug!(id = %booking.id, car_id = %booking.car_id, "Inserting booking");

        sqlx::query(
            r#"
            INSERT INTO bookings (
                id, car_id, renter_id, start_date, end_date,
                total_price_cents, status, payment_ref, payment_status,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&booking.id)
        .bind(&booking.car_id)
        .bind(&booking.renter_id)
        .bind(booking.start_date)
        .bind(booking.end_date)
        .bind(booking.total_price_cents)
        .bind(booking.status)
        .bind(&booking.payment_ref)
        .bind(booking.payment_status)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Moves a pending booking to confirmed.
    ///
    /// ## Returns
    /// `true` if the row was updated, `false` if the booking was not in
    /// the required prior status (or does not exist).
    pub async fn confirm(&self, conn: &mut SqliteConnection, id: &str) -> DbResult<bool> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE bookings SET status = 'confirmed', updated_at = ?2 \
             WHERE id = ?1 AND status = 'pending'",
        )
        .bind(id)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Moves a confirmed booking to completed.
    ///
    /// Runs on the caller's transaction: the status write must commit
    /// together with the reward award or not at all.
    pub async fn complete(&self, conn: &mut SqliteConnection, id: &str) -> DbResult<bool> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE bookings SET status = 'completed', updated_at = ?2 \
             WHERE id = ?1 AND status = 'confirmed'",
        )
        .bind(id)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Moves a pending or confirmed booking to cancelled, writing the
    /// payment status in the same statement.
    ///
    /// ## Note
    /// When a refund was issued this is the final committing step: the
    /// caller passes `PaymentStatus::Refunded` only after the external
    /// refund call returned success.
    pub async fn cancel(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
        payment_status: PaymentStatus,
    ) -> DbResult<bool> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE bookings SET status = 'cancelled', payment_status = ?2, updated_at = ?3 \
             WHERE id = ?1 AND status IN ('pending', 'confirmed')",
        )
        .bind(id)
        .bind(payment_status)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Records that the processor captured the authorized charge.
    pub async fn mark_payment_captured(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
    ) -> DbResult<bool> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE bookings SET payment_status = 'captured', updated_at = ?2 \
             WHERE id = ?1 AND payment_status = 'authorized'",
        )
        .bind(id)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Gets all bookings for a renter, newest first.
    pub async fn list_for_renter(&self, renter_id: &str) -> DbResult<Vec<Booking>> {
        let sql = format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings \
             WHERE renter_id = ?1 ORDER BY created_at DESC"
        );

        let bookings: Vec<Booking> = sqlx::query_as(&sql)
            .bind(renter_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(bookings)
    }

    /// Gets every booking, newest first. Operator surface.
    pub async fn list_all(&self) -> DbResult<Vec<Booking>> {
        let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY created_at DESC");

        let bookings: Vec<Booking> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;

        Ok(bookings)
    }

    /// Gets all non-cancelled bookings for a car ordered by start date.
    ///
    /// Used by invariant checks in tests and operator tooling.
    pub async fn list_active_for_car(&self, car_id: &str) -> DbResult<Vec<Booking>> {
        let sql = format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings \
             WHERE car_id = ?1 AND status != 'cancelled' ORDER BY start_date"
        );

        let bookings: Vec<Booking> = sqlx::query_as(&sql)
            .bind(car_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(bookings)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
