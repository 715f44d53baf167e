//! # Rewards Ledger
//!
//! Credits loyalty points exactly once per completed rental.
//!
//! ## Exactly-Once Crediting
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    award(booking): one atomic unit                      │
//! │                                                                         │
//! │   1. Existing reward record for this booking?                           │
//! │      └── yes → return it, touch nothing (idempotent no-op)             │
//! │                                                                         │
//! │   2. points = total × rate, floored to whole points                     │
//! │                                                                         │
//! │   3. On the caller's transaction:                                       │
//! │      ├── increment renter's balance                                    │
//! │      ├── insert the reward record   (UNIQUE booking_id backs step 1)   │
//! │      └── enqueue "Points Earned" notification                          │
//! │                                                                         │
//! │   The caller's commit lands all three writes (plus, when called from   │
//! │   completion, the status flip) or none of them.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only the booking lifecycle manager calls `award`; request handlers
//! reach rewards exclusively through the read surfaces below.

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::EngineResult;
use atlas_core::{Booking, CoreError, Notification, NotificationCategory, RewardRecord, RewardRate};
use atlas_db::Database;

/// The loyalty ledger service.
#[derive(Clone)]
pub struct RewardsLedger {
    db: Database,
    rate: RewardRate,
}

impl RewardsLedger {
    /// Creates a ledger crediting at `rate`.
    pub fn new(db: Database, rate: RewardRate) -> Self {
        RewardsLedger { db, rate }
    }

    /// Credits points for a completed booking, exactly once.
    ///
    /// Runs entirely on the caller's transaction; see the module diagram.
    /// Re-invocation (retry, duplicate completion callback) returns the
    /// original record without side effects.
    pub async fn award(
        &self,
        conn: &mut SqliteConnection,
        booking: &Booking,
    ) -> EngineResult<RewardRecord> {
        // Idempotency guard: the ledger is insert-only, so an existing
        // record proves this booking was already credited.
        if let Some(existing) = self.db.rewards().get_by_booking(conn, &booking.id).await? {
            debug!(
                booking_id = %booking.id,
                reward_id = %existing.id,
                "Reward already credited, returning existing record"
            );
            return Ok(existing);
        }

        let points = booking.total_price().reward_points(self.rate);

        let credited = self
            .db
            .users()
            .add_points(conn, &booking.renter_id, points)
            .await?;
        if !credited {
            return Err(CoreError::not_found("User", &booking.renter_id).into());
        }

        let record = RewardRecord {
            id: Uuid::new_v4().to_string(),
            user_id: booking.renter_id.clone(),
            booking_id: booking.id.clone(),
            points_earned: points,
            created_at: Utc::now(),
        };
        self.db.rewards().insert(conn, &record).await?;

        self.db
            .notifications()
            .enqueue(
                conn,
                &booking.renter_id,
                "Points Earned",
                &format!("You earned {points} points for your booking!"),
                NotificationCategory::Reward,
            )
            .await?;

        info!(
            booking_id = %booking.id,
            renter_id = %booking.renter_id,
            points,
            "Loyalty points credited"
        );

        Ok(record)
    }

    /// Gets the reward record for a booking, if one exists.
    pub async fn record_for_booking(&self, booking_id: &str) -> EngineResult<Option<RewardRecord>> {
        let mut conn = self.db.acquire().await?;
        Ok(self.db.rewards().get_by_booking(&mut conn, booking_id).await?)
    }

    /// A user's current points balance.
    pub async fn points_balance(&self, user_id: &str) -> EngineResult<i64> {
        self.db
            .users()
            .points_balance(user_id)
            .await?
            .ok_or_else(|| CoreError::not_found("User", user_id).into())
    }

    /// A user's reward history, newest first.
    pub async fn history(&self, user_id: &str) -> EngineResult<Vec<RewardRecord>> {
        Ok(self.db.rewards().history_for_user(user_id).await?)
    }

    /// A user's notification feed, newest first.
    pub async fn notifications_for(&self, user_id: &str) -> EngineResult<Vec<Notification>> {
        Ok(self.db.notifications().list_for_user(user_id).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
