//! # Reward Repository
//!
//! The loyalty ledger: insert-only reward records, one per completed
//! booking. The UNIQUE constraint on booking_id backs the engine's
//! idempotency guard at the storage level.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use atlas_core::RewardRecord;

/// Repository for reward ledger operations.
#[derive(Debug, Clone)]
pub struct RewardRepository {
    pool: SqlitePool,
}

impl RewardRepository {
    /// Creates a new RewardRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RewardRepository { pool }
    }

    /// Gets the reward record for a booking, if one was ever credited.
    ///
    /// Takes the caller's connection so the award path can run its
    /// idempotency check inside the awarding transaction.
    pub async fn get_by_booking(
        &self,
        conn: &mut SqliteConnection,
        booking_id: &str,
    ) -> DbResult<Option<RewardRecord>> {
        let record: Option<RewardRecord> = sqlx::query_as(
            "SELECT id, user_id, booking_id, points_earned, created_at \
             FROM rewards WHERE booking_id = ?1",
        )
        .bind(booking_id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(record)
    }

    /// Inserts a reward record.
    ///
    /// Runs on the caller's transaction. A duplicate booking_id surfaces
    /// as `DbError::UniqueViolation`, the storage-level idempotency
    /// guard firing when two awarders race.
    pub async fn insert(
        &self,
        conn: &mut SqliteConnection,
        record: &RewardRecord,
    ) -> DbResult<()> {
        debug!(
            booking_id = %record.booking_id,
            points = record.points_earned,
            "Inserting reward record"
        );

        sqlx::query(
            "INSERT INTO rewards (id, user_id, booking_id, points_earned, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&record.id)
        .bind(&record.user_id)
        .bind(&record.booking_id)
        .bind(record.points_earned)
        .bind(record.created_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Gets a user's reward history, newest first.
    pub async fn history_for_user(&self, user_id: &str) -> DbResult<Vec<RewardRecord>> {
        let records: Vec<RewardRecord> = sqlx::query_as(
            "SELECT id, user_id, booking_id, points_earned, created_at \
             FROM rewards WHERE user_id = ?1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
