//! # User Repository
//!
//! The slice of the users table this system owns: identity lookup for
//! authorization and the loyalty points balance. Registration and profile
//! management live elsewhere.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use atlas_core::User;

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Gets a user by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let user: Option<User> = sqlx::query_as(
            "SELECT id, name, email, role, reward_points, created_at \
             FROM users WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Inserts a user. Seed tooling and tests only.
    pub async fn insert(&self, user: &User) -> DbResult<()> {
        debug!(id = %user.id, email = %user.email, "Inserting user");

        sqlx::query(
            "INSERT INTO users (id, name, email, role, reward_points, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.role)
        .bind(user.reward_points)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Returns a user's current loyalty points balance.
    pub async fn points_balance(&self, id: &str) -> DbResult<Option<i64>> {
        let balance: Option<i64> =
            sqlx::query_scalar("SELECT reward_points FROM users WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(balance)
    }

    /// Adds loyalty points to a user's balance.
    ///
    /// Runs on the caller's transaction: the increment commits together
    /// with the reward record and the notification, or not at all.
    ///
    /// ## Returns
    /// `true` if the user exists and was credited.
    pub async fn add_points(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
        points: i64,
    ) -> DbResult<bool> {
        let result =
            sqlx::query("UPDATE users SET reward_points = reward_points + ?2 WHERE id = ?1")
                .bind(id)
                .bind(points)
                .execute(&mut *conn)
                .await?;

        Ok(result.rows_affected() > 0)
    }
}
