//! # Notification Repository
//!
//! The enqueue side of the notification contract. Delivery and rendering
//! belong to the notification service; this core only ever appends.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use atlas_core::{Notification, NotificationCategory};

/// Repository for notification operations.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: SqlitePool,
}

impl NotificationRepository {
    /// Creates a new NotificationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        NotificationRepository { pool }
    }

    /// Enqueues a notification for a user.
    ///
    /// Runs on the caller's connection so it can join an atomic unit
    /// (the reward award enqueues in the awarding transaction).
    pub async fn enqueue(
        &self,
        conn: &mut SqliteConnection,
        user_id: &str,
        title: &str,
        message: &str,
        category: NotificationCategory,
    ) -> DbResult<Notification> {
        let notification = Notification {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            title: title.to_string(),
            message: message.to_string(),
            category,
            read: false,
            created_at: Utc::now(),
        };

        debug!(user_id = %user_id, title = %title, "Enqueueing notification");

        sqlx::query(
            "INSERT INTO notifications (id, user_id, title, message, category, read, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&notification.id)
        .bind(&notification.user_id)
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.category)
        .bind(notification.read)
        .bind(notification.created_at)
        .execute(&mut *conn)
        .await?;

        Ok(notification)
    }

    /// Gets a user's notifications, newest first.
    pub async fn list_for_user(&self, user_id: &str) -> DbResult<Vec<Notification>> {
        let notifications: Vec<Notification> = sqlx::query_as(
            "SELECT id, user_id, title, message, category, read, created_at \
             FROM notifications WHERE user_id = ?1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }
}
