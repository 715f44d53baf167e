//! # Car Catalog Repository
//!
//! Read access to the car catalog, plus the writes the seed tool and
//! catalog management need. The booking engine itself only ever reads.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use atlas_core::Car;

/// Repository for car catalog operations.
#[derive(Debug, Clone)]
pub struct CarRepository {
    pool: SqlitePool,
}

impl CarRepository {
    /// Creates a new CarRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CarRepository { pool }
    }

    /// Gets a car by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Car>> {
        let car: Option<Car> = sqlx::query_as(
            "SELECT id, name, model, price_per_day_cents, available, created_at \
             FROM cars WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(car)
    }

    /// Inserts a car. Catalog management / seed tooling only.
    pub async fn insert(&self, car: &Car) -> DbResult<()> {
        debug!(id = %car.id, name = %car.name, "Inserting car");

        sqlx::query(
            "INSERT INTO cars (id, name, model, price_per_day_cents, available, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&car.id)
        .bind(&car.name)
        .bind(&car.model)
        .bind(car.price_per_day_cents)
        .bind(car.available)
        .bind(car.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates a car's per-day price.
    ///
    /// Existing bookings keep their frozen totals; only future pricing
    /// changes.
    pub async fn update_price(&self, id: &str, price_per_day_cents: i64) -> DbResult<bool> {
        let result = sqlx::query("UPDATE cars SET price_per_day_cents = ?2 WHERE id = ?1")
            .bind(id)
            .bind(price_per_day_cents)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Flips whether the car is offered for booking.
    pub async fn set_available(&self, id: &str, available: bool) -> DbResult<bool> {
        let result = sqlx::query("UPDATE cars SET available = ?2 WHERE id = ?1")
            .bind(id)
            .bind(available)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts catalog entries. Used by the seed tool to avoid reseeding.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cars")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
