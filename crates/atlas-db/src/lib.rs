//! # atlas-db: Database Layer for Atlas Rent
//!
//! SQLite persistence for the booking engine: connection pool, embedded
//! migrations, and one repository per aggregate (bookings, cars, users,
//! rewards, notifications).
//!
//! ## Transaction Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Plain reads            → repository methods on the pool                │
//! │                                                                         │
//! │  Atomic units           → Database::begin() hands out a transaction;   │
//! │  (check-and-insert,       repository methods that take a               │
//! │   complete-and-award)     &mut SqliteConnection run on it and          │
//! │                           commit or roll back as one                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Higher-level invariants (per-car serialization of check-and-insert,
//! refund-before-cancel ordering) are the engine's job; this crate only
//! guarantees that what it is told to do atomically is atomic.

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::{
    BookingRepository, CarRepository, NotificationRepository, RewardRepository, UserRepository,
};
