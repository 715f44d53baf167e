//! # Domain Types
//!
//! Core domain types used throughout Atlas Rent.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Car        │   │    Booking      │   │  RewardRecord   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  price_per_day  │   │  car_id (FK)    │   │  booking_id (FK,│       │
//! │  │  available      │   │  status         │   │    UNIQUE)      │       │
//! │  └─────────────────┘   │  payment_status │   │  points_earned  │       │
//! │                        │  total (frozen) │   └─────────────────┘       │
//! │  ┌─────────────────┐   └─────────────────┘   ┌─────────────────┐       │
//! │  │  BookingStatus  │   ┌─────────────────┐   │  Notification   │       │
//! │  │  ─────────────  │   │  PaymentStatus  │   │  ─────────────  │       │
//! │  │  Pending        │   │  ─────────────  │   │  title/message  │       │
//! │  │  Confirmed      │   │  None           │   │  category       │       │
//! │  │  Completed      │   │  Authorized     │   │  read flag      │       │
//! │  │  Cancelled      │   │  Captured       │   └─────────────────┘       │
//! │  └─────────────────┘   │  Refunded       │                             │
//! │                        └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;
use crate::period::RentalPeriod;

// =============================================================================
// Roles
// =============================================================================

/// Actor role used for authorization decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// A regular customer; may act only on their own bookings.
    Renter,
    /// Back-office staff; may act on any booking.
    Admin,
}

// =============================================================================
// Car
// =============================================================================

/// A rentable vehicle. Owned by catalog management; read-only to the
/// booking engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Car {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name, e.g. "Toyota Corolla".
    pub name: String,

    /// Model/trim descriptor.
    pub model: String,

    /// Whole-day rental price in cents.
    pub price_per_day_cents: i64,

    /// Whether the car is offered for booking at all.
    pub available: bool,

    /// When the car was added to the catalog.
    pub created_at: DateTime<Utc>,
}

impl Car {
    /// Returns the per-day price as a Money type.
    #[inline]
    pub fn price_per_day(&self) -> Money {
        Money::from_cents(self.price_per_day_cents)
    }
}

// =============================================================================
// User
// =============================================================================

/// A registered user. Only the role and reward balance matter to the
/// booking engine; profile management lives elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    /// Accumulated loyalty points.
    pub reward_points: i64,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Booking Status
// =============================================================================

/// The status of a booking.
///
/// ## State Machine
/// ```text
///            create
///    (none) ────────► Pending
///    Pending  ── confirm ──► Confirmed
///    Confirmed ── complete ──► Completed      (terminal)
///    Pending/Confirmed ── cancel ──► Cancelled (terminal)
/// ```
/// No transition leaves Completed or Cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Created, payment authorization requested, awaiting confirmation.
    Pending,
    /// Payment verified; the reservation holds the car.
    Confirmed,
    /// Rental finished; loyalty points credited.
    Completed,
    /// Cancelled by the renter or an admin.
    Cancelled,
}

impl BookingStatus {
    /// Whether the state machine permits moving from `self` to `next`.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed) | (Confirmed, Completed) | (Pending, Cancelled) | (Confirmed, Cancelled)
        )
    }

    /// Terminal states accept no further transitions.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    /// Whether a booking in this status occupies the car for conflict
    /// purposes. Everything but Cancelled does.
    #[inline]
    pub fn occupies_car(&self) -> bool {
        !matches!(self, BookingStatus::Cancelled)
    }
}

impl Default for BookingStatus {
    fn default() -> Self {
        BookingStatus::Pending
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

// =============================================================================
// Payment Status
// =============================================================================

/// Where the booking's payment stands with the external processor.
///
/// The local record never leads the processor: Captured is only set after
/// the processor confirms the charge, Refunded only after a refund call
/// succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// No payment activity recorded.
    None,
    /// An authorization (payment intent) exists for the full amount.
    Authorized,
    /// The charge was captured by the processor.
    Captured,
    /// A captured charge was refunded in full.
    Refunded,
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::None
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentStatus::None => "none",
            PaymentStatus::Authorized => "authorized",
            PaymentStatus::Captured => "captured",
            PaymentStatus::Refunded => "refunded",
        };
        f.write_str(s)
    }
}

// =============================================================================
// Booking
// =============================================================================

/// A reservation of a car for a date range by a renter.
///
/// The total price is computed once at creation (`days × price_per_day`)
/// and frozen: later price changes on the car never touch existing
/// bookings. Bookings are never deleted; cancellation is a terminal status.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Booking {
    pub id: String,
    pub car_id: String,
    pub renter_id: String,
    /// Pickup day.
    pub start_date: NaiveDate,
    /// Return day (inclusive occupancy, exclusive pricing).
    pub end_date: NaiveDate,
    /// Total price in cents, frozen at creation.
    pub total_price_cents: i64,
    pub status: BookingStatus,
    /// External payment-intent id. Losing this makes refunds impossible,
    /// so it is written in the same insert that creates the booking.
    pub payment_ref: Option<String>,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Returns the frozen total as Money.
    #[inline]
    pub fn total_price(&self) -> Money {
        Money::from_cents(self.total_price_cents)
    }

    /// Returns the booked date range.
    #[inline]
    pub fn period(&self) -> RentalPeriod {
        RentalPeriod {
            start: self.start_date,
            end: self.end_date,
        }
    }

    /// Number of chargeable whole days.
    #[inline]
    pub fn rental_days(&self) -> i64 {
        self.period().days()
    }
}

// =============================================================================
// Reward Record
// =============================================================================

/// An immutable loyalty-ledger entry: points credited for one completed
/// booking. The UNIQUE booking_id column is the idempotency guard: a
/// second award attempt finds this record and becomes a no-op.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct RewardRecord {
    pub id: String,
    pub user_id: String,
    pub booking_id: String,
    pub points_earned: i64,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Notification
// =============================================================================

/// Category tag for notifications, used by the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum NotificationCategory {
    /// Loyalty points credited.
    Reward,
    /// Booking lifecycle events.
    Booking,
}

/// A message for a user, produced by the engine and rendered elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub message: String,
    pub category: NotificationCategory,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
