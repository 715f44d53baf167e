//! # atlas-core: Pure Business Logic for Atlas Rent
//!
//! This crate is the **heart** of Atlas Rent. It contains the rental
//! domain's business rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Atlas Rent Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Request Layer (out of scope)                   │   │
//! │  │        create / confirm / complete / cancel endpoints           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    atlas-engine                                 │   │
//! │  │   BookingService · PaymentReconciliation · RewardsLedger        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ atlas-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  period   │  │ validation│  │   │
//! │  │   │  Booking  │  │   Money   │  │  overlap  │  │   rules   │  │   │
//! │  │   │   Car     │  │RewardRate │  │  policy   │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    atlas-db (Database Layer)                    │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Car, Booking, RewardRecord, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`period`] - Rental date ranges and the overlap policy
//! - [`error`] - Domain error types
//! - [`validation`] - Request validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod period;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use atlas_core::Money` instead of
// `use atlas_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, RewardRate};
pub use period::{RentalPeriod, TurnoverPolicy};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Currency charged by default, in the lowercase form the payment
/// processor expects.
pub const DEFAULT_CURRENCY: &str = "usd";

/// Default loyalty crediting rate: 10% of a booking's total, in basis
/// points.
pub const DEFAULT_REWARD_RATE_BPS: u32 = 1000;

/// Maximum bookable rental length in days.
///
/// ## Business Reason
/// Longer arrangements are leases with different paperwork and pricing;
/// they are negotiated off-platform.
pub const MAX_RENTAL_DAYS: i64 = 90;
