//! # atlas-engine: Booking Lifecycle & Reconciliation Engine
//!
//! The correctness-critical core of Atlas Rent: concurrent writers on the
//! booking table, partial-failure windows between the local database and
//! the payment processor, and exactly-once loyalty crediting.
//!
//! ## Components
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          atlas-engine                                   │
//! │                                                                         │
//! │   ┌────────────────────────────────────────────────────────────────┐   │
//! │   │                      BookingService                            │   │
//! │   │   create · confirm · capture · complete · cancel · get · list  │   │
//! │   │   The only code that mutates booking status.                   │   │
//! │   └────────┬──────────────────┬──────────────────┬────────────────┘   │
//! │            │                  │                  │                     │
//! │            ▼                  ▼                  ▼                     │
//! │   ┌────────────────┐  ┌──────────────────┐  ┌──────────────┐          │
//! │   │   CarLocks     │  │    Payment       │  │   Rewards    │          │
//! │   │  per-car       │  │  Reconciliation  │  │   Ledger     │          │
//! │   │  check-and-    │  │  timeouts, loud  │  │  exactly-    │          │
//! │   │  insert        │  │  failures        │  │  once credit │          │
//! │   └────────────────┘  └────────┬─────────┘  └──────────────┘          │
//! │                                │                                       │
//! │                                ▼                                       │
//! │                     dyn PaymentGateway                                 │
//! │                 (StripeGateway / MockGateway)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Guarantees
//!
//! - No two non-cancelled bookings for the same car overlap, even under
//!   concurrent creation.
//! - Booking status and payment status never diverge from the processor:
//!   captured money is refunded before a cancellation commits, and a
//!   failed external call fails the whole operation.
//! - A completed booking is credited exactly once; completion and
//!   crediting commit in one transaction.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod booking;
pub mod config;
pub mod error;
pub mod gateway;
pub mod locks;
pub mod reconciliation;
pub mod rewards;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use booking::{BookingService, CreatedBooking};
pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use gateway::{PaymentAuthorization, PaymentError, PaymentGateway, RefundReceipt, StripeGateway};
pub use reconciliation::PaymentReconciliation;
pub use rewards::RewardsLedger;
