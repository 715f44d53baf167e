//! # Error Types
//!
//! Domain-specific error types for atlas-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  atlas-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule violations, terminal             │
//! │  └── ValidationError  - Input validation failures, terminal            │
//! │                                                                         │
//! │  atlas-db errors (separate crate)                                      │
//! │  └── DbError          - Persistence failures, retryable                │
//! │                                                                         │
//! │  atlas-engine errors (separate crate)                                  │
//! │  ├── PaymentError     - Gateway failures/timeouts, retryable           │
//! │  └── EngineError      - Unifies all of the above for callers           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (booking id, dates, etc.)
//! 3. Errors are enum variants, never String
//! 4. Terminal errors (validation, authorization) are never retried

use chrono::NaiveDate;
use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations. They are terminal:
/// retrying the same request yields the same error.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Car or booking cannot be found (or a car is not offered for booking).
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// An overlapping, non-cancelled booking already holds the car.
    #[error("car {car_id} is already booked between {start} and {end}")]
    Conflict {
        car_id: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    /// The actor may not perform this operation on this booking.
    #[error("actor {actor_id} is not allowed to {action}")]
    Unauthorized { actor_id: String, action: String },

    /// The state machine forbids this move.
    ///
    /// ## When This Occurs
    /// - Confirming a booking that is not Pending
    /// - Completing a booking that is not Confirmed
    /// - Cancelling a Completed or already-Cancelled booking
    /// - Recording a capture for a payment that is not Authorized
    #[error("booking {booking_id} is {from}, cannot move to {to}")]
    InvalidTransition {
        booking_id: String,
        from: String,
        to: String,
    },

    /// Validation error (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and id.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates an Unauthorized error.
    pub fn unauthorized(actor_id: impl Into<String>, action: impl Into<String>) -> Self {
        CoreError::Unauthorized {
            actor_id: actor_id.into(),
            action: action.into(),
        }
    }

    /// Creates an InvalidTransition error.
    pub fn invalid_transition(
        booking_id: impl Into<String>,
        from: impl ToString,
        to: impl ToString,
    ) -> Self {
        CoreError::InvalidTransition {
            booking_id: booking_id.into(),
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when a request doesn't meet requirements, before any
/// business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// The rental period is empty or inverted.
    #[error("start date {start} must be before end date {end}")]
    StartNotBeforeEnd { start: NaiveDate, end: NaiveDate },

    /// A rental may not begin in the past.
    #[error("{field} {date} is in the past")]
    DateInPast { field: String, date: NaiveDate },

    /// The rental exceeds the maximum bookable length.
    #[error("rental of {days} days exceeds the maximum of {max}")]
    RentalTooLong { days: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., malformed currency code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::Conflict {
            car_id: "car-1".to_string(),
            start: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2026, 6, 4).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "car car-1 is already booked between 2026-06-01 and 2026-06-04"
        );

        let err = CoreError::invalid_transition("b-1", "completed", "cancelled");
        assert_eq!(err.to_string(), "booking b-1 is completed, cannot move to cancelled");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::DateInPast {
            field: "start_date".to_string(),
            date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        };
        assert_eq!(err.to_string(), "start_date 2020-01-01 is in the past");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "car_id".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
