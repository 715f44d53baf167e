//! # Validation Module
//!
//! Request validation for booking operations. Runs before any business
//! logic: terminal errors here are cheap and never retried.

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::period::RentalPeriod;
use crate::MAX_RENTAL_DAYS;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a requested rental window against `today`.
///
/// ## Rules
/// - `start < end` (at least one whole day)
/// - `start` is today or later
/// - the rental is at most [`MAX_RENTAL_DAYS`] days
///
/// ## Example
/// ```rust
/// use atlas_core::validation::validate_rental_request;
/// use chrono::NaiveDate;
///
/// let today = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
/// let start = NaiveDate::from_ymd_opt(2026, 6, 2).unwrap();
/// let end = NaiveDate::from_ymd_opt(2026, 6, 5).unwrap();
///
/// let period = validate_rental_request(start, end, today).unwrap();
/// assert_eq!(period.days(), 3);
/// ```
pub fn validate_rental_request(
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
) -> ValidationResult<RentalPeriod> {
    let period = RentalPeriod::new(start, end)?;

    if period.starts_before(today) {
        return Err(ValidationError::DateInPast {
            field: "start_date".to_string(),
            date: start,
        });
    }

    if period.days() > MAX_RENTAL_DAYS {
        return Err(ValidationError::RentalTooLong {
            days: period.days(),
            max: MAX_RENTAL_DAYS,
        });
    }

    Ok(period)
}

/// Validates an ISO 4217 currency code in the lowercase form the payment
/// processor expects ("usd", "eur", ...).
pub fn validate_currency(code: &str) -> ValidationResult<()> {
    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "currency".to_string(),
        });
    }

    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_lowercase()) {
        return Err(ValidationError::InvalidFormat {
            field: "currency".to_string(),
            reason: "must be a three-letter lowercase code".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
