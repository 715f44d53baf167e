//! # Rental Periods
//!
//! Date-range math for whole-day rentals: period length, past-date checks,
//! and the overlap rule that availability checks are built on.
//!
//! ## The Overlap Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Two bookings on the same car conflict when their closed date ranges   │
//! │  share at least one day:                                               │
//! │                                                                        │
//! │      existing:        Jun 3 ─────────── Jun 7                         │
//! │      candidate A: Jun 1 ──── Jun 5            → CONFLICT (Jun 3-5)     │
//! │      candidate B:                Jun 7 ── Jun 9 → depends on policy    │
//! │      candidate C:                   Jun 8 ── Jun 9 → OK                │
//! │                                                                        │
//! │  Candidate B touches the existing booking only at the handover day.    │
//! │  Whether that counts as a conflict is a business policy, not a law of  │
//! │  arithmetic, so it is a named, overridable TurnoverPolicy.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

// =============================================================================
// Turnover Policy
// =============================================================================

/// Policy for back-to-back rentals on the same car.
///
/// Controls the boundary case where one booking's end date equals another's
/// start date (the handover day).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnoverPolicy {
    /// The handover day counts as occupied by both bookings: a candidate
    /// starting on an existing booking's end date conflicts. Whole-day
    /// exclusive occupancy.
    SameDayBlocked,
    /// Same-day turnover is allowed: a rental may start the day another
    /// ends (return in the morning, pick up in the afternoon).
    SameDayAllowed,
}

impl Default for TurnoverPolicy {
    fn default() -> Self {
        TurnoverPolicy::SameDayBlocked
    }
}

// =============================================================================
// Rental Period
// =============================================================================

/// An inclusive date range for a whole-day rental.
///
/// `start` is the pickup day and `end` the return day. Pricing charges
/// `days()` whole days, the distance between the two dates, so a
/// Jun 1 → Jun 4 rental is 3 days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentalPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl RentalPeriod {
    /// Creates a period, requiring `start < end`.
    ///
    /// ## Example
    /// ```rust
    /// use atlas_core::period::RentalPeriod;
    /// use chrono::NaiveDate;
    ///
    /// let start = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
    /// let end = NaiveDate::from_ymd_opt(2026, 6, 4).unwrap();
    /// let period = RentalPeriod::new(start, end).unwrap();
    /// assert_eq!(period.days(), 3);
    /// ```
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if start >= end {
            return Err(ValidationError::StartNotBeforeEnd { start, end });
        }
        Ok(RentalPeriod { start, end })
    }

    /// Number of chargeable whole days.
    #[inline]
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Whether the period begins before `today`.
    #[inline]
    pub fn starts_before(&self, today: NaiveDate) -> bool {
        self.start < today
    }

    /// Closed-interval overlap test under the given turnover policy.
    ///
    /// Under [`TurnoverPolicy::SameDayBlocked`] two periods conflict unless
    /// one ends strictly before the other starts. Under
    /// [`TurnoverPolicy::SameDayAllowed`] the shared handover day is fine
    /// and only a strict interior overlap conflicts.
    pub fn overlaps(&self, other: &RentalPeriod, policy: TurnoverPolicy) -> bool {
        match policy {
            TurnoverPolicy::SameDayBlocked => {
                !(self.end < other.start || self.start > other.end)
            }
            TurnoverPolicy::SameDayAllowed => {
                !(self.end <= other.start || self.start >= other.end)
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn period(start: (i32, u32, u32), end: (i32, u32, u32)) -> RentalPeriod {
        RentalPeriod::new(date(start.0, start.1, start.2), date(end.0, end.1, end.2)).unwrap()
    }

    #[test]
    fn test_rejects_inverted_and_empty_ranges() {
        assert!(RentalPeriod::new(date(2026, 6, 4), date(2026, 6, 1)).is_err());
        assert!(RentalPeriod::new(date(2026, 6, 1), date(2026, 6, 1)).is_err());
    }

    #[test]
    fn test_days() {
        assert_eq!(period((2026, 6, 1), (2026, 6, 4)).days(), 3);
        assert_eq!(period((2026, 6, 1), (2026, 6, 2)).days(), 1);
        // Month boundary
        assert_eq!(period((2026, 6, 29), (2026, 7, 2)).days(), 3);
    }

    #[test]
    fn test_interior_overlap_conflicts_under_both_policies() {
        let a = period((2026, 6, 1), (2026, 6, 5));
        let b = period((2026, 6, 3), (2026, 6, 7));

        assert!(a.overlaps(&b, TurnoverPolicy::SameDayBlocked));
        assert!(a.overlaps(&b, TurnoverPolicy::SameDayAllowed));
        // Symmetric
        assert!(b.overlaps(&a, TurnoverPolicy::SameDayBlocked));
        assert!(b.overlaps(&a, TurnoverPolicy::SameDayAllowed));
    }

    #[test]
    fn test_containment_conflicts() {
        let outer = period((2026, 6, 1), (2026, 6, 10));
        let inner = period((2026, 6, 3), (2026, 6, 5));

        assert!(outer.overlaps(&inner, TurnoverPolicy::SameDayBlocked));
        assert!(inner.overlaps(&outer, TurnoverPolicy::SameDayBlocked));
    }

    #[test]
    fn test_handover_day_depends_on_policy() {
        let existing = period((2026, 6, 3), (2026, 6, 7));
        let candidate = period((2026, 6, 7), (2026, 6, 9));

        assert!(candidate.overlaps(&existing, TurnoverPolicy::SameDayBlocked));
        assert!(!candidate.overlaps(&existing, TurnoverPolicy::SameDayAllowed));
    }

    #[test]
    fn test_disjoint_periods_never_conflict() {
        let a = period((2026, 6, 1), (2026, 6, 3));
        let b = period((2026, 6, 4), (2026, 6, 6));

        assert!(!a.overlaps(&b, TurnoverPolicy::SameDayBlocked));
        assert!(!a.overlaps(&b, TurnoverPolicy::SameDayAllowed));
    }

    #[test]
    fn test_starts_before() {
        let p = period((2026, 6, 3), (2026, 6, 7));
        assert!(p.starts_before(date(2026, 6, 4)));
        assert!(!p.starts_before(date(2026, 6, 3)));
        assert!(!p.starts_before(date(2026, 6, 1)));
    }
}
