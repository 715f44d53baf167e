//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely, plus the
//! `RewardRate` used for loyalty crediting.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  In a rental system:                                                    │
//! │    3 days × $49.99 must equal exactly $149.97, every time,             │
//! │    and the payment processor is charged exactly 14997 cents.           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    All prices, totals, and gateway amounts are i64 cents.              │
//! │    Only display layers ever see dollars.                               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use atlas_core::money::{Money, RewardRate};
//!
//! // Create from cents (preferred)
//! let per_day = Money::from_cents(5000); // $50.00
//!
//! // Whole-day pricing: 3 days at $50.00
//! let total = per_day.multiply_days(3);  // $150.00
//!
//! // Loyalty points: 10% of the total, floored to whole points
//! assert_eq!(total.reward_points(RewardRate::from_bps(1000)), 15);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents for USD).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for refunds and adjustments
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// Every monetary value in the system flows through this type: the per-day
/// price on a car, the frozen booking total, the amount authorized with the
/// payment processor, and the base for reward crediting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use atlas_core::money::Money;
    ///
    /// let price = Money::from_cents(5000); // Represents $50.00
    /// assert_eq!(price.cents(), 5000);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units (dollars and cents).
    ///
    /// ## Note
    /// For negative amounts, only the major unit should be negative.
    /// `from_major_minor(-5, 50)` = -$5.50, not -$4.50
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        // Handle sign: if major is negative, minor should subtract
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies a per-day price by a rental length in days.
    ///
    /// ## Example
    /// ```rust
    /// use atlas_core::money::Money;
    ///
    /// let per_day = Money::from_cents(5000); // $50.00/day
    /// let total = per_day.multiply_days(3);
    /// assert_eq!(total.cents(), 15000); // $150.00
    /// ```
    ///
    /// ## Booking Workflow
    /// ```text
    /// Car: $50.00/day
    /// Dates: Jun 1 → Jun 4 (3 whole days)
    ///      │
    ///      ▼
    /// multiply_days(3) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Booking total: $150.00 (frozen at creation)
    /// ```
    #[inline]
    pub const fn multiply_days(&self, days: i64) -> Self {
        Money(self.0 * days)
    }

    /// Calculates loyalty points earned on this amount.
    ///
    /// Points are whole units: the major-unit (dollar) value of the amount,
    /// multiplied by the rate, rounded DOWN. A $150.00 total at 10% earns 15
    /// points; a $10.50 total at 10% earns 1 point ($1.05 of credit, floored).
    ///
    /// ## Implementation
    /// Integer math throughout: `cents × bps / 1_000_000`, computed in i128
    /// to rule out overflow. Division truncates, which is the floor for the
    /// non-negative amounts this is called with.
    ///
    /// ## Example
    /// ```rust
    /// use atlas_core::money::{Money, RewardRate};
    ///
    /// let total = Money::from_cents(15000); // $150.00
    /// let rate = RewardRate::from_bps(1000); // 10%
    /// assert_eq!(total.reward_points(rate), 15);
    /// ```
    pub fn reward_points(&self, rate: RewardRate) -> i64 {
        // cents * bps / 10_000 = reward cents; / 100 = whole points.
        (self.0 as i128 * rate.bps() as i128 / 1_000_000) as i64
    }
}

// =============================================================================
// Reward Rate
// =============================================================================

/// Loyalty crediting rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1000 bps = 10% (the default crediting rate)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardRate(u32);

impl RewardRate {
    /// Creates a reward rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        RewardRate(bps)
    }

    /// Creates a reward rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        RewardRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero rate (crediting disabled).
    #[inline]
    pub const fn zero() -> Self {
        RewardRate(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for RewardRate {
    fn default() -> Self {
        RewardRate(crate::DEFAULT_REWARD_RATE_BPS)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for logs and debugging. Display layers format for locale.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by i64 (for day counts).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, days: i64) -> Self {
        Money(self.0 * days)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(5099);
        assert_eq!(money.cents(), 5099);
        assert_eq!(money.dollars(), 50);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_from_major_minor() {
        let money = Money::from_major_minor(50, 99);
        assert_eq!(money.cents(), 5099);

        let negative = Money::from_major_minor(-5, 50);
        assert_eq!(negative.cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(5099)), "$50.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        let result: Money = a * 3;
        assert_eq!(result.cents(), 3000);
    }

    #[test]
    fn test_multiply_days() {
        // 3 days at $50.00/day = $150.00
        let per_day = Money::from_cents(5000);
        assert_eq!(per_day.multiply_days(3).cents(), 15000);
    }

    #[test]
    fn test_reward_points_whole_dollars() {
        // $150.00 at 10% = 15 points
        let total = Money::from_cents(15000);
        assert_eq!(total.reward_points(RewardRate::from_bps(1000)), 15);
    }

    #[test]
    fn test_reward_points_floors() {
        // $10.50 at 10% = $1.05 of credit → 1 point
        let total = Money::from_cents(1050);
        assert_eq!(total.reward_points(RewardRate::from_bps(1000)), 1);

        // $9.99 at 10% = $0.999 → 0 points
        let total = Money::from_cents(999);
        assert_eq!(total.reward_points(RewardRate::from_bps(1000)), 0);
    }

    #[test]
    fn test_reward_points_zero_rate() {
        let total = Money::from_cents(15000);
        assert_eq!(total.reward_points(RewardRate::zero()), 0);
    }

    #[test]
    fn test_reward_rate_from_percentage() {
        let rate = RewardRate::from_percentage(10.0);
        assert_eq!(rate.bps(), 1000);
        assert!((rate.percentage() - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let positive = Money::from_cents(100);
        assert!(positive.is_positive());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
        assert_eq!(negative.abs().cents(), 100);
    }
}
