//! # Engine Configuration
//!
//! Tunable policy for the booking engine. Everything here has a sensible
//! default; deployments override through the builder methods.

use std::time::Duration;

use atlas_core::validation::validate_currency;
use atlas_core::{RewardRate, TurnoverPolicy, ValidationError, DEFAULT_CURRENCY};

/// Engine configuration.
///
/// ## Example
/// ```rust
/// use atlas_engine::config::EngineConfig;
/// use atlas_core::TurnoverPolicy;
/// use std::time::Duration;
///
/// let config = EngineConfig::default()
///     .turnover_policy(TurnoverPolicy::SameDayAllowed)
///     .gateway_timeout(Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Currency charged for bookings, lowercase ISO 4217.
    /// Default: "usd"
    pub currency: String,

    /// Loyalty crediting rate.
    /// Default: 10%
    pub reward_rate: RewardRate,

    /// Back-to-back rental policy for the shared handover day.
    /// Default: blocked (whole-day exclusive occupancy)
    pub turnover_policy: TurnoverPolicy,

    /// Upper bound on any single call to the payment processor.
    /// After this the operation fails with a retryable payment error.
    /// Default: 10 seconds
    pub gateway_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            currency: DEFAULT_CURRENCY.to_string(),
            reward_rate: RewardRate::default(),
            turnover_policy: TurnoverPolicy::default(),
            gateway_timeout: Duration::from_secs(10),
        }
    }
}

impl EngineConfig {
    /// Sets the booking currency.
    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Sets the loyalty crediting rate.
    pub fn reward_rate(mut self, rate: RewardRate) -> Self {
        self.reward_rate = rate;
        self
    }

    /// Sets the back-to-back rental policy.
    pub fn turnover_policy(mut self, policy: TurnoverPolicy) -> Self {
        self.turnover_policy = policy;
        self
    }

    /// Sets the payment processor call timeout.
    pub fn gateway_timeout(mut self, timeout: Duration) -> Self {
        self.gateway_timeout = timeout;
        self
    }

    /// Validates the configuration. Called once at service construction.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_currency(&self.currency)?;

        if self.gateway_timeout.is_zero() {
            return Err(ValidationError::MustBePositive {
                field: "gateway_timeout".to_string(),
            });
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
