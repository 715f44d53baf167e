//! # Payment Gateway
//!
//! The seam to the external payment processor.
//!
//! ## Design
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Payment Gateway Seam                                 │
//! │                                                                         │
//! │  BookingService                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PaymentReconciliation (timeouts, logging)                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  dyn PaymentGateway  ◄── injected at construction                      │
//! │       │                                                                 │
//! │       ├── StripeGateway   production: HTTPS to the processor           │
//! │       └── MockGateway     tests: recorded calls, scriptable failures   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The gateway only moves money; it never touches booking state. Callers
//! store the returned authorization id on the booking and key every later
//! refund by it.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

// =============================================================================
// Payment Error
// =============================================================================

/// Failures talking to the payment processor.
///
/// All variants are retryable from the caller's perspective: the engine
/// aborts the surrounding operation and the caller decides whether to try
/// again.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// The processor rejected the request.
    #[error("gateway rejected request ({status}): {message}")]
    Gateway { status: u16, message: String },

    /// The call exceeded the configured deadline.
    #[error("gateway call timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// Network-level failure reaching the processor.
    #[error("gateway transport error: {0}")]
    Transport(String),

    /// The processor answered with something we cannot parse.
    #[error("invalid gateway response: {0}")]
    InvalidResponse(String),

    /// A refund was requested for a booking with no stored payment
    /// reference. Should be impossible for captured payments; loud
    /// because it means the authorization reference was lost.
    #[error("no payment reference stored for booking {booking_id}")]
    MissingReference { booking_id: String },
}

impl From<reqwest::Error> for PaymentError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            // The client-level timeout; the reconciliation layer's own
            // deadline reports with the configured seconds instead.
            PaymentError::Timeout { seconds: 0 }
        } else if err.is_decode() {
            PaymentError::InvalidResponse(err.to_string())
        } else {
            PaymentError::Transport(err.to_string())
        }
    }
}

// =============================================================================
// Gateway Types
// =============================================================================

/// A successful authorization: funds reserved, nothing captured yet.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentAuthorization {
    /// Processor-side id; stored on the booking and required for refunds.
    pub id: String,
    /// Handed to the paying client to finish the charge.
    pub client_secret: String,
}

/// A successful refund.
#[derive(Debug, Clone, Deserialize)]
pub struct RefundReceipt {
    /// Processor-side refund id.
    pub id: String,
    /// Processor-reported status ("succeeded", "pending", ...).
    pub status: String,
}

// =============================================================================
// Gateway Trait
// =============================================================================

/// The external payment processor, reduced to the two calls this system
/// makes. Implementations must be cheap to share (`Arc<dyn PaymentGateway>`).
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Reserves `amount_cents` of `currency` with the processor.
    ///
    /// The metadata travels to the processor verbatim; it exists so a
    /// human digging through the processor dashboard can tell which
    /// booking an intent belongs to.
    async fn authorize(
        &self,
        amount_cents: i64,
        currency: &str,
        metadata: &HashMap<String, String>,
    ) -> Result<PaymentAuthorization, PaymentError>;

    /// Refunds the full charge behind a previously returned
    /// authorization id.
    async fn refund(&self, payment_ref: &str) -> Result<RefundReceipt, PaymentError>;
}

// =============================================================================
// Stripe Gateway
// =============================================================================

/// Stripe-flavored implementation of [`PaymentGateway`].
///
/// Speaks the form-encoded REST dialect: `POST /v1/payment_intents` to
/// authorize, `POST /v1/refunds` keyed by intent id to refund.
pub struct StripeGateway {
    client: reqwest::Client,
    base_url: String,
    secret_key: String,
}

impl StripeGateway {
    /// Creates a gateway against the production endpoint.
    pub fn new(secret_key: impl Into<String>) -> Self {
        StripeGateway {
            client: reqwest::Client::new(),
            base_url: "https://api.stripe.com".to_string(),
            secret_key: secret_key.into(),
        }
    }

    /// Overrides the endpoint (stripe-mock or a local stub).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Turns a non-success response into a `PaymentError::Gateway`,
    /// extracting the processor's error message when present.
    async fn error_from_response(resp: reqwest::Response) -> PaymentError {
        let status = resp.status().as_u16();
        let message = match resp.json::<serde_json::Value>().await {
            Ok(body) => body
                .pointer("/error/message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown gateway error")
                .to_string(),
            Err(_) => "unknown gateway error".to_string(),
        };
        PaymentError::Gateway { status, message }
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn authorize(
        &self,
        amount_cents: i64,
        currency: &str,
        metadata: &HashMap<String, String>,
    ) -> Result<PaymentAuthorization, PaymentError> {
        let mut params: Vec<(String, String)> = vec![
            ("amount".to_string(), amount_cents.to_string()),
            ("currency".to_string(), currency.to_string()),
        ];
        for (key, value) in metadata {
            params.push((format!("metadata[{key}]"), value.clone()));
        }

        let resp = self
            .client
            .post(format!("{}/v1/payment_intents", self.base_url))
            .bearer_auth(&self.secret_key)
            .form(&params)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Self::error_from_response(resp).await);
        }

        Ok(resp.json::<PaymentAuthorization>().await?)
    }

    async fn refund(&self, payment_ref: &str) -> Result<RefundReceipt, PaymentError> {
        let resp = self
            .client
            .post(format!("{}/v1/refunds", self.base_url))
            .bearer_auth(&self.secret_key)
            .form(&[("payment_intent", payment_ref)])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Self::error_from_response(resp).await);
        }

        Ok(resp.json::<RefundReceipt>().await?)
    }
}

// =============================================================================
// Mock Gateway (tests)
// =============================================================================

#[cfg(test)]
pub(crate) mod mock {
    //! Recording gateway double with scriptable failures and latency.

    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use uuid::Uuid;

    #[derive(Default)]
    pub struct MockGateway {
        authorize_calls: Mutex<Vec<(i64, String)>>,
        refund_calls: Mutex<Vec<String>>,
        fail_authorize: AtomicBool,
        fail_refund: AtomicBool,
        latency: Mutex<Option<Duration>>,
    }

    impl MockGateway {
        pub fn new() -> Self {
            MockGateway::default()
        }

        pub fn fail_authorize(&self, fail: bool) {
            self.fail_authorize.store(fail, Ordering::SeqCst);
        }

        pub fn fail_refund(&self, fail: bool) {
            self.fail_refund.store(fail, Ordering::SeqCst);
        }

        /// Makes every call sleep first, for exercising timeouts.
        pub fn set_latency(&self, latency: Duration) {
            *self.latency.lock().unwrap() = Some(latency);
        }

        pub fn authorize_count(&self) -> usize {
            self.authorize_calls.lock().unwrap().len()
        }

        pub fn authorized_amounts(&self) -> Vec<i64> {
            self.authorize_calls
                .lock()
                .unwrap()
                .iter()
                .map(|(amount, _)| *amount)
                .collect()
        }

        pub fn refund_count(&self) -> usize {
            self.refund_calls.lock().unwrap().len()
        }

        pub fn refunded_refs(&self) -> Vec<String> {
            self.refund_calls.lock().unwrap().clone()
        }

        async fn apply_latency(&self) {
            let latency = *self.latency.lock().unwrap();
            if let Some(latency) = latency {
                tokio::time::sleep(latency).await;
            }
        }
    }

    #[async_trait]
    impl PaymentGateway for MockGateway {
        async fn authorize(
            &self,
            amount_cents: i64,
            currency: &str,
            _metadata: &HashMap<String, String>,
        ) -> Result<PaymentAuthorization, PaymentError> {
            self.apply_latency().await;

            if self.fail_authorize.load(Ordering::SeqCst) {
                return Err(PaymentError::Gateway {
                    status: 402,
                    message: "card declined".to_string(),
                });
            }

            self.authorize_calls
                .lock()
                .unwrap()
                .push((amount_cents, currency.to_string()));

            let id = format!("pi_{}", Uuid::new_v4().simple());
            Ok(PaymentAuthorization {
                client_secret: format!("{id}_secret"),
                id,
            })
        }

        async fn refund(&self, payment_ref: &str) -> Result<RefundReceipt, PaymentError> {
            self.apply_latency().await;

            if self.fail_refund.load(Ordering::SeqCst) {
                return Err(PaymentError::Gateway {
                    status: 500,
                    message: "refund failed".to_string(),
                });
            }

            self.refund_calls
                .lock()
                .unwrap()
                .push(payment_ref.to_string());

            Ok(RefundReceipt {
                id: format!("re_{}", Uuid::new_v4().simple()),
                status: "succeeded".to_string(),
            })
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
