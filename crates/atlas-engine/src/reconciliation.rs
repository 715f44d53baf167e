//! # Payment Reconciliation
//!
//! Wraps the payment gateway with the engine's operational rules:
//!
//! - every call is bounded by the configured timeout; an operation is
//!   failed, never left pending;
//! - failures are logged with the payment reference before propagating,
//!   because a silently lost authorization id makes later refunds
//!   impossible;
//! - no automatic retries; errors are classified retryable and the
//!   caller decides.
//!
//! This layer never mutates booking state. The caller updates payment
//! status only after a call here returns success.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, error};

use crate::gateway::{PaymentAuthorization, PaymentError, PaymentGateway, RefundReceipt};
use atlas_core::Money;

/// Gateway wrapper applying timeouts and failure logging.
#[derive(Clone)]
pub struct PaymentReconciliation {
    gateway: Arc<dyn PaymentGateway>,
    deadline: Duration,
}

impl PaymentReconciliation {
    /// Creates a reconciliation layer over a gateway.
    pub fn new(gateway: Arc<dyn PaymentGateway>, deadline: Duration) -> Self {
        PaymentReconciliation { gateway, deadline }
    }

    /// Requests an authorization for `amount`.
    ///
    /// Returns the processor reference to store on the booking. Does not
    /// itself mutate booking state.
    pub async fn authorize(
        &self,
        amount: Money,
        currency: &str,
        metadata: &HashMap<String, String>,
    ) -> Result<PaymentAuthorization, PaymentError> {
        debug!(amount = %amount, currency, "Requesting payment authorization");

        match timeout(
            self.deadline,
            self.gateway.authorize(amount.cents(), currency, metadata),
        )
        .await
        {
            Ok(Ok(auth)) => {
                debug!(payment_ref = %auth.id, "Authorization created");
                Ok(auth)
            }
            Ok(Err(err)) => {
                error!(amount = %amount, %err, "Payment authorization failed");
                Err(err)
            }
            Err(_) => {
                let err = PaymentError::Timeout {
                    seconds: self.deadline.as_secs(),
                };
                error!(amount = %amount, %err, "Payment authorization timed out");
                Err(err)
            }
        }
    }

    /// Refunds the full charge behind `payment_ref`.
    ///
    /// The caller updates payment status to Refunded only after this
    /// returns success.
    pub async fn refund(&self, payment_ref: &str) -> Result<RefundReceipt, PaymentError> {
        debug!(payment_ref, "Requesting refund");

        match timeout(self.deadline, self.gateway.refund(payment_ref)).await {
            Ok(Ok(receipt)) => {
                debug!(payment_ref, refund_id = %receipt.id, "Refund issued");
                Ok(receipt)
            }
            Ok(Err(err)) => {
                error!(payment_ref, %err, "Refund failed");
                Err(err)
            }
            Err(_) => {
                let err = PaymentError::Timeout {
                    seconds: self.deadline.as_secs(),
                };
                error!(payment_ref, %err, "Refund timed out");
                Err(err)
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
