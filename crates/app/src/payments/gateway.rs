//! Payment gateway contract

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A failed gateway call. `message` is the provider's text, unmodified.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
pub struct GatewayError {
    /// Provider error code, e.g. `card_declined`.
    pub code: String,

    /// Provider message.
    pub message: String,
}

impl GatewayError {
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Payment intent as reported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,

    /// `requires_capture`, `succeeded`, `canceled`, ...
    pub status: String,

    pub amount: u64,

    #[serde(default)]
    pub amount_capturable: u64,

    #[serde(default)]
    pub amount_received: u64,

    #[serde(default)]
    pub customer: Option<String>,

    #[serde(default)]
    pub payment_method: Option<String>,
}

impl PaymentIntent {
    #[must_use]
    pub fn is_succeeded(&self) -> bool {
        self.status == "succeeded"
    }

    #[must_use]
    pub fn is_authorized(&self) -> bool {
        self.status == "requires_capture"
    }
}

/// Refund as reported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refund {
    pub id: String,
    pub status: String,
    pub amount: u64,
    pub payment_intent: Option<String>,
}

/// A charge or authorization against a customer's saved card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerCharge {
    /// Gateway customer id.
    pub customer: String,

    /// Saved payment method; the customer's first card when absent.
    pub payment_method: Option<String>,

    /// Amount in minor units.
    pub amount: u64,

    pub description: String,

    /// Booking the charge belongs to, recorded as metadata.
    pub booking_id: String,

    pub idempotency_key: Option<String>,
}

#[automock]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a manual-capture intent that holds the deposit.
    async fn create_payment_intent(
        &self,
        charge: CustomerCharge,
    ) -> Result<PaymentIntent, GatewayError>;

    /// Fetch the current state of an intent.
    async fn retrieve_payment_intent(&self, intent_id: &str)
    -> Result<PaymentIntent, GatewayError>;

    /// Capture an authorized intent, optionally for less than authorized.
    async fn capture(
        &self,
        intent_id: &str,
        amount: Option<u64>,
    ) -> Result<PaymentIntent, GatewayError>;

    /// Refund part or all of a captured intent.
    async fn refund(&self, intent_id: &str, amount: u64) -> Result<Refund, GatewayError>;

    /// Charge a saved card immediately without the customer present.
    async fn charge_off_session(
        &self,
        charge: CustomerCharge,
    ) -> Result<PaymentIntent, GatewayError>;

    /// Place a fresh manual-capture hold on a saved card without the customer
    /// present.
    async fn reauthorize(&self, charge: CustomerCharge) -> Result<PaymentIntent, GatewayError>;
}
