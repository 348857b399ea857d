//! Stripe webhook verification
//!
//! The `Stripe-Signature` header carries `t=<unix seconds>` and one or more
//! `v1=<hex hmac>` entries. The signed payload is `"{t}.{body}"`.

use hmac::{Hmac, Mac};
use jiff::Timestamp;
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;

use super::gateway::PaymentIntent;

type HmacSha256 = Hmac<Sha256>;

/// Default allowed clock skew between Stripe and us, in seconds.
pub const DEFAULT_TOLERANCE_SECONDS: i64 = 300;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WebhookError {
    #[error("webhook secret is not configured")]
    MissingSecret,

    #[error("signature header is malformed")]
    MalformedHeader,

    #[error("signature timestamp is outside the tolerance window")]
    TimestampOutOfTolerance,

    #[error("no signature matched the payload")]
    SignatureMismatch,

    #[error("event payload is malformed: {0}")]
    MalformedPayload(String),
}

/// Stripe event envelope, restricted to the parts we act on.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub id: String,

    #[serde(rename = "type")]
    pub kind: String,

    pub data: WebhookEventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEventData {
    pub object: serde_json::Value,
}

impl WebhookEvent {
    /// The payment intent carried by `payment_intent.*` events.
    #[must_use]
    pub fn payment_intent(&self) -> Option<PaymentIntent> {
        if !self.kind.starts_with("payment_intent.") {
            return None;
        }

        serde_json::from_value(self.data.object.clone()).ok()
    }
}

/// Verify `payload` against the `Stripe-Signature` header and decode it.
///
/// # Errors
///
/// Returns a [`WebhookError`] describing why the payload was rejected.
pub fn verify_event(
    payload: &[u8],
    signature_header: &str,
    secret: &str,
    tolerance_seconds: i64,
    now: Timestamp,
) -> Result<WebhookEvent, WebhookError> {
    verify_signature(payload, signature_header, secret, tolerance_seconds, now)?;

    serde_json::from_slice(payload)
        .map_err(|source| WebhookError::MalformedPayload(source.to_string()))
}

fn verify_signature(
    payload: &[u8],
    signature_header: &str,
    secret: &str,
    tolerance_seconds: i64,
    now: Timestamp,
) -> Result<(), WebhookError> {
    if secret.is_empty() {
        return Err(WebhookError::MissingSecret);
    }

    let mut timestamp: Option<i64> = None;
    let mut signatures = Vec::new();

    for part in signature_header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse().ok(),
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(WebhookError::MalformedHeader)?;

    if signatures.is_empty() {
        return Err(WebhookError::MalformedHeader);
    }

    if now.as_second().abs_diff(timestamp) > tolerance_seconds.unsigned_abs() {
        return Err(WebhookError::TimestampOutOfTolerance);
    }

    let matched = signatures.iter().any(|signature| {
        let Ok(expected) = hex::decode(signature) else {
            return false;
        };

        let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
            return false;
        };

        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);

        mac.verify_slice(&expected).is_ok()
    });

    if matched {
        Ok(())
    } else {
        Err(WebhookError::SignatureMismatch)
    }
}

/// Produce a `Stripe-Signature` header value for `payload`.
///
/// # Errors
///
/// Returns [`WebhookError::MissingSecret`] for an empty secret.
pub fn sign_payload(payload: &[u8], secret: &str, timestamp: i64) -> Result<String, WebhookError> {
    if secret.is_empty() {
        return Err(WebhookError::MissingSecret);
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_invalid_length| WebhookError::MissingSecret)?;

    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);

    Ok(format!(
        "t={timestamp},v1={}",
        hex::encode(mac.finalize().into_bytes())
    ))
}
