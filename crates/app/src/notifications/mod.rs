//! Notifications
//!
//! Outbound email is fire-and-forget: a notifier reports whether the message
//! was accepted and never fails the operation that triggered it.

use async_trait::async_trait;
use mockall::automock;
use serde::Serialize;

mod http;
mod log;
pub mod templates;

pub use http::{EMAIL_API_URL, HttpNotifier, HttpNotifierConfig};
pub use log::LogNotifier;

/// An email ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub to: Vec<String>,

    /// Sender address; the notifier's default when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,

    pub subject: String,
    pub text: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

#[automock]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `message`, returning whether the provider accepted it.
    async fn send(&self, message: EmailMessage) -> bool;
}
