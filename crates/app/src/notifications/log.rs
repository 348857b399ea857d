//! Logging notifier, used when no email provider is configured.

use async_trait::async_trait;
use tracing::info;

use super::{EmailMessage, Notifier};

#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, message: EmailMessage) -> bool {
        info!(
            to = ?message.to,
            from = message.from.as_deref().unwrap_or("<default>"),
            subject = %message.subject,
            "email delivery disabled; message logged only"
        );

        true
    }
}
