//! Transactional email over HTTP

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{error, info, instrument};

use super::{EmailMessage, Notifier};

/// Default transactional email endpoint.
pub const EMAIL_API_URL: &str = "https://api.resend.com/emails";

#[derive(Clone)]
pub struct HttpNotifierConfig {
    pub api_url: String,
    pub api_key: String,

    /// Used when a message carries no sender.
    pub default_sender: String,

    pub timeout: Duration,
}

impl std::fmt::Debug for HttpNotifierConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpNotifierConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"**redacted**")
            .field("default_sender", &self.default_sender)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct OutboundEmail<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    text: &'a str,

    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<&'a str>,
}

impl<'a> OutboundEmail<'a> {
    fn new(message: &'a EmailMessage, default_sender: &'a str) -> Self {
        Self {
            from: message.from.as_deref().unwrap_or(default_sender),
            to: &message.to,
            subject: &message.subject,
            text: &message.text,
            html: message.html.as_deref(),
        }
    }
}

/// Posts messages as JSON to an email API with bearer auth.
#[derive(Debug, Clone)]
pub struct HttpNotifier {
    client: Client,
    config: HttpNotifierConfig,
}

impl HttpNotifier {
    /// Build a notifier with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: HttpNotifierConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    #[instrument(skip_all, fields(subject = %message.subject, recipients = message.to.len()))]
    async fn send(&self, message: EmailMessage) -> bool {
        if message.to.is_empty() {
            info!("email has no recipients; skipped");

            return false;
        }

        let body = OutboundEmail::new(&message, &self.config.default_sender);

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => {
                info!("email accepted");

                true
            }
            Ok(response) => {
                let status = response.status();
                let detail = response.text().await.unwrap_or_default();

                error!(%status, %detail, "email provider rejected message");

                false
            }
            Err(source) => {
                error!(error = %source, "email provider unreachable");

                false
            }
        }
    }
}
