//! Email Config

use std::time::Duration;

use clap::Args;
use prestige_app::notifications::{EMAIL_API_URL, HttpNotifierConfig};

/// Transactional email settings.
#[derive(Debug, Args)]
pub struct EmailConfig {
    /// Email API endpoint
    #[arg(long, env = "EMAIL_API_URL", default_value = EMAIL_API_URL)]
    pub email_api_url: String,

    /// Email API key. Messages are only logged when unset.
    #[arg(long, env = "EMAIL_API_KEY", hide_env_values = true)]
    pub email_api_key: Option<String>,

    /// Sender used when notification settings carry none
    #[arg(
        long,
        env = "EMAIL_DEFAULT_SENDER",
        default_value = "Prestige Rentals <bookings@prestige.example>"
    )]
    pub email_default_sender: String,

    /// Per-request timeout for the email API, in seconds
    #[arg(long, env = "EMAIL_TIMEOUT_SECONDS", default_value_t = 10_u64)]
    pub email_timeout_seconds: u64,
}

impl EmailConfig {
    /// HTTP notifier settings, if an API key is configured.
    #[must_use]
    pub fn http_notifier(&self) -> Option<HttpNotifierConfig> {
        let api_key = self.email_api_key.as_ref()?;

        Some(HttpNotifierConfig {
            api_url: self.email_api_url.clone(),
            api_key: api_key.clone(),
            default_sender: self.email_default_sender.clone(),
            timeout: Duration::from_secs(self.email_timeout_seconds),
        })
    }
}
