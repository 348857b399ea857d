//! Payments Config

use std::time::Duration;

use clap::Args;
use prestige_app::payments::{StripeConfig, stripe::STRIPE_API_BASE, webhook::DEFAULT_TOLERANCE_SECONDS};

/// Stripe settings.
#[derive(Debug, Args)]
pub struct PaymentsConfig {
    /// Stripe secret API key
    #[arg(long, env = "STRIPE_SECRET_KEY", hide_env_values = true)]
    pub stripe_secret_key: String,

    /// Stripe API origin
    #[arg(long, env = "STRIPE_API_BASE", default_value = STRIPE_API_BASE)]
    pub stripe_api_base: String,

    /// Per-request timeout for Stripe calls, in seconds
    #[arg(long, env = "STRIPE_TIMEOUT_SECONDS", default_value_t = 30_u64)]
    pub stripe_timeout_seconds: u64,

    /// Stripe webhook signing secret (`whsec_...`). Webhooks are rejected when unset.
    #[arg(long, env = "STRIPE_WEBHOOK_SECRET", hide_env_values = true)]
    pub stripe_webhook_secret: Option<String>,

    /// Accepted clock skew for webhook signatures, in seconds
    #[arg(long, env = "STRIPE_WEBHOOK_TOLERANCE_SECONDS", default_value_t = DEFAULT_TOLERANCE_SECONDS)]
    pub stripe_webhook_tolerance_seconds: i64,
}

impl PaymentsConfig {
    #[must_use]
    pub fn stripe(&self) -> StripeConfig {
        StripeConfig {
            secret_key: self.stripe_secret_key.clone(),
            api_base: self.stripe_api_base.clone(),
            timeout: Duration::from_secs(self.stripe_timeout_seconds),
        }
    }
}
