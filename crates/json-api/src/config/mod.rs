//! Server configuration module

use clap::Parser;

use crate::config::{
    email::EmailConfig,
    observability::{LoggingConfig, ObservabilityConfig},
    payments::PaymentsConfig,
    server::ServerRuntimeConfig,
    store::StoreConfig,
};

pub(crate) mod email;
pub(crate) mod observability;
pub(crate) mod payments;
pub(crate) mod server;
pub(crate) mod store;

/// Prestige JSON API Server configuration
#[derive(Debug, Parser)]
#[command(name = "prestige-json", about = "Prestige back office JSON API", long_about = None)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Observability (traces/metrics) settings.
    #[command(flatten)]
    pub observability: ObservabilityConfig,

    /// Key-value store settings.
    #[command(flatten)]
    pub store: StoreConfig,

    /// Stripe settings.
    #[command(flatten)]
    pub payments: PaymentsConfig,

    /// Transactional email settings.
    #[command(flatten)]
    pub email: EmailConfig,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }
}
