//! Server Config

use std::time::Duration;

use clap::Args;

/// HTTP listener and lifecycle settings.
#[derive(Debug, Args)]
pub struct ServerRuntimeConfig {
    /// Address to bind
    #[arg(short = 'H', long, env = "PRESTIGE_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind
    #[arg(short, long, env = "PRESTIGE_PORT", default_value_t = 8080_u16)]
    pub port: u16,

    /// Serve Swagger UI at `/docs` and the OpenAPI document at `/api-doc/openapi.json`
    #[arg(long, env = "PRESTIGE_API_DOCS", default_value_t = true, action = clap::ArgAction::Set)]
    pub api_docs: bool,

    /// Seconds in-flight requests get to finish after a shutdown signal
    #[arg(long, env = "PRESTIGE_SHUTDOWN_GRACE_SECONDS", default_value_t = 30_u64)]
    pub shutdown_grace_seconds: u64,
}

impl ServerRuntimeConfig {
    #[must_use]
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    #[must_use]
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_seconds)
    }
}
