//! Store Config

use clap::Args;

/// Key-value store settings.
#[derive(Debug, Args)]
pub struct StoreConfig {
    /// `PostgreSQL` connection string. An in-memory store is used when unset.
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,
}
