use std::sync::Arc;

use clap::{Args, Subcommand};
use prestige_app::{auth::KvAuthService, database, store::PgKvStore};

mod create;
mod list;
mod revoke;

#[derive(Debug, Args)]
pub(crate) struct TokenCommand {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: TokenSubcommand,
}

#[derive(Debug, Subcommand)]
enum TokenSubcommand {
    Create(create::CreateTokenArgs),
    List,
    Revoke(revoke::RevokeTokenArgs),
}

pub(crate) async fn run(command: TokenCommand) -> Result<(), String> {
    let Some(database_url) = command.database_url else {
        return Err("--database-url or DATABASE_URL is required".to_string());
    };

    let pool = database::connect(&database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let service = KvAuthService::new(Arc::new(PgKvStore::new(pool)));

    match command.command {
        TokenSubcommand::Create(args) => create::run(&service, args).await,
        TokenSubcommand::List => list::run(&service).await,
        TokenSubcommand::Revoke(args) => revoke::run(&service, args).await,
    }
}
