use std::sync::Arc;

use clap::{Args, Subcommand};
use prestige_app::{database, domain::invoices::KvInvoicesService, store::PgKvStore};

mod overdue;

#[derive(Debug, Args)]
pub(crate) struct InvoicesCommand {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: InvoicesSubcommand,
}

#[derive(Debug, Subcommand)]
enum InvoicesSubcommand {
    /// Persist the overdue status on sent invoices past their due date
    MarkOverdue(overdue::MarkOverdueArgs),
}

pub(crate) async fn run(command: InvoicesCommand) -> Result<(), String> {
    let Some(database_url) = command.database_url else {
        return Err("--database-url or DATABASE_URL is required".to_string());
    };

    let pool = database::connect(&database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let service = KvInvoicesService::new(Arc::new(PgKvStore::new(pool)));

    match command.command {
        InvoicesSubcommand::MarkOverdue(args) => overdue::run(&service, args).await,
    }
}
