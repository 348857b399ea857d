use clap::{Parser, Subcommand};

mod db;
mod invoices;
mod token;

#[derive(Debug, Parser)]
#[command(name = "prestige-app", about = "Prestige back office CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Token(token::TokenCommand),
    Db(db::DbCommand),
    Invoices(invoices::InvoicesCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Token(command) => token::run(command).await,
            Commands::Db(command) => db::run(command).await,
            Commands::Invoices(command) => invoices::run(command).await,
        }
    }
}
