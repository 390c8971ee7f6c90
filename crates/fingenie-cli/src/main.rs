//! FinGenie CLI - Voice-driven expense tracker
//!
//! Usage:
//!   fingenie init                          Initialize database
//!   fingenie serve --port 8000             Start web server
//!   fingenie parse "paid 300 for lunch"    Extract an expense with the LLM
//!   fingenie export --output out.csv       Export expenses to CSV

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db),
        Commands::Serve {
            port,
            host,
            static_dir,
            allowed_origins,
        } => {
            commands::cmd_serve(
                &cli.db,
                &host,
                port,
                static_dir.as_deref(),
                allowed_origins,
            )
            .await
        }
        Commands::Transactions { action } => {
            let db = commands::open_db(&cli.db)?;
            match action {
                None => commands::cmd_transactions_list(&db, 20),
                Some(TransactionsAction::List { limit }) => {
                    commands::cmd_transactions_list(&db, limit)
                }
            }
        }
        Commands::Add {
            amount,
            category,
            mode,
            date,
            split_with,
            description,
        } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_add(
                &db,
                amount,
                &category,
                mode.as_deref(),
                date.as_deref(),
                split_with,
                description,
            )
            .map(|_| ())
        }
        Commands::Parse { transcript, save } => {
            let db = commands::open_db(&cli.db)?;
            let ai = fingenie_core::AIClient::from_env();
            commands::cmd_parse(&db, &ai, &transcript, save)
                .await
                .map(|_| ())
        }
        Commands::Export { output } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_export(&db, output)
        }
    }
}
