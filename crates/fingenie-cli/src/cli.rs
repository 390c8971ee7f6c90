//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// FinGenie - Track expenses by talking about them
#[derive(Parser)]
#[command(name = "fingenie")]
#[command(about = "Voice-driven expense tracker backed by an LLM", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "fingenie.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory containing static files to serve (e.g., client/dist)
        #[arg(long)]
        static_dir: Option<PathBuf>,

        /// Allowed CORS origin (repeatable; `*` allows any)
        ///
        /// Defaults to the Vite dev server, http://localhost:5173
        #[arg(long = "allowed-origin")]
        allowed_origins: Vec<String>,
    },

    /// List or manage stored expenses
    Transactions {
        #[command(subcommand)]
        action: Option<TransactionsAction>,
    },

    /// Add an expense directly
    Add {
        /// Amount spent (must be greater than 0)
        amount: f64,

        /// Category label (e.g., food, rent, travel)
        category: String,

        /// Payment method: Cash, UPI, GPay, PhonePe, Card, NetBanking, Wallet
        #[arg(short, long)]
        mode: Option<String>,

        /// Date as YYYY-MM-DD or a phrase like "yesterday" (default: today)
        #[arg(short, long)]
        date: Option<String>,

        /// People sharing the expense (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        split_with: Vec<String>,

        /// Short description
        #[arg(long)]
        description: Option<String>,
    },

    /// Extract an expense from a spoken-style sentence using the LLM
    Parse {
        /// Transcript text, e.g. "Paid 300 for lunch via UPI"
        transcript: String,

        /// Store the extracted expense
        #[arg(long)]
        save: bool,
    },

    /// Export all expenses to CSV
    Export {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum TransactionsAction {
    /// List recent expenses
    List {
        /// Number of expenses to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}
