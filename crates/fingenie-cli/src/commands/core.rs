//! Core command implementations and shared utilities

use std::path::Path;

use anyhow::{Context, Result};
use fingenie_core::db::Database;

/// Open (and migrate) the database at `db_path`
pub fn open_db(db_path: &Path) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path must be valid UTF-8")?;
    Database::new(path_str).context("Failed to open database")
}

pub fn cmd_init(db_path: &Path) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path)?;
    let count = db.count_transactions()?;
    println!("   {} expense(s) stored", count);

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Set OPENROUTER_API_KEY (or AI_BACKEND=mock for offline use)");
    println!("  2. Try it: fingenie parse \"Paid 300 for lunch via UPI\"");
    println!("  3. Start the API: fingenie serve");

    Ok(())
}
