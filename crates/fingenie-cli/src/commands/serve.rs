//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};
use fingenie_core::{AIClient, ExpenseBackend};

use super::open_db;

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    static_dir: Option<&Path>,
    allowed_origins: Vec<String>,
) -> Result<()> {
    let ai = AIClient::from_env();

    let mut config = fingenie_server::ServerConfig::default();
    if !allowed_origins.is_empty() {
        config.allowed_origins = allowed_origins;
    }

    println!("🚀 Starting FinGenie web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);
    println!("   LLM: {} ({})", ai.model(), ai.host());
    println!("   CORS origins: {}", config.allowed_origins.join(", "));
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path)?;

    let static_dir_str = static_dir
        .map(|p| p.to_str().context("static_dir path must be valid UTF-8"))
        .transpose()?;
    fingenie_server::serve_with_config(db, ai, host, port, static_dir_str, config).await?;

    Ok(())
}
