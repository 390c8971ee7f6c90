//! LLM extraction command

use anyhow::{Context, Result};
use chrono::Local;
use fingenie_core::db::Database;
use fingenie_core::{extract_expense, AIClient, ExpenseBackend, NewTransaction};

/// Extract an expense from `transcript`, print it, and optionally store it
///
/// Returns the extracted expense and, when saved, its new ID.
pub async fn cmd_parse(
    db: &Database,
    ai: &AIClient,
    transcript: &str,
    save: bool,
) -> Result<(NewTransaction, Option<i64>)> {
    println!("🤖 Extracting expense with {} ...", ai.model());

    let tx = extract_expense(ai, transcript, Local::now().date_naive())
        .await
        .context("Extraction failed")?;

    println!("{}", serde_json::to_string_pretty(&tx)?);

    if !save {
        println!();
        println!("   (not saved; re-run with --save to store it)");
        return Ok((tx, None));
    }

    let id = db
        .insert_transaction(&tx)
        .context("Failed to save expense")?;
    println!("✅ Saved expense #{}", id);

    Ok((tx, Some(id)))
}
