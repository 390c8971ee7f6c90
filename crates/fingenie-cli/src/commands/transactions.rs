//! Transaction command implementations

use anyhow::{Context, Result};
use chrono::Local;
use fingenie_core::dates::resolve_date;
use fingenie_core::db::Database;
use fingenie_core::models::{NewTransaction, PaymentMethod, TransactionSource};

use super::truncate;

/// Print the most recent `limit` expenses, newest first
pub fn cmd_transactions_list(db: &Database, limit: usize) -> Result<()> {
    let transactions = db.list_transactions()?;

    if transactions.is_empty() {
        println!("No expenses yet. Add one with:");
        println!("  fingenie add 250 food --mode UPI");
        println!("  fingenie parse \"Paid 300 for lunch via UPI\" --save");
        return Ok(());
    }

    println!();
    println!("📝 Recent Expenses ({} total)", transactions.len());
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in transactions.iter().rev().take(limit) {
        let split = if tx.split_with.is_empty() {
            String::new()
        } else {
            format!(" (split: {})", tx.split_with.join(", "))
        };
        let label = tx.description.as_deref().unwrap_or(&tx.category);

        println!(
            "   {} │ ₹{:>9.2} │ {:<10} │ {:<12} │ {}{}",
            tx.date,
            tx.amount,
            tx.mode,
            truncate(&tx.category, 12),
            truncate(label, 30),
            split
        );
    }

    Ok(())
}

/// Store an expense given on the command line, returning its ID
pub fn cmd_add(
    db: &Database,
    amount: f64,
    category: &str,
    mode: Option<&str>,
    date: Option<&str>,
    split_with: Vec<String>,
    description: Option<String>,
) -> Result<i64> {
    let tx = NewTransaction {
        amount,
        category: category.trim().to_string(),
        mode: PaymentMethod::normalize(mode),
        date: resolve_date(date, Local::now().date_naive()),
        split_with: split_with
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        description,
        source: TransactionSource::Manual,
        transcript: None,
    };

    if let Some(m) = mode {
        if tx.mode == PaymentMethod::Other && m != "Other" {
            println!("   ⚠️  Unknown payment method '{}', saving as Other", m);
        }
    }

    let id = db
        .insert_transaction(&tx)
        .context("Failed to save expense")?;

    println!(
        "✅ Saved expense #{}: ₹{:.2} {} ({}) on {}",
        id, tx.amount, tx.category, tx.mode, tx.date
    );

    Ok(id)
}
