//! CSV export of stored expenses

use serde::Serialize;

use crate::db::Database;
use crate::dates::DATE_FORMAT;
use crate::error::{Error, Result};
use crate::models::Transaction;

/// Suggested file name for downloads
pub const EXPORT_FILENAME: &str = "expenses.csv";

/// One CSV row; field order is the column order
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    date: String,
    description: &'a str,
    amount: String,
    category: &'a str,
    mode: &'static str,
    split_with: String,
}

impl<'a> From<&'a Transaction> for ExportRow<'a> {
    fn from(tx: &'a Transaction) -> Self {
        Self {
            date: tx.date.format(DATE_FORMAT).to_string(),
            description: tx.description.as_deref().unwrap_or(""),
            amount: format!("{:.2}", tx.amount),
            category: &tx.category,
            mode: tx.mode.as_str(),
            split_with: tx.split_with.join("; "),
        }
    }
}

impl Database {
    /// Export all transactions as CSV, oldest first
    ///
    /// Columns: `date,description,amount,category,mode,split_with`, with split
    /// names joined by `"; "`. An empty store yields the header row only.
    pub fn export_transactions_csv(&self) -> Result<String> {
        let transactions = self.list_transactions()?;
        transactions_to_csv(&transactions)
    }
}

/// Render transactions as CSV (header always present)
pub fn transactions_to_csv(transactions: &[Transaction]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(["date", "description", "amount", "category", "mode", "split_with"])?;
    for tx in transactions {
        writer.serialize(ExportRow::from(tx))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| Error::InvalidData(format!("CSV is not UTF-8: {}", e)))
}
