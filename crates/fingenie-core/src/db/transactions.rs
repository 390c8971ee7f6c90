//! Transaction operations

use rusqlite::{params, OptionalExtension};

use super::{parse_datetime, Database};
use crate::dates::DATE_FORMAT;
use crate::error::Result;
use crate::models::{NewTransaction, PaymentMethod, Transaction};

const TRANSACTION_COLUMNS: &str =
    "id, amount, category, mode, date, split_with, description, source, transcript, created_at";

impl Database {
    /// Insert a transaction, returning its new ID
    ///
    /// The transaction is validated first; invalid data never reaches the table.
    pub fn insert_transaction(&self, tx: &NewTransaction) -> Result<i64> {
        tx.validate()?;
        let conn = self.conn()?;

        let split_with = serde_json::to_string(&tx.split_with)?;

        conn.execute(
            r#"
            INSERT INTO transactions (amount, category, mode, date, split_with, description, source, transcript)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                tx.amount,
                tx.category.trim(),
                tx.mode.as_str(),
                tx.date.format(DATE_FORMAT).to_string(),
                split_with,
                tx.description,
                tx.source.as_str(),
                tx.transcript,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// List all transactions, oldest first
    pub fn list_transactions(&self) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM transactions ORDER BY id",
            TRANSACTION_COLUMNS
        ))?;

        let transactions = stmt
            .query_map([], Self::row_to_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    /// Get a single transaction by ID
    pub fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        let conn = self.conn()?;
        let tx = conn
            .query_row(
                &format!("SELECT {} FROM transactions WHERE id = ?", TRANSACTION_COLUMNS),
                params![id],
                Self::row_to_transaction,
            )
            .optional()?;
        Ok(tx)
    }

    /// Count total transactions
    pub fn count_transactions(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;
        Ok(count)
    }

    fn row_to_transaction(row: &rusqlite::Row) -> rusqlite::Result<Transaction> {
        let mode_str: String = row.get(3)?;
        let date_str: String = row.get(4)?;
        let split_str: String = row.get(5)?;
        let source_str: String = row.get(7)?;
        let created_at_str: String = row.get(9)?;

        let date = chrono::NaiveDate::parse_from_str(&date_str, DATE_FORMAT).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(Transaction {
            id: row.get(0)?,
            amount: row.get(1)?,
            category: row.get(2)?,
            mode: PaymentMethod::normalize(Some(&mode_str)),
            date,
            split_with: serde_json::from_str(&split_str).unwrap_or_default(),
            description: row.get(6)?,
            source: source_str.parse().unwrap_or_default(),
            transcript: row.get(8)?,
            created_at: parse_datetime(&created_at_str),
        })
    }
}
