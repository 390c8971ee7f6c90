//! Voice transcript to expense pipeline
//!
//! prompt -> completion -> JSON reply -> candidate transaction -> validation.
//! Nothing here touches the database; callers decide whether to store.

use chrono::{Duration, NaiveDate};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::ai::parsing::parse_expense_reply;
use crate::ai::ExpenseBackend;
use crate::dates::resolve_date;
use crate::error::{Error, Result};
use crate::models::{NewTransaction, PaymentMethod, TransactionSource};
use crate::prompts::build_extraction_prompt;

/// Turn a decoded model reply into a candidate transaction
///
/// Missing fields take defaults (empty description/category, amount 0,
/// payment method `Other`, date today, no split). The result is not
/// validated; see [`NewTransaction::validate`].
pub fn assemble_expense(fields: &Map<String, Value>, today: NaiveDate) -> NewTransaction {
    let description = string_field(fields, "description")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let amount = fields.get("amount").and_then(number_value).unwrap_or(0.0);

    let category = string_field(fields, "category")
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    // Older prompts asked for "mode"
    let mode = PaymentMethod::normalize(
        string_field(fields, "payment_method").or_else(|| string_field(fields, "mode")),
    );

    let date = resolve_date(string_field(fields, "date"), today);

    let split_with = match fields.get("split_with") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };

    NewTransaction {
        amount,
        category,
        mode,
        date,
        split_with,
        description,
        source: TransactionSource::Manual,
        transcript: None,
    }
}

/// Extract a validated expense from a spoken transcript
///
/// Makes exactly one completion call. Empty or whitespace-only transcripts
/// are rejected with [`Error::InvalidData`] before the backend is touched.
/// The returned transaction is marked as a voice entry and carries the
/// transcript.
pub async fn extract_expense<B>(
    backend: &B,
    transcript: &str,
    today: NaiveDate,
) -> Result<NewTransaction>
where
    B: ExpenseBackend + ?Sized,
{
    let transcript = transcript.trim();
    if transcript.is_empty() {
        return Err(Error::InvalidData("transcript must not be empty".into()));
    }

    let prompt = build_extraction_prompt(transcript, today, today - Duration::days(1));
    debug!(model = backend.model(), "Requesting expense extraction");

    let reply = backend.complete(&prompt).await?;
    let fields = parse_expense_reply(&reply)?;

    let mut tx = assemble_expense(&fields, today);
    tx.validate().map_err(|e| match e {
        Error::InvalidTransaction(reason) => Error::InvalidExtraction { reason, raw: reply },
        other => other,
    })?;
    tx.source = TransactionSource::Voice;
    tx.transcript = Some(transcript.to_string());

    info!(
        amount = tx.amount,
        category = %tx.category,
        mode = %tx.mode,
        date = %tx.date,
        "Extracted expense from transcript"
    );

    Ok(tx)
}

fn string_field<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    fields.get(key).and_then(Value::as_str)
}

/// Numbers, or strings holding a number ("900", "₹900", "1,200.50")
fn number_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s
                .trim()
                .trim_start_matches('₹')
                .trim_start_matches("Rs.")
                .trim_start_matches("Rs")
                .chars()
                .filter(|c| *c != ',')
                .collect();
            cleaned.trim().parse().ok()
        }
        _ => None,
    }
}
