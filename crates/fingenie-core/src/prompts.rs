//! Prompt builder for expense extraction
//!
//! The template lives in `prompts/extract_expense.md` and is compiled into the
//! binary. Placeholders use `{{var}}` syntax.

use chrono::NaiveDate;

use crate::dates::DATE_FORMAT;
use crate::models::PaymentMethod;

/// Embedded extraction prompt template
const EXTRACT_EXPENSE: &str = include_str!("../../../prompts/extract_expense.md");

/// Output fields the model is asked to produce
pub const OUTPUT_FIELDS: [&str; 6] = [
    "description",
    "amount",
    "category",
    "payment_method",
    "date",
    "split_with",
];

/// Build the extraction instruction for a transcript
///
/// Deterministic for a given (transcript, today, yesterday). The transcript is
/// substituted last so placeholder-looking text inside it is left alone.
pub fn build_extraction_prompt(transcript: &str, today: NaiveDate, yesterday: NaiveDate) -> String {
    let today = today.format(DATE_FORMAT).to_string();
    let yesterday = yesterday.format(DATE_FORMAT).to_string();
    let payment_methods = payment_method_list();

    render(
        EXTRACT_EXPENSE,
        &[
            ("today", today.as_str()),
            ("yesterday", yesterday.as_str()),
            ("payment_methods", payment_methods.as_str()),
            ("transcript", transcript.trim()),
        ],
    )
}

/// Known payment methods as a quoted, comma-separated list
fn payment_method_list() -> String {
    PaymentMethod::KNOWN
        .iter()
        .map(|m| format!("\"{}\"", m.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Simple mustache-style replacement, applied in order
fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        let pattern = format!("{{{{{}}}}}", key);
        result = result.replace(&pattern, value);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 2).unwrap()
    }

    fn yesterday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()
    }

    #[test]
    fn test_prompt_contains_dates_and_methods() {
        let prompt = build_extraction_prompt("I paid 900 for dinner", today(), yesterday());
        assert!(prompt.contains("Today is 2025-07-02"));
        assert!(prompt.contains(r#""date": "2025-07-01""#));
        for method in PaymentMethod::KNOWN {
            assert!(prompt.contains(&format!("\"{}\"", method.as_str())));
        }
        for field in OUTPUT_FIELDS {
            assert!(prompt.contains(field), "missing field {field}");
        }
        assert!(!prompt.contains("{{"));
    }

    #[test]
    fn test_prompt_ends_with_transcript() {
        let prompt = build_extraction_prompt("  Spent 250 on snacks  ", today(), yesterday());
        assert!(prompt.trim_end().ends_with("\"Spent 250 on snacks\""));
    }

    #[test]
    fn test_prompt_examples_cover_split_and_no_split() {
        let prompt = build_extraction_prompt("x", today(), yesterday());
        assert!(prompt.contains(r#""split_with": ["Rahul", "Sneha"]"#));
        assert!(prompt.contains(r#""split_with": []"#));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let a = build_extraction_prompt("lunch 300 UPI", today(), yesterday());
        let b = build_extraction_prompt("lunch 300 UPI", today(), yesterday());
        assert_eq!(a, b);
    }

    #[test]
    fn test_transcript_placeholders_not_expanded() {
        let prompt = build_extraction_prompt("paid {{today}} rupees", today(), yesterday());
        assert!(prompt.contains("paid {{today}} rupees"));
    }
}
