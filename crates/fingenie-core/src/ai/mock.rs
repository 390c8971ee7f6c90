//! Mock backend for testing
//!
//! Produces expense JSON from the transcript with simple keyword heuristics.
//! Useful for unit tests and for running the server without an API key
//! (`AI_BACKEND=mock`).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use regex::Regex;
use serde_json::json;

use crate::error::{Error, Result};
use crate::models::PaymentMethod;

use super::ExpenseBackend;

/// Marker the extraction prompt puts right before the quoted transcript
const TRANSCRIPT_MARKER: &str = "Now extract from:";

#[derive(Debug, Clone)]
enum MockReply {
    Heuristic,
    Fixed(String),
    Fail { status: u16, body: String },
}

/// Mock AI backend for testing
///
/// Clones share one call counter, so a test can hand a clone to the code
/// under test and still see how many completions were requested.
#[derive(Debug, Clone)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    reply: MockReply,
    calls: Arc<AtomicUsize>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Create a heuristic mock backend (healthy by default)
    pub fn new() -> Self {
        Self {
            healthy: true,
            reply: MockReply::Heuristic,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Always reply with `reply`, whatever the prompt
    pub fn with_reply(reply: &str) -> Self {
        Self {
            reply: MockReply::Fixed(reply.to_string()),
            ..Self::new()
        }
    }

    /// Fail every call as if the endpoint returned `status`
    pub fn failing(status: u16, body: &str) -> Self {
        Self {
            healthy: false,
            reply: MockReply::Fail {
                status,
                body: body.to_string(),
            },
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create an unhealthy mock backend
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            ..Self::new()
        }
    }

    /// Number of completions requested so far (across clones)
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Build a plausible expense JSON reply for an extraction prompt
    ///
    /// Amount is the first number in the transcript, payment method the first
    /// known method mentioned (any case), category a keyword guess. Dates stay
    /// relative ("yesterday", "today") for the date resolver to handle.
    pub fn heuristic_reply(prompt: &str) -> String {
        let transcript = transcript_from_prompt(prompt);
        let lower = transcript.to_lowercase();

        let amount = amount_re()
            .find(transcript)
            .and_then(|m| m.as_str().replace(',', "").parse::<f64>().ok())
            .unwrap_or(0.0);

        let payment_method = PaymentMethod::KNOWN
            .into_iter()
            .find(|m| lower.contains(&m.as_str().to_lowercase()))
            .unwrap_or(PaymentMethod::Other);

        let date = if lower.contains("yesterday") {
            "yesterday"
        } else if lower.contains("tomorrow") {
            "tomorrow"
        } else {
            "today"
        };

        json!({
            "description": transcript,
            "amount": amount,
            "category": guess_category(&lower),
            "payment_method": payment_method.as_str(),
            "date": date,
            "split_with": split_names(transcript),
        })
        .to_string()
    }
}

#[async_trait]
impl ExpenseBackend for MockBackend {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            MockReply::Heuristic => Ok(Self::heuristic_reply(prompt)),
            MockReply::Fixed(reply) => Ok(reply.clone()),
            MockReply::Fail { status, body } => Err(Error::UpstreamStatus {
                status: *status,
                body: body.clone(),
            }),
        }
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}

fn amount_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d[\d,]*(?:\.\d+)?").expect("valid regex"))
}

fn split_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\bwith\s+([A-Z][a-z]+(?:(?:\s*,\s*|\s+and\s+)[A-Z][a-z]+)*)")
            .expect("valid regex")
    })
}

/// The quoted transcript at the end of an extraction prompt, or the whole
/// prompt when the marker is absent
fn transcript_from_prompt(prompt: &str) -> &str {
    let tail = match prompt.rfind(TRANSCRIPT_MARKER) {
        Some(idx) => &prompt[idx + TRANSCRIPT_MARKER.len()..],
        None => prompt,
    };
    let tail = tail.trim();
    tail.strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(tail)
}

fn guess_category(lower: &str) -> &'static str {
    const KEYWORDS: &[(&str, &[&str])] = &[
        ("food", &["dinner", "lunch", "breakfast", "food", "snack", "coffee", "restaurant", "pizza"]),
        ("groceries", &["grocer", "vegetable", "milk", "supermarket"]),
        ("rent", &["rent"]),
        ("travel", &["uber", "ola", "cab", "taxi", "auto", "bus", "train", "flight", "petrol", "fuel"]),
        ("bills", &["bill", "electricity", "recharge", "internet", "wifi"]),
        ("shopping", &["shopping", "clothes", "shoes", "amazon", "flipkart"]),
        ("entertainment", &["movie", "concert", "netflix"]),
    ];

    KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
        .map(|(category, _)| *category)
        .unwrap_or("other")
}

/// Capitalized names following "with" ("with Rahul and Sneha")
fn split_names(transcript: &str) -> Vec<String> {
    let Some(caps) = split_re().captures(transcript) else {
        return Vec::new();
    };

    caps[1]
        .split(',')
        .flat_map(|part| part.split(" and "))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
