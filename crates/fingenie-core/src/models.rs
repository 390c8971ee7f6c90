//! Domain models for FinGenie

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How an expense was paid
///
/// `Other` is the fallback for anything the model (or a client) reports that
/// is not one of the known methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    #[serde(rename = "UPI")]
    Upi,
    GPay,
    PhonePe,
    Card,
    NetBanking,
    Wallet,
    Other,
}

impl PaymentMethod {
    /// The recognized methods, in the order they are presented to the model
    pub const KNOWN: [PaymentMethod; 7] = [
        Self::Cash,
        Self::Upi,
        Self::GPay,
        Self::PhonePe,
        Self::Card,
        Self::NetBanking,
        Self::Wallet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::Upi => "UPI",
            Self::GPay => "GPay",
            Self::PhonePe => "PhonePe",
            Self::Card => "Card",
            Self::NetBanking => "NetBanking",
            Self::Wallet => "Wallet",
            Self::Other => "Other",
        }
    }

    /// Map an extracted payment method onto the known set
    ///
    /// Matching is exact and case-sensitive: "gpay" becomes `Other`.
    pub fn normalize(raw: Option<&str>) -> Self {
        raw.and_then(|s| Self::KNOWN.into_iter().find(|m| m.as_str() == s))
            .unwrap_or(Self::Other)
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transaction source - how it was created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionSource {
    /// Entered directly through the create endpoint or CLI
    #[default]
    Manual,
    /// Extracted from a voice transcript
    Voice,
}

impl TransactionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Voice => "voice",
        }
    }
}

impl std::str::FromStr for TransactionSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "manual" => Ok(Self::Manual),
            "voice" => Ok(Self::Voice),
            _ => Err(format!("Unknown transaction source: {}", s)),
        }
    }
}

/// A stored expense
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub amount: f64,
    pub category: String,
    pub mode: PaymentMethod,
    pub date: NaiveDate,
    /// People sharing the expense; empty = not split
    pub split_with: Vec<String>,
    pub description: Option<String>,
    pub source: TransactionSource,
    /// Transcript the expense was extracted from (voice entries only)
    pub transcript: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A new expense to be stored (before DB insertion)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTransaction {
    pub amount: f64,
    pub category: String,
    pub mode: PaymentMethod,
    pub date: NaiveDate,
    pub split_with: Vec<String>,
    pub description: Option<String>,
    #[serde(skip)]
    pub source: TransactionSource,
    #[serde(skip)]
    pub transcript: Option<String>,
}

impl NewTransaction {
    /// Check the transaction schema: positive amount, non-empty category
    pub fn validate(&self) -> Result<()> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(Error::InvalidTransaction(format!(
                "amount must be greater than 0 (got {})",
                self.amount
            )));
        }
        if self.category.trim().is_empty() {
            return Err(Error::InvalidTransaction(
                "category must not be empty".into(),
            ));
        }
        if self.split_with.iter().any(|name| name.trim().is_empty()) {
            return Err(Error::InvalidTransaction(
                "split_with names must not be empty".into(),
            ));
        }
        Ok(())
    }
}
