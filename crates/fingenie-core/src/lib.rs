//! FinGenie Core Library
//!
//! Shared functionality for the FinGenie voice expense tracker:
//! - Transaction store (SQLite with connection pooling)
//! - Chat completion client for expense extraction (hosted or mock)
//! - Prompt builder and JSON reply parsing
//! - Date resolution and payment method normalization
//! - Expense assembly and validation
//! - CSV export

pub mod ai;
pub mod config;
pub mod dates;
pub mod db;
pub mod error;
pub mod export;
pub mod extract;
pub mod models;
pub mod prompts;

/// Test utilities including a mock chat completion server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{AIClient, ExpenseBackend, MockBackend, OpenAICompatibleBackend};
pub use config::ExtractionConfig;
pub use db::Database;
pub use error::{Error, ErrorKind, Result};
pub use extract::{assemble_expense, extract_expense};
pub use models::{NewTransaction, PaymentMethod, Transaction, TransactionSource};
