//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Init and shared utilities (open_db)
//! - `export` - CSV export
//! - `parse` - LLM extraction from a transcript
//! - `serve` - Web server command
//! - `transactions` - List and add expenses

pub mod core;
pub mod export;
pub mod parse;
pub mod serve;
pub mod transactions;

// Re-export command functions for main.rs
pub use core::*;
pub use export::*;
pub use parse::*;
pub use serve::*;
pub use transactions::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
