//! HTTP request handlers organized by domain

pub mod health;
pub mod transactions;
pub mod voice;

// Re-export all handlers for use in router
pub use health::*;
pub use transactions::*;
pub use voice::*;
