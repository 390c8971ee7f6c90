//! Error types for FinGenie

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LLM request failed with status {status}")]
    UpstreamStatus { status: u16, body: String },

    #[error("Malformed LLM response: {reason}")]
    MalformedResponse { reason: String, raw: String },

    #[error("No valid JSON found in LLM reply")]
    NoJsonFound { raw: String },

    #[error("JSON parse error: {source}")]
    JsonDecode {
        raw: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid transaction data: {0}")]
    InvalidTransaction(String),

    /// Validation failure on fields extracted from a model reply
    #[error("Invalid transaction data: {reason}")]
    InvalidExtraction { reason: String, raw: String },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Coarse classification of [`Error`], used to pick HTTP status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing credential or other startup misconfiguration
    Config,
    /// Connection, DNS or timeout failure talking to the model endpoint
    Transport,
    /// Non-success status or malformed envelope from the model endpoint
    Upstream,
    /// No JSON object found in the model reply
    Extraction,
    /// Located JSON could not be decoded
    Decode,
    /// Decoded fields fail the transaction schema
    Validation,
    /// Database operation failed
    Storage,
    /// Anything else
    Other,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_) => ErrorKind::Config,
            Error::Http(_) => ErrorKind::Transport,
            Error::UpstreamStatus { .. } | Error::MalformedResponse { .. } => ErrorKind::Upstream,
            Error::NoJsonFound { .. } => ErrorKind::Extraction,
            Error::JsonDecode { .. } => ErrorKind::Decode,
            Error::InvalidTransaction(_) | Error::InvalidExtraction { .. } => {
                ErrorKind::Validation
            }
            Error::Database(_) | Error::Pool(_) => ErrorKind::Storage,
            _ => ErrorKind::Other,
        }
    }

    /// Whether this is a transport error caused by a request timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Http(e) if e.is_timeout())
    }

    /// Raw upstream text attached to the error, for diagnostics
    pub fn raw(&self) -> Option<&str> {
        match self {
            Error::UpstreamStatus { body, .. } => Some(body),
            Error::MalformedResponse { raw, .. }
            | Error::NoJsonFound { raw }
            | Error::JsonDecode { raw, .. }
            | Error::InvalidExtraction { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(Error::Config("x".into()).kind(), ErrorKind::Config);
        assert_eq!(
            Error::UpstreamStatus {
                status: 500,
                body: String::new()
            }
            .kind(),
            ErrorKind::Upstream
        );
        assert_eq!(
            Error::NoJsonFound { raw: "hi".into() }.kind(),
            ErrorKind::Extraction
        );
        assert_eq!(
            Error::InvalidTransaction("amount".into()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(Error::NotFound("tx".into()).kind(), ErrorKind::Other);
    }

    #[test]
    fn test_raw_attached() {
        let err = Error::MalformedResponse {
            reason: "'choices' not found".into(),
            raw: r#"{"error":"quota"}"#.into(),
        };
        assert_eq!(err.raw(), Some(r#"{"error":"quota"}"#));
        assert!(Error::Config("missing".into()).raw().is_none());

        let err = Error::InvalidExtraction {
            reason: "amount must be greater than 0 (got 0)".into(),
            raw: r#"{"amount": 0}"#.into(),
        };
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.raw(), Some(r#"{"amount": 0}"#));
        assert!(Error::InvalidTransaction("amount".into()).raw().is_none());
    }
}
