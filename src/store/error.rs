use thiserror::Error;

/// Everything that can go wrong inside the library store. The variants keep
/// "fix your input" (`Validation`, `NotFound`) strictly apart from "the
/// backend failed" (`Storage`, `Json`, `Io`) and "the process cannot start"
/// (`Configuration`), so callers can route each to the right surface.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Caller-supplied data violates an invariant. The message is written for
    /// direct display in a form or footer, so it carries no prefix.
    #[error("{0}")]
    Validation(String),

    /// The referenced record does not exist (any more).
    #[error("Book not found: {0}")]
    NotFound(i64),

    #[error("Database error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raised only while resolving or opening the durable backend at startup.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
