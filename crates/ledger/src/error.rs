use thiserror::Error;

/// Errors that can occur when writing to or reading from the ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The ledger could not be reached.
    #[error("Ledger unavailable: {0}")]
    Unavailable(String),
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
