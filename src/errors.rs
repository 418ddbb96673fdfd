use thiserror::Error;

/// Error type that captures ledger, registry, and persistence failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Transaction not found: {0}")]
    TransactionNotFound(i64),
    #[error("Category not found: {0}")]
    CategoryNotFound(String),
    #[error("Account not found: {0}")]
    AccountNotFound(String),
    #[error("Recurring template not found: {0}")]
    TemplateNotFound(String),
    #[error("Duplicate identifier: {0}")]
    Duplicate(String),
    #[error("Persistence error: {0}")]
    Storage(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

impl From<csv::Error> for LedgerError {
    fn from(err: csv::Error) -> Self {
        LedgerError::Storage(err.to_string())
    }
}
