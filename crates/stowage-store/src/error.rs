//! Error types for store operations

use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors surfaced by the facade.
///
/// Absence of a row is never an error; reads return `None` or an empty `Vec`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be opened. Fatal for the facade instance.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// The attached validator rejected the subject. Nothing was written.
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// The engine failed while applying or committing; the transaction was rolled back.
    #[error("Persistence failed: {0}")]
    PersistenceFailed(#[from] EngineError),

    #[error("Invalid sort key: {0}")]
    InvalidSortKey(String),
}

impl StoreError {
    /// Get the error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::StoreUnavailable(_) => "E-STORE-001",
            StoreError::ValidationFailed(_) => "E-STORE-002",
            StoreError::PersistenceFailed(_) => "E-STORE-003",
            StoreError::InvalidSortKey(_) => "E-STORE-004",
        }
    }

    /// Whether a retry with the same input could possibly succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::PersistenceFailed(EngineError::DuplicateKey { .. }) => false,
            StoreError::PersistenceFailed(_) => true,
            _ => false,
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(err: ValidationError) -> Self {
        StoreError::ValidationFailed(err.message)
    }
}

/// Failures raised by the embedded engine underneath the facade.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("Payload encoding error: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("Database creation error: {0}")]
    DatabaseCreation(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Duplicate primary key for {type_name}: {key}")]
    DuplicateKey { type_name: &'static str, key: String },
}

/// Raised by a validator that refuses a value outright.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
