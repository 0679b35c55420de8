//! Core error types for the assetledger domain.
//!
//! This module defines database-agnostic error types. Storage-specific errors
//! (from Diesel, SQLite, etc.) are converted to these types by the storage layer.

use chrono::ParseError as ChronoParseError;
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the ledger application.
///
/// Database-specific errors are wrapped in string form to keep this type
/// database-agnostic.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Valuation failed: {0}")]
    Valuation(#[from] ValuationError),

    #[error("Ledger operation failed: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Database-agnostic error type for storage operations.
///
/// This enum uses `String` for all error details, allowing the storage layer
/// to convert storage-specific errors (Diesel, SQLite, etc.) into this format.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to establish a database connection.
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to create or configure the connection pool.
    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(String),

    /// A database query failed to execute.
    #[error("Database query failed: {0}")]
    QueryFailed(String),

    /// The requested record was not found.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A unique constraint was violated (e.g., duplicate key).
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// A foreign key constraint was violated.
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// A database transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Database migration failed.
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Internal/unexpected database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Errors produced by the valuation calculator.
///
/// Calculator functions are pure and reject out-of-domain inputs instead of
/// clamping them silently.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValuationError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Errors on the ledger write path, recovered at the reconciliation boundary.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Both a depreciation and an appreciation policy were active at once.
    #[error("Conflicting valuation policy: {0}")]
    PolicyConflict(String),

    /// A transaction amount's sign contradicts its type.
    #[error("Sign convention violation: {0}")]
    SignConventionViolation(String),

    /// Optimistic-concurrency failure: the asset projection changed under us.
    /// The caller must retry with the refreshed projection.
    #[error("Stale projection for asset {asset_id}: expected version {expected}, found {found}")]
    StaleProjection {
        asset_id: String,
        expected: i64,
        found: i64,
    },

    /// Referenced asset or ledger entry does not exist in the caller's owner scope.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed ledger input.
    #[error("Invalid ledger data: {0}")]
    InvalidData(String),
}

/// Validation errors for user input and data parsing.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Failed to parse date/time: {0}")]
    DateTimeParse(#[from] ChronoParseError),
}

// === From implementations for common error types ===

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateTimeParse(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
