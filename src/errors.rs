//! Unified error types for the catalog and cart stores.
//!
//! Every store operation returns [`Result`]. Storage failures abort the running
//! transaction, so an `Err` never leaves a partial write behind.

use sea_orm::DbErr;
use thiserror::Error;

/// Errors raised by the stores, configuration loading and schema checks.
#[derive(Debug, Error)]
pub enum Error {
    /// A row that an operation requires does not exist
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of row that was looked up (e.g. `"product"`)
        entity: &'static str,
        /// Identifier that was looked up
        id: i64,
    },

    /// A write was rejected because of a duplicate identifier or invalid field
    #[error("Constraint violation: {message}")]
    ConstraintViolation {
        /// What was violated
        message: String,
    },

    /// The backing database failed or could not be reached
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] DbErr),

    /// The stored schema fingerprint disagrees with the current entity definitions
    #[error("Schema mismatch: expected fingerprint {expected}, found {found}")]
    SchemaMismatch {
        /// Fingerprint computed from the current entities
        expected: String,
        /// Fingerprint read from the database
        found: String,
    },

    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },
}

impl Error {
    pub(crate) fn constraint(message: impl Into<String>) -> Self {
        Self::ConstraintViolation {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
