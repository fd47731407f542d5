//! Application-level errors (wraps domain errors)

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("{source_name}:{line_no}: {source}")]
    Malformed {
        source_name: String,
        line_no: usize,
        #[source]
        source: DomainError,
    },

    #[error("input file not found: {0}")]
    InputNotFound(PathBuf),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("copy verification failed: {message}")]
    CopyVerification { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
