//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent malformed input records.
/// Lookup misses and empty trees are not errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid definition '{line}': {reason}")]
    InvalidDefinition { line: String, reason: String },

    #[error("invalid query '{line}': {reason}")]
    InvalidQuery { line: String, reason: String },

    #[error("invalid quantity: '{0}'")]
    InvalidQuantity(String),
}
