//! CLI-level errors (wraps application errors)

use thiserror::Error;

use crate::application::ApplicationError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) => crate::exitcode::USAGE,
            CliError::Application(e) => match e {
                ApplicationError::Domain(_) | ApplicationError::Malformed { .. } => {
                    crate::exitcode::DATAERR
                }
                ApplicationError::InputNotFound(_) => crate::exitcode::NOINPUT,
                ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                ApplicationError::OperationFailed { .. } => crate::exitcode::IOERR,
                ApplicationError::CopyVerification { .. } => crate::exitcode::SOFTWARE,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;
    use std::path::PathBuf;

    #[test]
    fn test_exit_codes() {
        let malformed = CliError::from(ApplicationError::Malformed {
            source_name: "queries.txt".into(),
            line_no: 1,
            source: DomainError::InvalidQuantity("x".into()),
        });
        assert_eq!(malformed.exit_code(), crate::exitcode::DATAERR);

        let missing = CliError::from(ApplicationError::InputNotFound(PathBuf::from("definitions.txt")));
        assert_eq!(missing.exit_code(), crate::exitcode::NOINPUT);

        assert_eq!(CliError::InvalidArgs("x".into()).exit_code(), crate::exitcode::USAGE);
    }
}
