//! Application services

pub mod loader;
pub mod query;
pub mod verify;

pub use loader::DefinitionLoader;
pub use query::QueryService;
pub use verify::{CopyVerification, CopyVerifier};
