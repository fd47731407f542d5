//! Domain layer: the part tree and its records
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod entities;
pub mod error;
pub mod traversal;
pub mod tree;
pub mod tree_traits;

pub use arena::{NodeId, PartArena, PartNode, PartVisit, Quantity};
pub use entities::{capitalize_first, Definition, Query};
pub use error::DomainError;
pub use traversal::Accumulate;
pub use tree::{Insertion, PartTree, Removal, SubPart};
pub use tree_traits::TreeNodeConvert;
