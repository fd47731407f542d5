//! Bill-of-materials part trees.
//!
//! A [`PartTree`](domain::PartTree) holds a named part hierarchy where every
//! sub-part carries the quantity one unit of its parent needs. Trees can be
//! copied two ways: [`alias`](domain::PartTree::alias) shares the nodes,
//! [`deep_clone`](domain::PartTree::deep_clone) rebuilds them.
//!
//! Layers:
//! - `domain`: arena storage, the tree handle, traversal and reports
//! - `application`: definition loader, query interpreter, copy verifier
//! - `infrastructure`: I/O traits and service wiring
//! - `cli`: argument parsing and command dispatch

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
