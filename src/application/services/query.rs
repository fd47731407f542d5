//! Query interpreter
//!
//! Answers `whatis` and `howmany` queries against a built part tree.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::services::loader::{numbered_lines, INLINE_SOURCE};
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{capitalize_first, PartTree, Query};
use crate::infrastructure::traits::FileSystem;

/// Service for running query files against a part tree.
pub struct QueryService {
    fs: Arc<dyn FileSystem>,
}

impl QueryService {
    /// Create a new query service.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Run every query in a file and concatenate the answers.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn run_file(&self, tree: &PartTree, path: &Path) -> ApplicationResult<String> {
        if !self.fs.exists(path) {
            return Err(ApplicationError::InputNotFound(path.to_path_buf()));
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read queries", path)?;
        self.run_named(tree, &content, &path.display().to_string())
    }

    /// Run every query in `content` and concatenate the answers.
    pub fn run(&self, tree: &PartTree, content: &str) -> ApplicationResult<String> {
        self.run_named(tree, content, INLINE_SOURCE)
    }

    fn run_named(&self, tree: &PartTree, content: &str, source_name: &str) -> ApplicationResult<String> {
        let mut output = String::new();
        for (line_no, line) in numbered_lines(content) {
            let query = Query::parse(line).map_err(|source| ApplicationError::Malformed {
                source_name: source_name.to_string(),
                line_no,
                source,
            })?;
            output.push_str(&answer(tree, &query));
        }
        debug!("answered queries from {}", source_name);
        Ok(output)
    }

    /// Parse and answer a single query line.
    pub fn run_line(&self, tree: &PartTree, line: &str) -> ApplicationResult<String> {
        let query = Query::parse(line)?;
        Ok(answer(tree, &query))
    }
}

/// Answer text for one query.
///
/// `whatis` yields the sub-part listing (empty for unknown parts). `howmany`
/// yields `"<Parent> has <n> <child>\n"`, with 0 when `child` is not a direct
/// sub-part, and nothing at all when `parent` is unknown.
pub fn answer(tree: &PartTree, query: &Query) -> String {
    match query {
        Query::WhatIs { name } => tree.report_subtree(name),
        Query::HowMany { parent, child } => {
            let Some(parent_id) = tree.find(parent) else {
                return String::new();
            };
            let quantity = tree
                .sub_parts(parent_id)
                .unwrap_or_default()
                .into_iter()
                .find(|sub| &sub.name == child)
                .map_or(0, |sub| sub.quantity);
            format!("{} has {} {}\n", capitalize_first(parent), quantity, child)
        }
    }
}
