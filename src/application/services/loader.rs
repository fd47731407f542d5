//! Definition loader
//!
//! Builds a part tree from `<parent> <quantity> <child>` records.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{Definition, Insertion, PartTree};
use crate::infrastructure::traits::FileSystem;

/// Source name used in error messages for in-memory input.
pub const INLINE_SOURCE: &str = "<input>";

/// Service for loading part trees from definition files.
pub struct DefinitionLoader {
    fs: Arc<dyn FileSystem>,
}

impl DefinitionLoader {
    /// Create a new definition loader.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Load a tree from a definition file.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<PartTree> {
        let content = self.read_input(path)?;
        let tree = PartTree::new();
        self.extend_from(&tree, &content, &path.display().to_string())?;
        Ok(tree)
    }

    /// Load a tree from definition text.
    pub fn load_str(&self, content: &str) -> ApplicationResult<PartTree> {
        let tree = PartTree::new();
        self.extend_from(&tree, content, INLINE_SOURCE)?;
        Ok(tree)
    }

    /// Insert every record of `content` into `tree`, in order.
    ///
    /// Stops at the first malformed record; records before it stay inserted.
    /// Returns the number of records whose parent was not found.
    pub fn extend_from(&self, tree: &PartTree, content: &str, source_name: &str) -> ApplicationResult<usize> {
        let mut skipped = 0;
        for (line_no, line) in numbered_lines(content) {
            let def = Definition::parse(line).map_err(|source| ApplicationError::Malformed {
                source_name: source_name.to_string(),
                line_no,
                source,
            })?;
            if tree.insert(&def.parent, &def.child, def.quantity) == Insertion::ParentMissing {
                debug!("{}:{}: parent '{}' unknown, record ignored", source_name, line_no, def.parent);
                skipped += 1;
            }
        }
        debug!("loaded {} parts from {}", tree.len(), source_name);
        Ok(skipped)
    }

    fn read_input(&self, path: &Path) -> ApplicationResult<String> {
        if !self.fs.exists(path) {
            return Err(ApplicationError::InputNotFound(path.to_path_buf()));
        }
        self.fs
            .read_to_string(path)
            .with_path_context("read definitions", path)
    }
}

/// Non-blank lines with their 1-based numbers, `\r` stripped.
pub(crate) fn numbered_lines(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim_end_matches('\r')))
        .filter(|(_, line)| !line.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::traits::RealFileSystem;

    fn loader() -> DefinitionLoader {
        DefinitionLoader::new(Arc::new(RealFileSystem))
    }

    #[test]
    fn test_load_str_builds_tree_in_order() {
        let tree = loader()
            .load_str("hospital 3 ward\nward 10 bed\n\nhospital 1 lobby\n")
            .unwrap();
        assert_eq!(tree.full_report(), "hospital 0\nlobby 1\nward 3\nbed 10\n");
    }

    #[test]
    fn test_malformed_record_reports_line_number() {
        let err = loader().load_str("hospital 3 ward\nward ten bed\n").unwrap_err();
        match err {
            ApplicationError::Malformed { line_no, source_name, .. } => {
                assert_eq!(line_no, 2);
                assert_eq!(source_name, INLINE_SOURCE);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_parent_is_counted_not_fatal() {
        let tree = PartTree::new();
        let skipped = loader()
            .extend_from(&tree, "a 1 b\nzzz 2 c\nb 3 d\r\n", INLINE_SOURCE)
            .unwrap();
        assert_eq!(skipped, 1);
        assert_eq!(tree.len(), 3);
        assert!(tree.find("d").is_some());
    }
}
