//! Copy verification
//!
//! Takes an aliasing copy and a deep clone of a tree, walks the source and
//! both copies concurrently, and checks that the alias shares every node with
//! the source while the clone shares none but reports identical content.

use std::collections::HashSet;

use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{NodeId, PartTree};

/// Identities and content collected from one tree.
#[derive(Debug, Clone, Default)]
struct Snapshot {
    ids: Vec<NodeId>,
    report: String,
}

impl Snapshot {
    fn collect(tree: &PartTree) -> Self {
        let (ids, report) = rayon::join(|| tree.node_ids(), || tree.full_report());
        Self { ids, report }
    }
}

/// Outcome of a copy verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyVerification {
    /// Nodes in the source tree
    pub source_nodes: usize,
    /// Nodes in the deep clone
    pub clone_nodes: usize,
    /// Alias visited exactly the source's node identities, in the same order
    pub alias_shares_nodes: bool,
    /// Node identities found in both the source and the deep clone
    pub shared_with_clone: usize,
    /// Full report of the source
    pub source_report: String,
    /// Full report of the deep clone
    pub clone_report: String,
}

impl CopyVerification {
    pub fn is_deep(&self) -> bool {
        self.shared_with_clone == 0 && self.source_nodes == self.clone_nodes
    }

    pub fn content_matches(&self) -> bool {
        self.source_report == self.clone_report
    }

    pub fn passed(&self) -> bool {
        self.alias_shares_nodes && self.is_deep() && self.content_matches()
    }

    /// Turns a failed verification into an error.
    pub fn ensure(self) -> ApplicationResult<Self> {
        if !self.alias_shares_nodes {
            return Err(ApplicationError::CopyVerification {
                message: "aliasing copy does not share the source's nodes".to_string(),
            });
        }
        if !self.is_deep() {
            return Err(ApplicationError::CopyVerification {
                message: format!(
                    "this is a shallow copy: {} of {} nodes shared",
                    self.shared_with_clone, self.source_nodes
                ),
            });
        }
        if !self.content_matches() {
            return Err(ApplicationError::CopyVerification {
                message: format!(
                    "deep copy content differs\nsource:\n{}copy:\n{}",
                    self.source_report, self.clone_report
                ),
            });
        }
        Ok(self)
    }
}

/// Checks the alias/deep-clone contract on a tree.
#[derive(Debug, Default)]
pub struct CopyVerifier;

impl CopyVerifier {
    pub fn new() -> Self {
        Self
    }

    #[instrument(level = "debug", skip(self, tree))]
    pub fn verify(&self, tree: &PartTree) -> CopyVerification {
        let alias = tree.alias();
        let deep = tree.deep_clone();

        let (source, (aliased, cloned)) = rayon::join(
            || Snapshot::collect(tree),
            || rayon::join(|| Snapshot::collect(&alias), || Snapshot::collect(&deep)),
        );

        let source_ids: HashSet<NodeId> = source.ids.iter().copied().collect();
        let shared_with_clone = cloned
            .ids
            .iter()
            .filter(|id| source_ids.contains(id))
            .count();
        debug!(
            "verify: source={} alias={} clone={} shared_with_clone={}",
            source.ids.len(),
            aliased.ids.len(),
            cloned.ids.len(),
            shared_with_clone
        );

        let result = CopyVerification {
            source_nodes: source.ids.len(),
            clone_nodes: cloned.ids.len(),
            alias_shares_nodes: aliased.ids == source.ids,
            shared_with_clone,
            source_report: source.report,
            clone_report: cloned.report,
        };
        info!("copy verification passed: {}", result.passed());
        result
    }
}
