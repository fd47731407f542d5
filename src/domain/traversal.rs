//! Fold-style traversal and the text reports built on it.
//!
//! Every walk is pre-order. The combine function maps each visited node to a
//! partial result; partial results are appended in visiting order, so the
//! result type's [`Accumulate`] impl must be associative.

use itertools::Itertools;
use tracing::instrument;

use crate::domain::arena::{NodeId, PartVisit};
use crate::domain::tree::PartTree;

/// A result type that partial results can be appended to.
pub trait Accumulate: Default {
    fn accumulate(&mut self, other: Self);
}

impl Accumulate for String {
    fn accumulate(&mut self, other: Self) {
        self.push_str(&other);
    }
}

impl<T> Accumulate for Vec<T> {
    fn accumulate(&mut self, mut other: Self) {
        self.append(&mut other);
    }
}

impl Accumulate for usize {
    fn accumulate(&mut self, other: Self) {
        *self += other;
    }
}

impl Accumulate for () {
    fn accumulate(&mut self, _other: Self) {}
}

impl PartTree {
    /// Folds the whole tree. An empty tree yields `R::default()`.
    ///
    /// The tree is read-locked for the duration of the walk: `combine` must
    /// not call mutating methods on this tree or any alias of it.
    pub fn fold<R, F>(&self, combine: F) -> R
    where
        R: Accumulate,
        F: FnMut(&PartVisit<'_>) -> R,
    {
        let arena = self.read();
        fold_visits(arena.iter(), combine)
    }

    /// Folds the subtree rooted at `start`. Unknown ids yield `R::default()`.
    pub fn fold_from<R, F>(&self, start: NodeId, combine: F) -> R
    where
        R: Accumulate,
        F: FnMut(&PartVisit<'_>) -> R,
    {
        let arena = self.read();
        match arena.resolve(start) {
            Some(index) => fold_visits(arena.iter_from(index), combine),
            None => R::default(),
        }
    }

    /// Applies `action` to every node in pre-order.
    pub fn visit<F>(&self, mut action: F)
    where
        F: FnMut(&PartVisit<'_>),
    {
        self.fold(|visit| action(visit))
    }

    /// Node identities in pre-order.
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.fold(|visit| vec![visit.id])
    }

    /// Listing of the direct sub-parts of `name`, empty if `name` is unknown.
    ///
    /// ```text
    /// Part hospital subparts are:
    /// 3 ward
    /// ```
    #[instrument(level = "debug", skip(self))]
    pub fn report_subtree(&self, name: &str) -> String {
        match self.find(name) {
            Some(id) => self.subparts_listing(id),
            None => String::new(),
        }
    }

    fn subparts_listing(&self, id: NodeId) -> String {
        let Some(name) = self.with_part(id, |part| part.name.clone()) else {
            return String::new();
        };
        let lines = self
            .sub_parts(id)
            .unwrap_or_default()
            .iter()
            .map(|sub| format!("{} {}\n", sub.quantity, sub.name))
            .join("");
        format!("Part {} subparts are:\n{}", name, lines)
    }

    /// `"<name> <quantity>\n"` for every part in pre-order.
    #[instrument(level = "debug", skip(self))]
    pub fn full_report(&self) -> String {
        self.fold(|visit| format!("{}\n", visit.part))
    }

    /// The sub-part listing of every part in pre-order, leaves included.
    #[instrument(level = "debug", skip(self))]
    pub fn full_listing(&self) -> String {
        self.node_ids()
            .into_iter()
            .map(|id| self.subparts_listing(id))
            .collect()
    }
}

fn fold_visits<'a, R, F>(visits: impl Iterator<Item = PartVisit<'a>>, mut combine: F) -> R
where
    R: Accumulate,
    F: FnMut(&PartVisit<'_>) -> R,
{
    let mut result = R::default();
    for visit in visits {
        result.accumulate(combine(&visit));
    }
    result
}
