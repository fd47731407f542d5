//! Arena storage for part nodes.
//!
//! Nodes live in a generational arena and refer to each other by index.
//! Every arena carries a random store id, so a [`NodeId`] is unique across
//! all arenas alive in the process: two arenas never hand out equal ids.

use generational_arena::{Arena, Index};
use std::fmt;
use tracing::instrument;
use uuid::Uuid;

/// How many units of a part one unit of its parent contains.
pub type Quantity = u64;

/// Identity of a node: the arena it lives in plus its slot in that arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    store: Uuid,
    index: Index,
}

impl NodeId {
    /// Id of the arena owning the node.
    pub fn store(&self) -> Uuid {
        self.store
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.index.into_raw_parts();
        write!(f, "{}#{}.{}", self.store.simple(), slot, generation)
    }
}

/// A named part in the bill of materials.
#[derive(Debug, Clone)]
pub struct PartNode {
    /// Part name, expected (not enforced) to be unique in the tree
    pub name: String,
    /// Units of this part per unit of the parent, 0 for the root
    pub quantity: Quantity,
    /// Index of the parent node, None for the root
    pub(crate) parent: Option<Index>,
    /// Child indices ordered by quantity, ties in insertion order
    pub(crate) children: Vec<Index>,
}

impl PartNode {
    fn new(name: &str, quantity: Quantity, parent: Option<Index>) -> Self {
        Self {
            name: name.to_string(),
            quantity,
            parent,
            children: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

impl fmt::Display for PartNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.quantity)
    }
}

/// One step of a pre-order walk.
#[derive(Debug, Clone, Copy)]
pub struct PartVisit<'a> {
    /// Identity of the visited node
    pub id: NodeId,
    /// The visited node
    pub part: &'a PartNode,
    /// Distance from the walk's starting node (0 for the start itself)
    pub depth: usize,
}

/// Arena-backed part hierarchy with an optional root.
#[derive(Debug)]
pub struct PartArena {
    id: Uuid,
    nodes: Arena<PartNode>,
    root: Option<Index>,
}

impl Default for PartArena {
    fn default() -> Self {
        Self::new()
    }
}

impl PartArena {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            nodes: Arena::new(),
            root: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn node_id(&self, index: Index) -> NodeId {
        NodeId {
            store: self.id,
            index,
        }
    }

    /// Resolves an id to a local index, rejecting ids from other arenas.
    pub fn resolve(&self, id: NodeId) -> Option<Index> {
        (id.store == self.id && self.nodes.contains(id.index)).then_some(id.index)
    }

    pub fn get(&self, index: Index) -> Option<&PartNode> {
        self.nodes.get(index)
    }

    pub fn get_mut(&mut self, index: Index) -> Option<&mut PartNode> {
        self.nodes.get_mut(index)
    }

    /// Creates the root node. Any previous content is dropped.
    #[instrument(level = "trace", skip(self))]
    pub fn set_root(&mut self, name: &str, quantity: Quantity) -> Index {
        self.clear();
        let index = self.nodes.insert(PartNode::new(name, quantity, None));
        self.root = Some(index);
        index
    }

    /// Appends a brand-new leaf under `parent`.
    ///
    /// The leaf is placed after every sibling with a quantity less than or
    /// equal to its own. Returns None if `parent` is not in the arena.
    #[instrument(level = "trace", skip(self))]
    pub fn attach_leaf(&mut self, parent: Index, name: &str, quantity: Quantity) -> Option<Index> {
        if !self.nodes.contains(parent) {
            return None;
        }
        let index = self
            .nodes
            .insert(PartNode::new(name, quantity, Some(parent)));
        self.link_child(parent, index, quantity);
        Some(index)
    }

    fn link_child(&mut self, parent: Index, child: Index, quantity: Quantity) {
        let position = self.nodes.get(parent).map(|node| {
            node.children.partition_point(|&sibling| {
                self.nodes
                    .get(sibling)
                    .is_some_and(|s| s.quantity <= quantity)
            })
        });
        if let (Some(position), Some(node)) = (position, self.nodes.get_mut(parent)) {
            node.children.insert(position, child);
        }
    }

    /// Moves `child` to the slot matching its current quantity.
    pub(crate) fn reposition(&mut self, child: Index) {
        let Some((parent, quantity)) = self
            .nodes
            .get(child)
            .and_then(|node| node.parent.map(|p| (p, node.quantity)))
        else {
            return;
        };
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.retain(|&c| c != child);
        }
        self.link_child(parent, child, quantity);
    }

    /// First node named `name` in pre-order, starting at the root.
    #[instrument(level = "trace", skip(self))]
    pub fn find(&self, name: &str) -> Option<Index> {
        self.iter()
            .find(|visit| visit.part.name == name)
            .map(|visit| visit.id.index)
    }

    /// Detaches `index` from its parent and frees it with all descendants.
    ///
    /// Returns the number of freed nodes, 0 if `index` is unknown.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_subtree(&mut self, index: Index) -> usize {
        let Some(parent) = self.nodes.get(index).map(|node| node.parent) else {
            return 0;
        };
        match parent {
            Some(parent) => {
                if let Some(node) = self.nodes.get_mut(parent) {
                    node.children.retain(|&c| c != index);
                }
            }
            None => self.root = None,
        }

        let mut removed = 0;
        let mut stack = vec![index];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(current) {
                removed += 1;
                stack.extend(node.children);
            }
        }
        removed
    }

    /// Drops every node. Returns how many nodes were freed.
    pub fn clear(&mut self) -> usize {
        let removed = self.nodes.len();
        self.nodes.clear();
        self.root = None;
        removed
    }

    /// Pre-order walk over the whole arena.
    pub fn iter(&self) -> PreOrderIter<'_> {
        PreOrderIter::new(self, self.root)
    }

    /// Pre-order walk over the subtree rooted at `start`.
    pub fn iter_from(&self, start: Index) -> PreOrderIter<'_> {
        PreOrderIter::new(self, Some(start))
    }

    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.iter().map(|visit| visit.depth + 1).max().unwrap_or(0)
    }

    /// Names of all parts without sub-parts, in pre-order.
    pub fn leaf_nodes(&self) -> Vec<String> {
        self.iter()
            .filter(|visit| visit.part.is_leaf())
            .map(|visit| visit.part.name.clone())
            .collect()
    }

    /// Rebuilds the whole hierarchy in a new arena with a new store id.
    ///
    /// Every node is recreated; child order is copied as is.
    #[instrument(level = "debug", skip(self))]
    pub fn deep_clone(&self) -> PartArena {
        let mut copy = PartArena::new();
        let mut stack: Vec<(Index, Option<Index>)> =
            self.root.map(|root| (root, None)).into_iter().collect();
        while let Some((source, parent)) = stack.pop() {
            let Some(node) = self.nodes.get(source) else {
                continue;
            };
            let index = copy
                .nodes
                .insert(PartNode::new(&node.name, node.quantity, parent));
            match parent {
                Some(parent) => {
                    if let Some(parent_node) = copy.nodes.get_mut(parent) {
                        parent_node.children.push(index);
                    }
                }
                None => copy.root = Some(index),
            }
            // Reverse push: children pop, and get appended, in stored order
            stack.extend(node.children.iter().rev().map(|&child| (child, Some(index))));
        }
        copy
    }
}

/// Iterative pre-order walk: a node is yielded before its children,
/// children in stored order.
pub struct PreOrderIter<'a> {
    arena: &'a PartArena,
    stack: Vec<(Index, usize)>,
}

impl<'a> PreOrderIter<'a> {
    fn new(arena: &'a PartArena, start: Option<Index>) -> Self {
        let stack = start.map(|index| vec![(index, 0)]).unwrap_or_default();
        Self { arena, stack }
    }
}

impl<'a> Iterator for PreOrderIter<'a> {
    type Item = PartVisit<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((index, depth)) = self.stack.pop() {
            if let Some(part) = self.arena.get(index) {
                // Push children in reverse order for left-to-right traversal
                for &child in part.children.iter().rev() {
                    self.stack.push((child, depth + 1));
                }
                return Some(PartVisit {
                    id: self.arena.node_id(index),
                    part,
                    depth,
                });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (PartArena, Index) {
        let mut arena = PartArena::new();
        let root = arena.set_root("car", 0);
        let wheel = arena.attach_leaf(root, "wheel", 4).unwrap();
        arena.attach_leaf(wheel, "bolt", 5).unwrap();
        arena.attach_leaf(root, "engine", 1).unwrap();
        (arena, root)
    }

    #[test]
    fn test_children_are_ordered_by_quantity() {
        let (arena, root) = sample();
        let names: Vec<_> = arena
            .get(root)
            .unwrap()
            .children
            .iter()
            .map(|&c| arena.get(c).unwrap().name.as_str())
            .collect();
        assert_eq!(names, vec!["engine", "wheel"]);
    }

    #[test]
    fn test_equal_quantities_keep_insertion_order() {
        let mut arena = PartArena::new();
        let root = arena.set_root("box", 0);
        arena.attach_leaf(root, "a", 2).unwrap();
        arena.attach_leaf(root, "b", 1).unwrap();
        arena.attach_leaf(root, "c", 2).unwrap();
        arena.attach_leaf(root, "d", 1).unwrap();
        let names: Vec<_> = arena.iter().skip(1).map(|v| v.part.name.clone()).collect();
        assert_eq!(names, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn test_preorder_visits_parent_first() {
        let (arena, _) = sample();
        let walk: Vec<_> = arena.iter().map(|v| (v.part.name.clone(), v.depth)).collect();
        assert_eq!(
            walk,
            vec![
                ("car".to_string(), 0),
                ("engine".to_string(), 1),
                ("wheel".to_string(), 1),
                ("bolt".to_string(), 2),
            ]
        );
    }

    #[test]
    fn test_remove_subtree_frees_descendants() {
        let (mut arena, _) = sample();
        let wheel = arena.find("wheel").unwrap();
        assert_eq!(arena.remove_subtree(wheel), 2);
        assert_eq!(arena.len(), 2);
        assert!(arena.find("bolt").is_none());
        assert_eq!(arena.remove_subtree(wheel), 0);
    }

    #[test]
    fn test_deep_clone_uses_new_store() {
        let (arena, _) = sample();
        let copy = arena.deep_clone();
        assert_ne!(arena.id(), copy.id());
        assert_eq!(copy.len(), arena.len());
        assert_eq!(copy.depth(), 3);
        assert_eq!(copy.leaf_nodes(), arena.leaf_nodes());
    }

    #[test]
    fn test_deep_clone_of_long_chain_keeps_shape() {
        let mut arena = PartArena::new();
        let mut last = arena.set_root("link0", 0);
        for i in 1..100_000u64 {
            last = arena.attach_leaf(last, &format!("link{i}"), i).unwrap();
        }

        let copy = arena.deep_clone();

        assert_eq!(copy.len(), 100_000);
        assert_eq!(copy.depth(), 100_000);
        let tail = copy.find("link99999").unwrap();
        assert_eq!(copy.get(tail).unwrap().quantity, 99_999);
        assert!(copy.get(tail).unwrap().is_leaf());
    }

    #[test]
    fn test_deep_clone_keeps_sibling_order() {
        let mut arena = PartArena::new();
        let root = arena.set_root("box", 0);
        for (name, quantity) in [("a", 2), ("b", 1), ("c", 2), ("d", 1)] {
            arena.attach_leaf(root, name, quantity).unwrap();
        }
        let copy = arena.deep_clone();
        let walk = |a: &PartArena| a.iter().map(|v| v.part.name.clone()).collect::<Vec<_>>();
        assert_eq!(walk(&copy), walk(&arena));
        assert_eq!(walk(&copy), vec!["box", "b", "d", "a", "c"]);
    }

    #[test]
    fn test_resolve_rejects_foreign_ids() {
        let (arena, root) = sample();
        let copy = arena.deep_clone();
        assert!(copy.resolve(arena.node_id(root)).is_none());
        assert_eq!(arena.resolve(arena.node_id(root)), Some(root));
    }
}
