//! The part tree handle: lookup, growth, removal and the two copy flavours.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, instrument};

use crate::domain::arena::{NodeId, PartArena, PartNode, Quantity};

/// What an [`PartTree::insert`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// The child was attached under an existing parent
    Attached(NodeId),
    /// The tree was empty: a root and its first child were created
    Bootstrapped { root: NodeId, child: NodeId },
    /// The parent does not exist in a non-empty tree, nothing changed
    ParentMissing,
}

impl Insertion {
    /// Id of the newly created child, if any.
    pub fn child(&self) -> Option<NodeId> {
        match self {
            Insertion::Attached(child) | Insertion::Bootstrapped { child, .. } => Some(*child),
            Insertion::ParentMissing => None,
        }
    }
}

/// What a removal did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// That many nodes were detached and freed
    Removed(usize),
    /// No node with the requested name exists
    NotFound,
    /// The tree was already empty
    NothingToRemove,
}

impl Removal {
    pub fn is_removed(&self) -> bool {
        matches!(self, Removal::Removed(_))
    }
}

/// A direct sub-part as seen from its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubPart {
    pub id: NodeId,
    pub name: String,
    pub quantity: Quantity,
}

/// Handle on a bill-of-materials hierarchy.
///
/// Node storage is shared between handles. [`Clone`] (and [`PartTree::alias`])
/// produce a second header on the very same nodes: changes made through one
/// handle are seen by the other, and the nodes are freed once the last handle
/// is dropped. [`PartTree::deep_clone`] is the explicit way to get an
/// independent copy.
///
/// The handle is `Send + Sync` so independent trees can be walked on separate
/// threads. Mutating a tree while another thread walks an alias of it is
/// outside the contract.
#[derive(Default)]
pub struct PartTree {
    store: Arc<RwLock<PartArena>>,
}

impl Clone for PartTree {
    fn clone(&self) -> Self {
        self.alias()
    }
}

impl fmt::Debug for PartTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arena = self.read();
        f.debug_struct("PartTree")
            .field("store", &arena.id())
            .field("nodes", &arena.len())
            .field("handles", &Arc::strong_count(&self.store))
            .finish()
    }
}

impl PartTree {
    pub fn new() -> Self {
        Self::default()
    }

    fn from_arena(arena: PartArena) -> Self {
        Self {
            store: Arc::new(RwLock::new(arena)),
        }
    }

    // No arena operation panics halfway through an update, so a poisoned
    // lock still guards consistent data.
    pub(crate) fn read(&self) -> RwLockReadGuard<'_, PartArena> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, PartArena> {
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Number of parts in the tree.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn root(&self) -> Option<NodeId> {
        let arena = self.read();
        arena.root().map(|index| arena.node_id(index))
    }

    pub fn depth(&self) -> usize {
        self.read().depth()
    }

    /// Names of all parts without sub-parts, in pre-order.
    pub fn leaf_parts(&self) -> Vec<String> {
        self.read().leaf_nodes()
    }

    /// Looks a part up by name, depth-first from the root. First match wins.
    #[instrument(level = "trace", skip(self))]
    pub fn find(&self, name: &str) -> Option<NodeId> {
        let arena = self.read();
        arena.find(name).map(|index| arena.node_id(index))
    }

    /// Runs `f` on the node behind `id`. None if the id does not belong to
    /// this tree or the node was removed.
    pub fn with_part<R>(&self, id: NodeId, f: impl FnOnce(&PartNode) -> R) -> Option<R> {
        let arena = self.read();
        arena.resolve(id).and_then(|index| arena.get(index)).map(f)
    }

    /// Mutable counterpart of [`PartTree::with_part`].
    ///
    /// Only the name and quantity are exposed for mutation; a changed quantity
    /// re-sorts the node among its siblings afterwards.
    pub fn with_part_mut<R>(&self, id: NodeId, f: impl FnOnce(&mut PartNode) -> R) -> Option<R> {
        let mut arena = self.write();
        let index = arena.resolve(id)?;
        let node = arena.get_mut(index)?;
        let before = node.quantity;
        let result = f(node);
        if node.quantity != before {
            arena.reposition(index);
        }
        Some(result)
    }

    /// Direct sub-parts of `id` in quantity order.
    pub fn sub_parts(&self, id: NodeId) -> Option<Vec<SubPart>> {
        let arena = self.read();
        let node = arena.resolve(id).and_then(|index| arena.get(index))?;
        Some(
            node.children
                .iter()
                .filter_map(|&child| {
                    arena.get(child).map(|part| SubPart {
                        id: arena.node_id(child),
                        name: part.name.clone(),
                        quantity: part.quantity,
                    })
                })
                .collect(),
        )
    }

    /// Adds `child` with `quantity` under the part named `parent`.
    ///
    /// On an empty tree the first call creates `parent` as the root. When the
    /// tree is not empty and `parent` is unknown the call changes nothing.
    /// Duplicate child names are not checked.
    #[instrument(level = "debug", skip(self))]
    pub fn insert(&self, parent: &str, child: &str, quantity: Quantity) -> Insertion {
        let mut arena = self.write();
        if let Some(parent_idx) = arena.find(parent) {
            return match arena.attach_leaf(parent_idx, child, quantity) {
                Some(index) => Insertion::Attached(arena.node_id(index)),
                None => Insertion::ParentMissing,
            };
        }
        if !arena.is_empty() {
            debug!("parent not found, ignoring: {}", parent);
            return Insertion::ParentMissing;
        }

        let root = arena.set_root(parent, 0);
        match arena.attach_leaf(root, child, quantity) {
            Some(index) => Insertion::Bootstrapped {
                root: arena.node_id(root),
                child: arena.node_id(index),
            },
            None => Insertion::ParentMissing,
        }
    }

    /// Removes the part named `name` together with everything beneath it.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_subtree(&self, name: &str) -> Removal {
        let mut arena = self.write();
        match arena.find(name) {
            Some(index) => Removal::Removed(arena.remove_subtree(index)),
            None => Removal::NotFound,
        }
    }

    /// Removes the whole hierarchy.
    #[instrument(level = "debug", skip(self))]
    pub fn clear(&self) -> Removal {
        let mut arena = self.write();
        match arena.root() {
            Some(_) => Removal::Removed(arena.clear()),
            None => Removal::NothingToRemove,
        }
    }

    /// Renames a part and/or changes its quantity in place.
    ///
    /// Returns false if no part is named `name`.
    #[instrument(level = "debug", skip(self))]
    pub fn update_part(&self, name: &str, new_name: Option<&str>, quantity: Option<Quantity>) -> bool {
        let Some(id) = self.find(name) else {
            return false;
        };
        self.with_part_mut(id, |part| {
            if let Some(new_name) = new_name {
                part.name = new_name.to_string();
            }
            if let Some(quantity) = quantity {
                part.quantity = quantity;
            }
        })
        .is_some()
    }

    /// Second handle on the same nodes. O(1).
    pub fn alias(&self) -> PartTree {
        Self {
            store: Arc::clone(&self.store),
        }
    }

    /// Independent copy: same names, quantities and shape, new nodes.
    #[instrument(level = "debug", skip(self))]
    pub fn deep_clone(&self) -> PartTree {
        let copy = self.read().deep_clone();
        debug!("deep clone: {} nodes", copy.len());
        Self::from_arena(copy)
    }

    /// True if both handles refer to the same node storage.
    pub fn shares_storage_with(&self, other: &PartTree) -> bool {
        Arc::ptr_eq(&self.store, &other.store)
    }

    /// Number of live handles on this tree's storage.
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.store)
    }
}
