//! Text rendering of a part tree for terminal display.

use termtree::Tree;
use tracing::instrument;

use crate::domain::arena::PartArena;
use crate::domain::tree::PartTree;
use generational_arena::Index;

/// Levels rendered below the root; deeper parts are summarised in one line.
pub const MAX_RENDER_DEPTH: usize = 64;

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeNodeConvert for PartTree {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        let arena = self.read();
        match arena.root().and_then(|root| arena.get(root).map(|node| (root, node))) {
            Some((root_idx, root)) => {
                let mut tree = Tree::new(root.name.clone());
                build_tree(&arena, root_idx, &mut tree, 0);
                tree
            }
            None => Tree::new("Empty tree".to_string()),
        }
    }
}

fn build_tree(arena: &PartArena, node_idx: Index, parent_tree: &mut Tree<String>, depth: usize) {
    let Some(node) = arena.get(node_idx) else {
        return;
    };
    if depth >= MAX_RENDER_DEPTH {
        if !node.is_leaf() {
            let hidden = arena.iter_from(node_idx).count() - 1;
            parent_tree.push(Tree::new(format!("... {} more parts", hidden)));
        }
        return;
    }
    for &child_idx in &node.children {
        if let Some(child) = arena.get(child_idx) {
            let mut child_tree = Tree::new(format!("{} x {}", child.quantity, child.name));
            build_tree(arena, child_idx, &mut child_tree, depth + 1);
            parent_tree.push(child_tree);
        }
    }
}
