//! Tests for aliasing copies and deep clones

use std::collections::HashSet;
use std::thread;

use rstest::{fixture, rstest};

use bomtree::domain::{NodeId, PartTree};
use bomtree::util::testing;

#[ctor::ctor]
fn init() {
    testing::init_test_setup();
}

#[fixture]
fn hospital() -> PartTree {
    let tree = PartTree::new();
    tree.insert("hospital", "ward", 3);
    tree.insert("ward", "bed", 10);
    tree.insert("ward", "chair", 10);
    tree.insert("bed", "pillow", 2);
    tree.insert("hospital", "lobby", 1);
    tree
}

fn id_set(tree: &PartTree) -> HashSet<NodeId> {
    tree.node_ids().into_iter().collect()
}

// ============================================================
// Aliasing copy
// ============================================================

#[rstest]
fn given_tree_when_aliasing_then_node_ids_identical(hospital: PartTree) {
    let alias = hospital.alias();
    assert_eq!(alias.node_ids(), hospital.node_ids());
    assert!(alias.shares_storage_with(&hospital));
}

#[rstest]
fn given_clone_trait_when_copying_then_behaves_as_alias(hospital: PartTree) {
    let copy = hospital.clone();
    assert!(copy.shares_storage_with(&hospital));
    assert_eq!(copy.node_ids(), hospital.node_ids());
}

#[rstest]
fn given_alias_when_mutating_then_visible_through_source(hospital: PartTree) {
    let alias = hospital.alias();
    alias.insert("lobby", "plant", 6);
    assert!(hospital.find("plant").is_some());

    hospital.remove_subtree("ward");
    assert!(alias.find("bed").is_none());
    assert_eq!(alias.full_report(), hospital.full_report());
}

#[rstest]
fn given_alias_when_source_dropped_then_nodes_survive(hospital: PartTree) {
    let alias = hospital.alias();
    let before = alias.full_report();
    drop(hospital);
    assert_eq!(alias.handle_count(), 1);
    assert_eq!(alias.full_report(), before);
}

// ============================================================
// Deep clone
// ============================================================

#[rstest]
fn given_tree_when_deep_cloning_then_report_identical(hospital: PartTree) {
    let clone = hospital.deep_clone();
    assert_eq!(clone.full_report(), hospital.full_report());
    assert_eq!(clone.full_listing(), hospital.full_listing());
}

#[rstest]
fn given_tree_when_deep_cloning_then_ids_disjoint_with_same_cardinality(hospital: PartTree) {
    let clone = hospital.deep_clone();
    let source = id_set(&hospital);
    let cloned = id_set(&clone);
    assert_eq!(source.len(), cloned.len());
    assert!(source.is_disjoint(&cloned));
    assert!(!clone.shares_storage_with(&hospital));
}

#[rstest]
fn given_deep_clone_when_mutating_either_then_other_unaffected(hospital: PartTree) {
    let clone = hospital.deep_clone();
    let original = hospital.full_report();

    clone.insert("pillow", "case", 1);
    clone.remove_subtree("lobby");
    assert_eq!(hospital.full_report(), original);

    hospital.clear();
    assert!(clone.find("case").is_some());
    assert!(clone.find("ward").is_some());
}

#[rstest]
fn given_equal_quantity_siblings_when_deep_cloning_then_order_preserved(hospital: PartTree) {
    let clone = hospital.deep_clone();
    assert_eq!(
        clone.report_subtree("ward"),
        "Part ward subparts are:\n10 bed\n10 chair\n"
    );
}

#[rstest]
fn given_empty_tree_when_deep_cloning_then_clone_is_empty() {
    let tree = PartTree::new();
    let clone = tree.deep_clone();
    assert!(clone.is_empty());
    assert_eq!(clone.report_subtree("anything"), "");
    assert!(clone.node_ids().is_empty());
}

#[rstest]
#[case::single_pair(&[("a", "b", 1)])]
#[case::chain(&[("a", "b", 1), ("b", "c", 2), ("c", "d", 3), ("d", "e", 4)])]
#[case::wide(&[("a", "b", 5), ("a", "c", 4), ("a", "d", 3), ("a", "e", 2), ("a", "f", 1)])]
#[case::duplicates(&[("a", "b", 1), ("a", "b", 1), ("b", "c", 7)])]
fn given_built_tree_when_deep_cloning_then_round_trips(#[case] records: &[(&str, &str, u64)]) {
    let tree = PartTree::new();
    for (parent, child, quantity) in records {
        tree.insert(parent, child, *quantity);
    }
    let clone = tree.deep_clone();
    assert_eq!(clone.full_report(), tree.full_report());
    assert!(id_set(&clone).is_disjoint(&id_set(&tree)));
    assert_eq!(clone.len(), tree.len());
}

// ============================================================
// Concurrent traversal
// ============================================================

#[rstest]
fn given_source_and_clone_when_traversed_on_threads_then_results_match(hospital: PartTree) {
    let clone = hospital.deep_clone();

    let (source_walk, clone_walk) = thread::scope(|s| {
        let source = s.spawn(|| (hospital.node_ids(), hospital.full_report()));
        let copy = s.spawn(|| (clone.node_ids(), clone.full_report()));
        (source.join().unwrap(), copy.join().unwrap())
    });

    assert_eq!(source_walk.1, clone_walk.1);
    for (a, b) in source_walk.0.iter().zip(clone_walk.0.iter()) {
        assert_ne!(a, b);
    }
}

#[rstest]
fn given_clone_moved_to_thread_when_traversed_then_content_matches(hospital: PartTree) {
    let clone = hospital.deep_clone();
    let expected = hospital.full_report();
    let handle = thread::spawn(move || clone.full_report());
    assert_eq!(handle.join().unwrap(), expected);
}
