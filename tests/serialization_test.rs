//! Export, JSON serialization, and restore round-trips.

use rstest::{fixture, rstest};
use serde_json::Value;

use nested_set::{NestedNode, NestedSet, Node};

#[fixture]
fn small_tree() -> NestedSet<Node> {
    let tree: NestedSet<Node> = NestedSet::with_root(Node::new("root"));
    let n1 = tree.insert(Node::new("n1"), None).unwrap();
    tree.insert(Node::new("n2"), None).unwrap();
    tree.insert(Node::new("n3"), Some(n1)).unwrap();
    tree
}

#[rstest]
fn given_tree_when_serializing_then_nodes_ordered_by_left(small_tree: NestedSet<Node>) {
    let json = small_tree.to_json_pretty().unwrap();
    let value: Value = serde_json::from_str(&json).unwrap();

    let names: Vec<&str> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["node_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["root", "n1", "n3", "n2"]);

    let lefts: Vec<i64> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["left"].as_i64().unwrap())
        .collect();
    assert!(lefts.windows(2).all(|w| w[0] < w[1]));
}

#[rstest]
fn given_tree_when_serializing_then_wire_fields_present(small_tree: NestedSet<Node>) {
    let json = small_tree.to_json_pretty().unwrap();
    let value: Value = serde_json::from_str(&json).unwrap();

    let root = &value.as_array().unwrap()[0];
    assert_eq!(root["id"], 0);
    assert_eq!(root["node_name"], "root");
    assert_eq!(root["level"], 0);
    assert_eq!(root["left"], 0);
    assert_eq!(root["right"], 7);
}

#[rstest]
fn given_export_when_restoring_then_tree_is_equivalent(small_tree: NestedSet<Node>) {
    let exported = small_tree.export();

    let restored: NestedSet<Node> = NestedSet::restore(exported.clone()).unwrap();
    assert_eq!(restored.export(), exported);
    assert_eq!(restored.len(), small_tree.len());

    // Queries behave on the restored store.
    let n3 = restored.find_by_id(3).expect("n3 restored");
    let n1 = restored.find_by_id(1).expect("n1 restored");
    assert_eq!(restored.parent(n3), Some(n1));
    assert_eq!(restored.parent(n1), Some(restored.root()));
}

#[rstest]
fn given_restored_tree_when_inserting_then_ids_continue(small_tree: NestedSet<Node>) {
    let restored: NestedSet<Node> = NestedSet::restore(small_tree.export()).unwrap();

    let n4 = restored.insert(Node::new("n4"), None).unwrap();
    assert_eq!(restored.with_node(n4, |n| n.id()), Some(4));
}

#[rstest]
fn given_json_round_trip_when_replaying_inserts_then_bounds_rebuild(
    small_tree: NestedSet<Node>,
) {
    // The untrusted import path: replay exported nodes through insert in
    // pre-order, re-deriving bounds instead of trusting them.
    let json = small_tree.to_json_pretty().unwrap();
    let exported: Vec<Node> = serde_json::from_str(&json).unwrap();

    let rebuilt: NestedSet<Node> = NestedSet::with_root(exported[0].clone());
    for node in &exported[1..] {
        let parent = exported
            .iter()
            .filter(|p| p.left() < node.left() && p.right() > node.right())
            .min_by_key(|p| p.right() - p.left())
            .map(|p| rebuilt.find_by_id(p.id()).unwrap());
        rebuilt.insert(node.clone(), parent).unwrap();
    }

    // Same shape, same pre-order bounds.
    let got: Vec<(String, i64, i64, i64)> = rebuilt
        .export()
        .iter()
        .map(|n| (n.name().to_string(), n.level(), n.left(), n.right()))
        .collect();
    let want: Vec<(String, i64, i64, i64)> = small_tree
        .export()
        .iter()
        .map(|n| (n.name().to_string(), n.level(), n.left(), n.right()))
        .collect();
    assert_eq!(got, want);
}
