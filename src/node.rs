use std::fmt;

use serde::{Deserialize, Serialize};

/// Handle to a node owned by a [`NestedSet`](crate::NestedSet).
///
/// Handles are generational arena indices: equality means "same logical
/// node", and a handle to a deleted node fails the membership check instead
/// of aliasing a later insertion.
pub type NodeId = generational_arena::Index;

/// Capability set the store requires from its node payloads.
///
/// The store reads and writes exactly these fields and nothing else; any
/// caller-side payload becomes tree-storable by exposing them. `left` and
/// `right` are the nested-set bounds (`left < right` between operations,
/// `right = left + 1` for a leaf), `level` is the depth with the root at 0,
/// and `id` is a store-assigned identifier used by
/// [`find_by_id`](crate::NestedSet::find_by_id).
pub trait NestedNode {
    fn id(&self) -> i64;
    fn level(&self) -> i64;
    fn left(&self) -> i64;
    fn right(&self) -> i64;

    fn set_id(&mut self, id: i64);
    fn set_level(&mut self, level: i64);
    fn set_left(&mut self, left: i64);
    fn set_right(&mut self, right: i64);
}

/// Generic ready-made node payload: a name plus the nested-set fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    id: i64,
    #[serde(rename = "node_name")]
    name: String,
    level: i64,
    left: i64,
    right: i64,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }
}

impl NestedNode for Node {
    fn id(&self) -> i64 {
        self.id
    }

    fn level(&self) -> i64 {
        self.level
    }

    fn left(&self) -> i64 {
        self.left
    }

    fn right(&self) -> i64 {
        self.right
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn set_level(&mut self, level: i64) {
        self.level = level;
    }

    fn set_left(&mut self, left: i64) {
        self.left = left;
    }

    fn set_right(&mut self, right: i64) {
        self.right = right;
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} lvl:{} left:{} right:{}",
            self.name, self.level, self.left, self.right
        )
    }
}
