//! Thread-safe in-memory nested-set tree.
//!
//! Each node carries `left`/`right` interval bounds; a descendant's interval
//! is strictly contained in its ancestor's, so ancestry and subtree queries
//! are range comparisons instead of pointer chasing. Mutations (insert,
//! delete, move) renumber the affected bounds and are serialized through a
//! single store-owned lock.
//!
//! The store is generic over its payload: anything implementing
//! [`NestedNode`] can live in the tree, and the store touches nothing beyond
//! that capability set. [`Node`] is a ready-made payload carrying a name.
//!
//! ```
//! use nested_set::{NestedSet, Node, TreeRender};
//!
//! let tree: NestedSet<Node> = NestedSet::with_root(Node::new("root"));
//!
//! let n1 = tree.insert(Node::new("n1"), None).unwrap();
//! let n2 = tree.insert(Node::new("n2"), None).unwrap();
//! let n3 = tree.insert(Node::new("n3"), Some(n1)).unwrap();
//!
//! tree.move_branch(n3, Some(n2)).unwrap();
//!
//! for id in tree.branch(None) {
//!     if let Some(line) = tree.with_node(id, |n| n.to_string()) {
//!         println!("{line}");
//!     }
//! }
//! println!("{}", tree.to_tree_string());
//! ```

pub mod display;
pub mod errors;
pub mod node;
pub mod tree;

pub use display::TreeRender;
pub use errors::{TreeError, TreeResult};
pub use node::{NestedNode, Node, NodeId};
pub use tree::NestedSet;
