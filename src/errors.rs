use thiserror::Error;

use crate::node::NodeId;

/// Errors reported by [`NestedSet`](crate::NestedSet) operations.
///
/// Mutations validate every precondition before touching the tree, so a
/// returned error always means the store is unchanged.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    #[error("node {0:?} not found in tree")]
    NodeNotFound(NodeId),

    #[error("parent node {0:?} not found in tree")]
    ParentNotFound(NodeId),

    #[error("the root node cannot be deleted")]
    CannotDeleteRoot,

    #[error("the root node cannot be moved")]
    CannotMoveRoot,

    #[error("cannot move a branch to a node within itself")]
    MoveIntoOwnBranch,

    #[error("moving within the same parent is not supported")]
    SameParentMove,

    #[error("tree structure corrupted: no parent resolvable for node {0:?}")]
    StructureCorrupted(NodeId),

    #[error("invalid node set for restore: {0}")]
    InvalidRestore(&'static str),
}

pub type TreeResult<T> = Result<T, TreeError>;
