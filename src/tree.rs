use generational_arena::Arena;
use parking_lot::Mutex;
use serde::ser::{Serialize, SerializeSeq, Serializer};
use tracing::instrument;

use crate::errors::{TreeError, TreeResult};
use crate::node::{NestedNode, NodeId};

/// Thread-safe nested-set tree store.
///
/// Nodes live in a generational arena and are addressed by [`NodeId`]
/// handles. Every node carries `left`/`right` interval bounds such that a
/// descendant's interval is strictly contained in its ancestor's and sibling
/// subtrees occupy disjoint ranges, which makes ancestry and subtree
/// queries pure range comparisons. The price is paid on mutation: insert,
/// delete and move renumber every affected node, each O(n).
///
/// All state sits behind a single mutex, so a `NestedSet` can be shared via
/// `Arc` and every operation is atomic with respect to the others. Node
/// fields are reachable only through the store, never through a caller-held
/// reference, so they cannot change outside the lock.
#[derive(Debug)]
pub struct NestedSet<N: NestedNode> {
    inner: Mutex<TreeState<N>>,
}

#[derive(Debug)]
struct TreeState<N> {
    arena: Arena<N>,
    root: NodeId,
    next_id: i64,
}

impl<N: NestedNode + Default> NestedSet<N> {
    /// Creates a store with a default-constructed root node (`level = 0`,
    /// `left = 0`, `right = 1`, `id = 0`).
    pub fn new() -> Self {
        Self::with_root(N::default())
    }
}

impl<N: NestedNode + Default> Default for NestedSet<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: NestedNode> NestedSet<N> {
    /// Creates a store using `root` as the root payload. Its nested-set
    /// fields are overwritten (`level = 0`, `left = 0`, `right = 1`,
    /// `id = 0`).
    pub fn with_root(mut root: N) -> Self {
        root.set_id(0);
        root.set_level(0);
        root.set_left(0);
        root.set_right(1);

        let mut arena = Arena::new();
        let root = arena.insert(root);

        Self {
            inner: Mutex::new(TreeState {
                arena,
                root,
                next_id: 0,
            }),
        }
    }

    /// Handle of the root node.
    pub fn root(&self) -> NodeId {
        self.inner.lock().root
    }

    /// Number of nodes in the tree, root included. Never less than 1.
    pub fn len(&self) -> usize {
        self.inner.lock().arena.len()
    }

    /// A nested set always contains at least its root.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether `node` is a live member of this tree.
    #[instrument(level = "trace", skip(self))]
    pub fn contains(&self, node: NodeId) -> bool {
        self.inner.lock().arena.contains(node)
    }

    /// Inserts `node` as the last child of `parent` (`None` attaches under
    /// the root) and returns its handle.
    ///
    /// The node becomes a leaf at `parent.right`; every bound at or beyond
    /// the insertion point shifts right by 2 to open the gap. The store
    /// assigns the node a fresh monotonically increasing id.
    #[instrument(level = "debug", skip(self, node))]
    pub fn insert(&self, mut node: N, parent: Option<NodeId>) -> TreeResult<NodeId> {
        let mut inner = self.inner.lock();

        let parent_idx = match parent {
            Some(p) => {
                if !inner.arena.contains(p) {
                    return Err(TreeError::ParentNotFound(p));
                }
                p
            }
            None => inner.root,
        };

        let (parent_level, right) = {
            let p = &inner.arena[parent_idx];
            (p.level(), p.right())
        };

        inner.next_id += 1;
        node.set_id(inner.next_id);
        node.set_level(parent_level + 1);
        node.set_left(right);
        node.set_right(right + 1);

        for (_, n) in inner.arena.iter_mut() {
            if n.right() >= right {
                n.set_right(n.right() + 2);
                if n.left() > right {
                    n.set_left(n.left() + 2);
                }
            }
        }

        Ok(inner.arena.insert(node))
    }

    /// Deletes `node` and its entire subtree, returning the removed
    /// payloads in pre-order (ascending `left`).
    ///
    /// Deletion cascades: callers wanting to keep descendants must
    /// [`move_branch`](Self::move_branch) them out first. Survivors beyond
    /// the removed range shift left by the subtree width to close the gap.
    #[instrument(level = "debug", skip(self))]
    pub fn delete(&self, node: NodeId) -> TreeResult<Vec<N>> {
        let mut inner = self.inner.lock();

        if node == inner.root {
            return Err(TreeError::CannotDeleteRoot);
        }
        if !inner.arena.contains(node) {
            return Err(TreeError::NodeNotFound(node));
        }

        let (left, right) = {
            let n = &inner.arena[node];
            (n.left(), n.right())
        };
        let width = right - left + 1;

        let doomed = inner.branch_ids(node);
        let mut removed: Vec<N> = doomed
            .into_iter()
            .filter_map(|idx| inner.arena.remove(idx))
            .collect();
        removed.sort_by_key(|n| n.left());

        for (_, n) in inner.arena.iter_mut() {
            if n.right() > right {
                n.set_right(n.right() - width);
            }
            if n.left() > left {
                n.set_left(n.left() - width);
            }
        }

        Ok(removed)
    }

    /// Relocates `node` and its subtree to become a child of `parent`
    /// (`None` attaches under the root).
    ///
    /// Two phases: first the nodes between the vacated range and the
    /// destination shift sideways by the subtree width (direction depends
    /// on whether the destination precedes or follows the source), then the
    /// moving subtree — captured before the shift — is translated by the
    /// net bound delta and its levels adjusted. Handles stay valid across
    /// the move.
    ///
    /// Moving a node to its current parent is rejected with
    /// [`TreeError::SameParentMove`] rather than treated as a no-op, since
    /// reordering among siblings is unsupported.
    #[instrument(level = "debug", skip(self))]
    pub fn move_branch(&self, node: NodeId, parent: Option<NodeId>) -> TreeResult<()> {
        let mut inner = self.inner.lock();

        if node == inner.root {
            return Err(TreeError::CannotMoveRoot);
        }
        if !inner.arena.contains(node) {
            return Err(TreeError::NodeNotFound(node));
        }

        let parent_idx = match parent {
            Some(p) => {
                if !inner.arena.contains(p) {
                    return Err(TreeError::ParentNotFound(p));
                }
                p
            }
            None => inner.root,
        };

        let (level, left, right) = {
            let n = &inner.arena[node];
            (n.level(), n.left(), n.right())
        };
        let (parent_level, parent_left, parent_right) = {
            let p = &inner.arena[parent_idx];
            (p.level(), p.left(), p.right())
        };

        // Destination inside the moving range would nest the branch in itself.
        if parent_left >= left && parent_right <= right {
            return Err(TreeError::MoveIntoOwnBranch);
        }

        let current_parent = inner
            .parent_of(node)
            .ok_or(TreeError::StructureCorrupted(node))?;
        if current_parent == parent_idx {
            return Err(TreeError::SameParentMove);
        }

        let right_near = parent_right - 1;
        let skew_level = parent_level - level + 1;
        let skew_tree = right - left + 1;

        let moving = inner.branch_ids(node);

        let skew_edit = if right_near < right {
            // Destination precedes the source: everything strictly between
            // the insertion point and the vacating range shifts right.
            for (_, n) in inner.arena.iter_mut() {
                if n.right() < left && n.right() > right_near {
                    n.set_right(n.right() + skew_tree);
                }
                if n.left() < left && n.left() > right_near {
                    n.set_left(n.left() + skew_tree);
                }
            }
            right_near - left + 1
        } else {
            // Destination follows the source: the span between them shifts
            // left to close the vacated gap.
            for (_, n) in inner.arena.iter_mut() {
                if n.right() > right && n.right() <= right_near {
                    n.set_right(n.right() - skew_tree);
                }
                if n.left() > right && n.left() <= right_near {
                    n.set_left(n.left() - skew_tree);
                }
            }
            right_near - left + 1 - skew_tree
        };

        for idx in moving {
            let n = &mut inner.arena[idx];
            n.set_left(n.left() + skew_edit);
            n.set_right(n.right() + skew_edit);
            n.set_level(n.level() + skew_level);
        }

        Ok(())
    }

    /// Handle of `node`'s immediate parent, `None` for the root or a
    /// non-member.
    #[instrument(level = "trace", skip(self))]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        let inner = self.inner.lock();
        if !inner.arena.contains(node) {
            return None;
        }
        inner.parent_of(node)
    }

    /// Looks up a node by its store-assigned identifier. Linear scan.
    #[instrument(level = "trace", skip(self))]
    pub fn find_by_id(&self, id: i64) -> Option<NodeId> {
        let inner = self.inner.lock();
        inner
            .arena
            .iter()
            .find(|(_, n)| n.id() == id)
            .map(|(idx, _)| idx)
    }

    /// Returns `node` and its entire subtree in pre-order (ascending
    /// `left`). `None` yields the whole tree; a non-member yields an empty
    /// vector.
    #[instrument(level = "trace", skip(self))]
    pub fn branch(&self, node: Option<NodeId>) -> Vec<NodeId> {
        let inner = self.inner.lock();
        let node = match node {
            Some(idx) => {
                if !inner.arena.contains(idx) {
                    return Vec::new();
                }
                idx
            }
            None => inner.root,
        };
        inner.branch_ids(node)
    }

    /// Runs `f` against the payload of `node` under the store lock.
    pub fn with_node<R>(&self, node: NodeId, f: impl FnOnce(&N) -> R) -> Option<R> {
        let inner = self.inner.lock();
        inner.arena.get(node).map(f)
    }
}

impl<N: NestedNode + Clone> NestedSet<N> {
    /// Clone of `node`'s payload, `None` for a non-member.
    #[instrument(level = "trace", skip(self))]
    pub fn get(&self, node: NodeId) -> Option<N> {
        self.inner.lock().arena.get(node).cloned()
    }

    /// Snapshot of all payloads in pre-order (ascending `left`).
    #[instrument(level = "trace", skip(self))]
    pub fn export(&self) -> Vec<N> {
        let inner = self.inner.lock();
        let mut nodes: Vec<N> = inner.arena.iter().map(|(_, n)| n.clone()).collect();
        nodes.sort_by_key(|n| n.left());
        nodes
    }

    /// Rebuilds a store from previously exported payloads, restoring the
    /// raw nested-set fields.
    ///
    /// The caller vouches for the invariant; only structural sanity is
    /// checked (exactly one `level = 0` node, `left < right` everywhere).
    /// For untrusted input, replay the nodes through
    /// [`insert`](Self::insert) in pre-order instead.
    pub fn restore(nodes: Vec<N>) -> TreeResult<Self> {
        let mut roots = nodes.iter().filter(|n| n.level() == 0);
        if roots.next().is_none() {
            return Err(TreeError::InvalidRestore("no level-0 root node"));
        }
        if roots.next().is_some() {
            return Err(TreeError::InvalidRestore("more than one level-0 node"));
        }
        if nodes.iter().any(|n| n.left() >= n.right()) {
            return Err(TreeError::InvalidRestore("node with left >= right"));
        }

        let next_id = nodes.iter().map(|n| n.id()).max().unwrap_or(0);
        let mut arena = Arena::with_capacity(nodes.len());
        let mut root = None;
        for node in nodes {
            let is_root = node.level() == 0;
            let idx = arena.insert(node);
            if is_root {
                root = Some(idx);
            }
        }
        let root = root.ok_or(TreeError::InvalidRestore("no level-0 root node"))?;

        Ok(Self {
            inner: Mutex::new(TreeState {
                arena,
                root,
                next_id,
            }),
        })
    }
}

impl<N: NestedNode + Serialize> NestedSet<N> {
    /// Pretty-printed JSON of the node collection, ordered by `left`.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Serializes the node collection as a sequence ordered by ascending
/// `left`, i.e. pre-order.
impl<N: NestedNode + Serialize> Serialize for NestedSet<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let inner = self.inner.lock();
        let mut nodes: Vec<&N> = inner.arena.iter().map(|(_, n)| n).collect();
        nodes.sort_by_key(|n| n.left());

        let mut seq = serializer.serialize_seq(Some(nodes.len()))?;
        for node in nodes {
            seq.serialize_element(node)?;
        }
        seq.end()
    }
}

impl<N: NestedNode> TreeState<N> {
    /// Immediate parent: the node one level up whose range contains
    /// `node`'s range. Only the root has none.
    fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        let target = &self.arena[node];
        let (left, right, level) = (target.left(), target.right(), target.level());
        self.arena
            .iter()
            .find(|(_, n)| n.left() <= left && n.right() >= right && n.level() == level - 1)
            .map(|(idx, _)| idx)
    }

    /// `node` plus its full subtree, sorted by ascending `left`.
    fn branch_ids(&self, node: NodeId) -> Vec<NodeId> {
        let (left, right) = {
            let n = &self.arena[node];
            (n.left(), n.right())
        };
        let mut ids: Vec<(i64, NodeId)> = self
            .arena
            .iter()
            .filter(|(_, n)| n.left() >= left && n.right() <= right)
            .map(|(idx, n)| (n.left(), idx))
            .collect();
        ids.sort_by_key(|(l, _)| *l);
        ids.into_iter().map(|(_, idx)| idx).collect()
    }
}
