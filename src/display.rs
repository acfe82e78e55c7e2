/*
Rendering lives behind a trait rather than an inherent impl so that callers
with their own payload types can provide a different rendering for the same
store type (and to keep termtree out of the core module).
 */
use std::fmt;

use termtree::Tree;

use crate::node::NestedNode;
use crate::tree::NestedSet;

pub trait TreeRender {
    fn to_tree_string(&self) -> Tree<String>;
}

impl<N> TreeRender for NestedSet<N>
where
    N: NestedNode + Clone + fmt::Display,
{
    /// Rebuilds the hierarchy from the pre-order export: each node hangs
    /// off the nearest preceding node with a smaller level.
    fn to_tree_string(&self) -> Tree<String> {
        let nodes = self.export();

        let mut stack: Vec<(i64, Tree<String>)> =
            vec![(nodes[0].level(), Tree::new(nodes[0].to_string()))];

        for node in &nodes[1..] {
            while stack.last().is_some_and(|(level, _)| *level >= node.level()) {
                let (_, done) = stack.pop().unwrap();
                stack.last_mut().unwrap().1.push(done);
            }
            stack.push((node.level(), Tree::new(node.to_string())));
        }

        while stack.len() > 1 {
            let (_, done) = stack.pop().unwrap();
            stack.last_mut().unwrap().1.push(done);
        }

        let (_, tree) = stack.pop().unwrap();
        tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    #[test]
    fn test_render_nests_children_under_parents() {
        let tree: NestedSet<Node> = NestedSet::with_root(Node::new("root"));
        let a = tree.insert(Node::new("a"), None).unwrap();
        tree.insert(Node::new("b"), None).unwrap();
        tree.insert(Node::new("c"), Some(a)).unwrap();

        let rendered = tree.to_tree_string().to_string();

        assert!(rendered.starts_with("root"));
        // c is indented one level deeper than a and b
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].contains("a lvl:1"));
        assert!(lines[2].contains("c lvl:2"));
        assert!(lines[3].contains("b lvl:1"));
    }

    #[test]
    fn test_render_root_only() {
        let tree: NestedSet<Node> = NestedSet::with_root(Node::new("root"));
        let rendered = tree.to_tree_string().to_string();
        assert_eq!(rendered.trim_end(), "root lvl:0 left:0 right:1");
    }
}
