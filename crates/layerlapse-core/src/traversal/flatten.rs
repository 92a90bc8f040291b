use serde::Serialize;

use crate::model::{LayerId, LayerNode};

/// A leaf layer at its place in the flattened paint order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatLeaf {
    /// Zero-based index in the flattened sequence
    pub position: usize,

    pub id: LayerId,

    pub name: String,

    /// Number of enclosing groups (0 for root-level leaves)
    pub depth: usize,

    /// Slash-joined names of the enclosing groups and the leaf itself
    pub path: String,

    /// False if any enclosing group is hidden; such a leaf never renders
    pub ancestors_visible: bool,
}

struct Frame<'a> {
    nodes: std::slice::Iter<'a, LayerNode>,
    prefix: String,
    depth: usize,
    visible: bool,
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", prefix, name)
    }
}

/// Flatten a layer tree into paint order
///
/// Walks the tree depth-first in pre-order, top to bottom, descending into
/// every group at its position. Only leaves are emitted; a group is replaced
/// by its descendants and an empty group contributes nothing. Leaves under a
/// hidden group are still emitted, marked with `ancestors_visible == false`.
///
/// The walk uses an explicit stack, so nesting depth is bounded only by
/// memory.
///
/// # Arguments
/// * `roots` - Root nodes of the document, top to bottom
///
/// # Returns
/// Leaves in paint order, with `position` equal to their index
pub fn flatten_leaves(roots: &[LayerNode]) -> Vec<FlatLeaf> {
    let mut leaves = Vec::new();
    let mut stack = vec![Frame {
        nodes: roots.iter(),
        prefix: String::new(),
        depth: 0,
        visible: true,
    }];

    while let Some(frame) = stack.last_mut() {
        let Some(node) = frame.nodes.next() else {
            stack.pop();
            continue;
        };

        match node {
            LayerNode::Leaf(leaf) => {
                let path = join_path(&frame.prefix, &leaf.name);
                leaves.push(FlatLeaf {
                    position: leaves.len(),
                    id: leaf.id,
                    name: leaf.name.clone(),
                    depth: frame.depth,
                    path,
                    ancestors_visible: frame.visible,
                });
            }
            LayerNode::Group(group) => {
                let child = Frame {
                    nodes: group.children.iter(),
                    prefix: join_path(&frame.prefix, &group.name),
                    depth: frame.depth + 1,
                    visible: frame.visible && group.visible,
                };
                stack.push(child);
            }
        }
    }

    leaves
}
