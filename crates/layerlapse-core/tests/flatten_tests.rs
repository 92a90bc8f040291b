#![allow(clippy::unwrap_used, clippy::expect_used)]

use layerlapse_core::model::{LayerId, LayerNode};
use layerlapse_core::traversal::flatten_leaves;
use proptest::prelude::*;

fn reference_order(nodes: &[LayerNode], out: &mut Vec<LayerId>) {
    for node in nodes {
        match node {
            LayerNode::Leaf(leaf) => out.push(leaf.id),
            LayerNode::Group(group) => reference_order(&group.children, out),
        }
    }
}

fn layer_tree() -> impl Strategy<Value = Vec<LayerNode>> {
    let leaf = (0u64..1000, "[a-z]{1,6}").prop_map(|(id, name)| LayerNode::leaf(id, name));
    let node = leaf.prop_recursive(6, 64, 5, |inner| {
        ("[A-Z]{1,6}", prop::collection::vec(inner, 0..5))
            .prop_map(|(name, children)| LayerNode::group(name, children))
    });
    prop::collection::vec(node, 0..6)
}

#[test]
fn test_root_only_tree_keeps_root_order() {
    let roots = vec![
        LayerNode::leaf(30, "top"),
        LayerNode::leaf(10, "middle"),
        LayerNode::leaf(20, "bottom"),
    ];

    let ids: Vec<LayerId> = flatten_leaves(&roots).iter().map(|l| l.id).collect();

    assert_eq!(ids, vec![LayerId(30), LayerId(10), LayerId(20)]);
}

#[test]
fn test_nested_groups_flatten_in_pre_order() {
    let roots = vec![
        LayerNode::leaf(1, "A"),
        LayerNode::group(
            "G1",
            vec![
                LayerNode::leaf(2, "B"),
                LayerNode::group("G2", vec![LayerNode::leaf(3, "C")]),
                LayerNode::leaf(4, "D"),
            ],
        ),
        LayerNode::group("empty", vec![]),
        LayerNode::leaf(5, "E"),
    ];

    let leaves = flatten_leaves(&roots);

    let ids: Vec<u64> = leaves.iter().map(|l| l.id.0).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    assert_eq!(leaves[2].path, "G1/G2/C");
    assert_eq!(leaves[2].depth, 2);
    assert_eq!(leaves[4].depth, 0);
}

proptest! {
    #[test]
    fn prop_flatten_matches_recursive_pre_order(roots in layer_tree()) {
        let mut expected = Vec::new();
        reference_order(&roots, &mut expected);

        let leaves = flatten_leaves(&roots);
        let ids: Vec<LayerId> = leaves.iter().map(|l| l.id).collect();

        prop_assert_eq!(ids, expected);
    }

    #[test]
    fn prop_positions_are_contiguous(roots in layer_tree()) {
        let leaves = flatten_leaves(&roots);
        for (i, leaf) in leaves.iter().enumerate() {
            prop_assert_eq!(leaf.position, i);
        }
    }

    #[test]
    fn prop_flatten_is_deterministic(roots in layer_tree()) {
        prop_assert_eq!(flatten_leaves(&roots), flatten_leaves(&roots));
    }

    #[test]
    fn prop_path_depth_matches_segments(roots in layer_tree()) {
        for leaf in flatten_leaves(&roots) {
            let segments = leaf.path.split('/').count();
            prop_assert_eq!(segments, leaf.depth + 1);
        }
    }
}
