#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::open;
use layerlapse_core::host::{DocumentHost, MemoryNode};
use layerlapse_core::model::LayerId;
use layerlapse_core::traversal::flatten_leaves;
use layerlapse_core::visibility::{VisibilityGuard, VisibilitySnapshot};

fn mixed_layers() -> Vec<MemoryNode> {
    vec![
        MemoryNode::leaf(1, "sketch", false),
        MemoryNode::group(
            "ink",
            vec![
                MemoryNode::leaf(2, "lines", true),
                MemoryNode::group("fx", vec![MemoryNode::leaf(3, "glow", false)]),
            ],
        ),
        MemoryNode::leaf(4, "paper", true),
    ]
}

#[test]
fn test_capture_then_restore_is_a_no_op() {
    let mut host = open(10, 10, mixed_layers());
    let before = host.visibility().clone();
    let leaves = flatten_leaves(host.tree());

    let snapshot = VisibilitySnapshot::capture(&host, &leaves);
    let report = snapshot.restore(&mut host);

    assert_eq!(host.visibility(), &before);
    assert_eq!(report.restored, 4);
    assert!(report.is_complete());
}

#[test]
fn test_restore_undoes_arbitrary_mutation() {
    let mut host = open(10, 10, mixed_layers());
    let before = host.visibility().clone();
    let leaves = flatten_leaves(host.tree());
    let snapshot = VisibilitySnapshot::capture(&host, &leaves);

    for leaf in &leaves {
        let flipped = !host.is_visible(leaf.id).unwrap();
        host.set_visible(leaf.id, flipped).unwrap();
    }
    snapshot.restore(&mut host);

    assert_eq!(host.visibility(), &before);
}

#[test]
fn test_visible_leaves_keep_paint_order() {
    let host = open(10, 10, mixed_layers());
    let leaves = flatten_leaves(host.tree());
    let snapshot = VisibilitySnapshot::capture(&host, &leaves);

    let visible: Vec<LayerId> = snapshot
        .visible_leaves(&leaves)
        .iter()
        .map(|l| l.id)
        .collect();

    assert_eq!(visible, vec![LayerId(2), LayerId(4)]);
}

#[test]
fn test_restore_failure_does_not_stop_other_leaves() {
    let mut host = open(10, 10, mixed_layers()).fail_visibility_set(LayerId(2));
    let leaves = flatten_leaves(host.tree());
    let snapshot = VisibilitySnapshot::capture(&host, &leaves);
    host.set_visible(LayerId(4), false).unwrap();

    let report = snapshot.restore(&mut host);

    assert_eq!(report.failed, vec![LayerId(2)]);
    assert_eq!(report.restored, 3);
    assert_eq!(host.visibility_of(LayerId(4)), Some(true));
}

#[test]
fn test_guard_restores_when_panic_unwinds() {
    let mut host = open(10, 10, mixed_layers());
    let before = host.visibility().clone();
    let leaves = flatten_leaves(host.tree());

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let mut guard = VisibilityGuard::acquire(&mut host, &leaves);
        guard.host_mut().set_visible(LayerId(4), false).unwrap();
        panic!("export body panicked");
    }));

    assert!(result.is_err());
    assert_eq!(host.visibility(), &before);
}
