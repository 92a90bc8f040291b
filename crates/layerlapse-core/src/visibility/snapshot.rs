use serde::Serialize;

use crate::host::DocumentHost;
use crate::model::LayerId;
use crate::traversal::FlatLeaf;

/// Captured visibility of one leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SnapshotEntry {
    /// Position of the leaf in the flattened paint order
    pub position: usize,
    pub id: LayerId,
    /// `None` when the host could not report the flag
    pub visible: Option<bool>,
}

/// Visibility of every leaf at the moment an export begins
///
/// Captured once before any mutation and consumed once at teardown. A leaf
/// whose visibility could not be read has no original value: it is left out
/// of the hide order and skipped on restore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisibilitySnapshot {
    entries: Vec<SnapshotEntry>,
}

/// Outcome of a restoration pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RestoreReport {
    /// Leaves whose flag was written back
    pub restored: usize,
    /// Leaves whose write failed
    pub failed: Vec<LayerId>,
    /// Leaves skipped because their original value was unknown
    pub skipped: usize,
}

impl RestoreReport {
    /// True if every known leaf was written back
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

impl VisibilitySnapshot {
    /// Read the visibility of every leaf
    ///
    /// Every leaf is read even if earlier reads fail; failures are logged
    /// and recorded as unknown.
    pub fn capture<H>(host: &H, leaves: &[FlatLeaf]) -> Self
    where
        H: DocumentHost + ?Sized,
    {
        let entries = leaves
            .iter()
            .map(|leaf| {
                let visible = match host.is_visible(leaf.id) {
                    Ok(visible) => Some(visible),
                    Err(err) => {
                        tracing::warn!(
                            layer_id = %leaf.id,
                            layer_path = %leaf.path,
                            error = %err,
                            "visibility unreadable, leaf excluded from export"
                        );
                        None
                    }
                };
                SnapshotEntry {
                    position: leaf.position,
                    id: leaf.id,
                    visible,
                }
            })
            .collect();

        Self { entries }
    }

    pub fn entries(&self) -> &[SnapshotEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Captured flag of the leaf at `position`
    pub fn visibility_at(&self, position: usize) -> Option<bool> {
        // Entries captured from `flatten_leaves` output are indexed by position.
        self.entries
            .get(position)
            .filter(|entry| entry.position == position)
            .or_else(|| self.entries.iter().find(|entry| entry.position == position))
            .and_then(|entry| entry.visible)
    }

    /// Number of leaves whose visibility could not be read
    pub fn unknown_count(&self) -> usize {
        self.entries.iter().filter(|e| e.visible.is_none()).count()
    }

    /// The leaves that actually render, in paint order
    ///
    /// A leaf renders when it was captured as visible and every enclosing
    /// group is visible.
    pub fn visible_leaves<'a>(&self, leaves: &'a [FlatLeaf]) -> Vec<&'a FlatLeaf> {
        leaves
            .iter()
            .filter(|leaf| leaf.ancestors_visible)
            .filter(|leaf| self.visibility_at(leaf.position) == Some(true))
            .collect()
    }

    /// Write every captured flag back to the host
    ///
    /// Each write is attempted independently: a failure on one leaf is
    /// logged and recorded, and the remaining leaves are still restored.
    pub fn restore<H>(&self, host: &mut H) -> RestoreReport
    where
        H: DocumentHost + ?Sized,
    {
        let mut report = RestoreReport::default();

        for entry in &self.entries {
            let Some(visible) = entry.visible else {
                report.skipped += 1;
                continue;
            };

            match host.set_visible(entry.id, visible) {
                Ok(()) => report.restored += 1,
                Err(err) => {
                    tracing::warn!(
                        layer_id = %entry.id,
                        visible,
                        error = %err,
                        "failed to restore layer visibility"
                    );
                    report.failed.push(entry.id);
                }
            }
        }

        tracing::debug!(
            restored = report.restored,
            failed = report.failed.len(),
            skipped = report.skipped,
            "visibility restore pass finished"
        );

        report
    }
}
