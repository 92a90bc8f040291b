//! Build-up export: hide one leaf, write one frame, repeat.
//!
//! ## Algorithm
//!
//! 1. Flatten the layer tree into paint order
//! 2. Capture visibility; the visible leaves form the hide order
//! 3. Normalize the canvas once (failures are non-fatal)
//! 4. Write frame 0 with the document untouched
//! 5. For each visible leaf but the last: hide it, write the next frame
//! 6. Restore every captured visibility flag
//! 7. Optionally close the document without saving
//!
//! `N` visible leaves produce exactly `N` frames. The bottom-most visible
//! leaf is never hidden, so the last frame always shows it.
//!
//! Restoration in step 6 is owned by a [`VisibilityGuard`], so it also runs
//! when a frame write fails and the error is propagated.

use std::path::PathBuf;
use std::time::Instant;

use chrono::{DateTime, Utc};
use layerlapse_core_types::RunId;
use serde::Serialize;

use crate::config::ExportConfig;
use crate::errors::Result;
use crate::frames::{remove_frames, FrameIndex, FrameWriter};
use crate::host::DocumentHost;
use crate::model::LayerId;
use crate::normalize::{normalize_canvas, NormalizeOutcome};
use crate::traversal::flatten_leaves;
use crate::visibility::{RestoreReport, VisibilityGuard};
use crate::{log_op_end, log_op_error, log_op_start};

const OP_EXPORT: &str = "export_build_up";

/// How far an export got
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportPhase {
    Init,
    Normalized,
    FramesExported,
    Restored,
    Closed,
}

/// A leaf that could not be hidden; its frame shows it still visible
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HideFailure {
    pub layer_id: LayerId,
    pub layer_path: String,
    pub reason: String,
}

/// Summary of one export pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportReport {
    pub run_id: RunId,
    pub document: PathBuf,
    pub frame_dir: PathBuf,
    /// Written frames, in index order
    pub frames: Vec<PathBuf>,
    pub leaf_count: usize,
    pub visible_count: usize,
    /// Leaves whose visibility could not be read
    pub unreadable_count: usize,
    pub hide_failures: Vec<HideFailure>,
    /// `None` when the document was skipped
    pub normalize: Option<NormalizeOutcome>,
    pub restore: RestoreReport,
    pub stale_frames_removed: usize,
    /// True when the document had no leaves and nothing was done
    pub skipped: bool,
    pub closed: bool,
    pub phase: ExportPhase,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ExportReport {
    fn new(run_id: RunId, document: PathBuf, frame_dir: PathBuf) -> Self {
        let now = Utc::now();
        Self {
            run_id,
            document,
            frame_dir,
            frames: Vec::new(),
            leaf_count: 0,
            visible_count: 0,
            unreadable_count: 0,
            hide_failures: Vec::new(),
            normalize: None,
            restore: RestoreReport::default(),
            stale_frames_removed: 0,
            skipped: false,
            closed: false,
            phase: ExportPhase::Init,
            started_at: now,
            finished_at: now,
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

/// Export the build-up frame sequence of the host's active document
///
/// # Errors
/// * `NoActiveDocument` / `LayerTreeUnavailable` - Before any mutation
/// * `InvalidConfig` - If `config` fails validation, before any mutation
/// * `Io` - If stale frames could not be cleared, before any mutation
/// * `FrameWriteFailed` - After visibility has been restored
pub fn export_build_up<H>(host: &mut H, config: &ExportConfig) -> Result<ExportReport>
where
    H: DocumentHost + ?Sized,
{
    export_build_up_with_run(host, config, RunId::new())
}

/// [`export_build_up`] with a caller-supplied run id for log correlation
pub fn export_build_up_with_run<H>(
    host: &mut H,
    config: &ExportConfig,
    run_id: RunId,
) -> Result<ExportReport>
where
    H: DocumentHost + ?Sized,
{
    log_op_start!(OP_EXPORT, run_id = run_id.as_str());
    let start = Instant::now();

    let report = export_impl(host, config, &run_id).map_err(|e| {
        log_op_error!(
            OP_EXPORT,
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            run_id = run_id.as_str()
        );
        e
    })?;

    log_op_end!(
        OP_EXPORT,
        duration_ms = start.elapsed().as_millis() as u64,
        run_id = run_id.as_str(),
        leaf_count = report.leaf_count as u64,
        visible_count = report.visible_count as u64,
        frame_count = report.frames.len() as u64,
        skipped = report.skipped
    );

    Ok(report)
}

fn export_impl<H>(host: &mut H, config: &ExportConfig, run_id: &RunId) -> Result<ExportReport>
where
    H: DocumentHost + ?Sized,
{
    config.validate()?;
    let document = host.document_path()?;
    let tree = host.layer_tree()?;
    let leaves = flatten_leaves(&tree);

    let frame_dir = config.frame_dir(&document);
    let mut report = ExportReport::new(run_id.clone(), document, frame_dir.clone());
    report.leaf_count = leaves.len();

    if leaves.is_empty() {
        tracing::warn!(document = %report.document.display(), "document has no layers, skipped");
        report.skipped = true;
        report.finished_at = Utc::now();
        return Ok(report);
    }

    if config.clear_stale_frames {
        report.stale_frames_removed = remove_frames(&frame_dir, &config.frame_prefix)?;
    }
    let writer = FrameWriter::new(frame_dir, config.frame_prefix.clone(), config.raster);

    let mut guard = VisibilityGuard::acquire(&mut *host, &leaves);
    let visible = guard.snapshot().visible_leaves(&leaves);
    report.visible_count = visible.len();
    report.unreadable_count = guard.snapshot().unknown_count();
    tracing::debug!(
        leaf_count = report.leaf_count,
        visible_count = report.visible_count,
        unreadable_count = report.unreadable_count,
        "visibility captured"
    );

    report.normalize = Some(normalize_canvas(
        guard.host_mut(),
        config.resize,
        config.resample,
    ));
    report.phase = ExportPhase::Normalized;

    let mut index = FrameIndex::FIRST;
    report.frames.push(writer.write(guard.host_mut(), index)?);

    // The last visible leaf stays shown: hiding it would leave an empty frame.
    for leaf in visible.iter().take(visible.len().saturating_sub(1)) {
        if let Err(err) = guard.host_mut().set_visible(leaf.id, false) {
            tracing::warn!(
                layer_id = %leaf.id,
                layer_path = %leaf.path,
                error = %err,
                "failed to hide layer, frame will still show it"
            );
            report.hide_failures.push(HideFailure {
                layer_id: leaf.id,
                layer_path: leaf.path.clone(),
                reason: err.to_string(),
            });
        }
        index = index.next();
        report.frames.push(writer.write(guard.host_mut(), index)?);
    }
    report.phase = ExportPhase::FramesExported;

    report.restore = guard.release();
    report.phase = ExportPhase::Restored;
    if !report.restore.is_complete() {
        tracing::warn!(
            failed = report.restore.failed.len(),
            "some layers could not be restored to their original visibility"
        );
    }

    if config.close_after_export {
        match host.close_document() {
            Ok(()) => {
                report.closed = true;
                report.phase = ExportPhase::Closed;
            }
            Err(err) => tracing::warn!(error = %err, "failed to close document after export"),
        }
    }

    report.finished_at = Utc::now();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{InMemoryHost, MemoryDocument, MemoryNode};
    use crate::normalize::ResizePolicy;

    fn host(layers: Vec<MemoryNode>) -> InMemoryHost {
        InMemoryHost::from_document(MemoryDocument {
            path: PathBuf::from("/art/piece.psd"),
            width: 400,
            height: 300,
            layers,
        })
        .unwrap()
    }

    #[test]
    fn test_three_leaves_hide_top_down() {
        let mut host = host(vec![
            MemoryNode::leaf(1, "top", true),
            MemoryNode::leaf(2, "mid", true),
            MemoryNode::leaf(3, "bottom", true),
        ]);

        let report = export_build_up(&mut host, &ExportConfig::default()).unwrap();

        let shown: Vec<Vec<LayerId>> = host.frames().iter().map(|f| f.visible.clone()).collect();
        assert_eq!(
            shown,
            vec![
                vec![LayerId(1), LayerId(2), LayerId(3)],
                vec![LayerId(2), LayerId(3)],
                vec![LayerId(3)],
            ]
        );
        assert_eq!(report.frame_count(), 3);
        assert_eq!(report.phase, ExportPhase::Restored);
        assert_eq!(
            report.frames[2],
            PathBuf::from("/art/psdtemp_00002.png")
        );
    }

    #[test]
    fn test_empty_document_is_skipped_untouched() {
        let mut host = host(vec![MemoryNode::group("empty", vec![])]);

        let report = export_build_up(&mut host, &ExportConfig::default()).unwrap();

        assert!(report.skipped);
        assert!(report.normalize.is_none());
        assert!(host.frames().is_empty());
        assert_eq!(host.set_calls(), 0);
    }

    #[test]
    fn test_unchanged_policy_never_resizes() {
        let mut host = host(vec![MemoryNode::leaf(1, "a", true)]);
        let config = ExportConfig {
            resize: ResizePolicy::Unchanged,
            ..ExportConfig::default()
        };

        let report = export_build_up(&mut host, &config).unwrap();

        assert_eq!(report.normalize, Some(NormalizeOutcome::Disabled));
        assert!(host.resizes().is_empty());
    }
}
