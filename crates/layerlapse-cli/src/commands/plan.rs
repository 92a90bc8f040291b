//! Plan command
//!
//! Usage: layerlapse plan <DOCUMENT_JSON> [--json]
//!
//! Runs the full export against an in-memory copy of the document and
//! prints which layers every frame would show. Nothing is written to disk.

use std::collections::HashMap;
use std::path::PathBuf;

use clap::Args;
use layerlapse_core::host::{InMemoryHost, MemoryDocument};
use layerlapse_core::model::LayerId;
use layerlapse_core::{export_build_up, flatten_leaves, ExportConfig, ExportReport, NormalizeOutcome};

#[derive(Debug, Args)]
pub struct PlanArgs {
    /// JSON description of the document's layer tree
    pub document: PathBuf,

    /// Print the report and frames as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute plan command
pub fn execute(args: PlanArgs, mut config: ExportConfig) -> Result<(), Box<dyn std::error::Error>> {
    let document = MemoryDocument::load(&args.document)?;
    let mut host = InMemoryHost::from_document(document)?;

    // A dry run must not delete real frames next to the document.
    config.clear_stale_frames = false;

    let report = export_build_up(&mut host, &config)?;
    tracing::debug!(frames = report.frame_count(), "plan computed");

    if args.json {
        let output = serde_json::json!({
            "report": report,
            "frames": host.frames(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", render_text(&report, &host));
    }

    Ok(())
}

fn describe_normalize(outcome: Option<&NormalizeOutcome>) -> String {
    match outcome {
        None => "not applied".to_string(),
        Some(NormalizeOutcome::Disabled) => "unchanged".to_string(),
        Some(NormalizeOutcome::WithinLimit { size }) => format!("{} (within limit)", size),
        Some(NormalizeOutcome::Resized { from, to }) => format!("{} -> {}", from, to),
        Some(NormalizeOutcome::Failed { reason }) => format!("resize failed: {}", reason),
    }
}

fn render_text(report: &ExportReport, host: &InMemoryHost) -> String {
    let mut out = format!("Document: {}\n", report.document.display());
    if report.skipped {
        out.push_str("No layers, nothing to export\n");
        return out;
    }

    let names: HashMap<LayerId, String> = flatten_leaves(host.tree())
        .into_iter()
        .map(|leaf| (leaf.id, leaf.path))
        .collect();

    out.push_str(&format!(
        "Leaves: {} ({} visible, {} unreadable)\n",
        report.leaf_count, report.visible_count, report.unreadable_count
    ));
    out.push_str(&format!(
        "Canvas: {}\n",
        describe_normalize(report.normalize.as_ref())
    ));
    out.push_str(&format!("Frames: {}\n", report.frame_count()));

    for frame in host.frames() {
        let shown: Vec<&str> = frame
            .visible
            .iter()
            .map(|id| names.get(id).map(String::as_str).unwrap_or("?"))
            .collect();
        let file = frame
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        out.push_str(&format!("  {}  {}\n", file, shown.join(", ")));
    }

    for failure in &report.hide_failures {
        out.push_str(&format!(
            "Could not hide {}: {}\n",
            failure.layer_path, failure.reason
        ));
    }

    out
}
