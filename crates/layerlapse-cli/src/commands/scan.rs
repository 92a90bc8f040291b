//! Scan command
//!
//! Usage: layerlapse scan <PATH> [--animation-ext <EXT>] [--json]

use std::path::{Path, PathBuf};

use clap::Args;
use layerlapse_core::discovery::{animation_path, discover_documents, needs_export};
use layerlapse_core::ExportConfig;

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Document file or folder to search recursively
    pub path: PathBuf,

    /// Extension of the rendered animation next to each document
    #[arg(long, default_value = "webp")]
    pub animation_ext: String,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Staleness of one discovered document
#[derive(Debug)]
struct ScanRow {
    document: PathBuf,
    /// `Err` holds the message when the document could not be inspected
    status: Result<bool, String>,
}

impl ScanRow {
    fn label(&self) -> &'static str {
        match self.status {
            Ok(true) => "export",
            Ok(false) => "up-to-date",
            Err(_) => "error",
        }
    }

    fn to_json(&self) -> serde_json::Value {
        match &self.status {
            Ok(stale) => serde_json::json!({ "document": self.document, "needs_export": stale }),
            Err(message) => serde_json::json!({
                "document": self.document,
                "needs_export": null,
                "error": message,
            }),
        }
    }
}

fn scan_rows(documents: Vec<PathBuf>, animation_ext: &str) -> Vec<ScanRow> {
    documents
        .into_iter()
        .map(|document| {
            let status = check(&document, animation_ext);
            ScanRow { document, status }
        })
        .collect()
}

fn check(document: &Path, animation_ext: &str) -> Result<bool, String> {
    needs_export(document, &animation_path(document, animation_ext)).map_err(|err| {
        tracing::warn!(document = %document.display(), error = %err, "cannot check document, skipped");
        err.to_string()
    })
}

/// Execute scan command
pub fn execute(args: ScanArgs, config: &ExportConfig) -> Result<(), Box<dyn std::error::Error>> {
    let documents = discover_documents(&args.path, &config.discovery)?;
    let rows = scan_rows(documents, &args.animation_ext);

    if args.json {
        let output: Vec<_> = rows.iter().map(ScanRow::to_json).collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        for row in &rows {
            match &row.status {
                Err(message) => {
                    println!("{:<10}  {}  ({})", row.label(), row.document.display(), message)
                }
                Ok(_) => println!("{:<10}  {}", row.label(), row.document.display()),
            }
        }
    }

    Ok(())
}
