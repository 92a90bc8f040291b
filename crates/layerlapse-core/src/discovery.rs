//! Finding layered documents on disk and deciding which need export.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkdir::{DirEntry, WalkDir};

use crate::errors::{io_error, LapseError, Result};

/// Which files count as layered documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryOptions {
    /// File extensions without the dot, matched case-insensitively
    pub extensions: Vec<String>,
    /// Folder names never descended into, matched case-insensitively
    pub exclude_dirs: Vec<String>,
    /// Stem prefix of temporary working copies, which are skipped
    pub temp_prefix: String,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            extensions: vec!["psd".to_string()],
            exclude_dirs: vec!["00_backup".to_string(), "backup".to_string()],
            temp_prefix: "PSDTEMP_".to_string(),
        }
    }
}

impl DiscoveryOptions {
    /// Check that the options can match anything at all
    ///
    /// # Errors
    /// * `InvalidConfig` - If no extension is listed
    pub fn validate(&self) -> Result<()> {
        if self.extensions.is_empty() {
            return Err(LapseError::InvalidConfig {
                reason: "discovery.extensions must list at least one extension".to_string(),
            });
        }
        Ok(())
    }

    /// True if `path` names a document this walk should return
    pub fn accepts(&self, path: &Path) -> bool {
        let ext_ok = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)));
        let temp = path
            .file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|stem| !self.temp_prefix.is_empty() && stem.starts_with(&self.temp_prefix));
        ext_ok && !temp
    }

    fn is_excluded_dir(&self, entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| self.exclude_dirs.iter().any(|d| d.eq_ignore_ascii_case(name)))
    }
}

/// Documents under `root`, sorted by path
///
/// `root` may be a single file, which is returned if it is accepted.
///
/// # Errors
/// * `InvalidConfig` - If `options` lists no extensions
/// * `Io` - If `root` does not exist or a directory cannot be read
pub fn discover_documents(root: &Path, options: &DiscoveryOptions) -> Result<Vec<PathBuf>> {
    options.validate()?;
    let meta = fs::metadata(root).map_err(|e| io_error("discover", root, e))?;
    if meta.is_file() {
        return Ok(if options.accepts(root) {
            vec![root.to_path_buf()]
        } else {
            Vec::new()
        });
    }

    let mut documents = Vec::new();
    let walker = WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| !options.is_excluded_dir(entry));
    for entry in walker {
        let entry = entry.map_err(|err| LapseError::Io {
            op: "discover".to_string(),
            path: err.path().unwrap_or(root).to_path_buf(),
            message: err.to_string(),
        })?;
        if entry.file_type().is_file() && options.accepts(entry.path()) {
            documents.push(entry.into_path());
        }
    }

    documents.sort();
    tracing::debug!(root = %root.display(), found = documents.len(), "documents discovered");
    Ok(documents)
}

/// Path of the animation rendered from `document`, e.g. `art.webp`
pub fn animation_path(document: &Path, extension: &str) -> PathBuf {
    document.with_extension(extension)
}

/// True if `animation` is missing or older than `document`
///
/// # Errors
/// * `Io` - If `document` cannot be inspected
pub fn needs_export(document: &Path, animation: &Path) -> Result<bool> {
    let doc_modified = fs::metadata(document)
        .and_then(|m| m.modified())
        .map_err(|e| io_error("needs_export", document, e))?;

    let Ok(anim_modified) = fs::metadata(animation).and_then(|m| m.modified()) else {
        return Ok(true);
    };
    Ok(doc_modified > anim_modified)
}
