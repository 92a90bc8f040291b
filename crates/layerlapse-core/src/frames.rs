//! Frame naming, writing and housekeeping.
//!
//! Frames are named `<prefix><index:05>.<ext>` and live next to the
//! document unless an output directory is configured. The zero-padded
//! index is the contract with the downstream encoder, which globs
//! `<prefix>?????.png` and plays the frames in reverse.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::errors::{io_error, LapseError, Result};
use crate::host::{DocumentHost, RasterFormat, RasterOptions};

/// Default file name prefix of exported frames
pub const DEFAULT_FRAME_PREFIX: &str = "psdtemp_";

/// Minimum number of digits in a frame file name
pub const INDEX_WIDTH: usize = 5;

/// Zero-based position of a frame in the exported sequence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct FrameIndex(pub u32);

impl FrameIndex {
    pub const FIRST: FrameIndex = FrameIndex(0);

    pub fn value(self) -> u32 {
        self.0
    }

    pub fn next(self) -> FrameIndex {
        FrameIndex(self.0.saturating_add(1))
    }
}

impl fmt::Display for FrameIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$}", self.0, width = INDEX_WIDTH)
    }
}

/// File name of frame `index`, e.g. `psdtemp_00003.png`
pub fn frame_file_name(prefix: &str, index: FrameIndex, format: RasterFormat) -> String {
    format!("{}{}.{}", prefix, index, format.extension())
}

/// Parse the index out of a frame file name, if it is one
pub fn parse_frame_index(file_name: &str, prefix: &str, format: RasterFormat) -> Option<FrameIndex> {
    let rest = file_name.strip_prefix(prefix)?;
    let (digits, ext) = rest.rsplit_once('.')?;
    if !ext.eq_ignore_ascii_case(format.extension()) {
        return None;
    }
    if digits.len() < INDEX_WIDTH || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().map(FrameIndex)
}

/// Writes numbered frames through a [`DocumentHost`]
///
/// The writer only rasterizes; it never changes visibility or canvas size.
#[derive(Debug, Clone)]
pub struct FrameWriter {
    dir: PathBuf,
    prefix: String,
    raster: RasterOptions,
}

impl FrameWriter {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>, raster: RasterOptions) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            raster,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn path_for(&self, index: FrameIndex) -> PathBuf {
        self.dir
            .join(frame_file_name(&self.prefix, index, self.raster.format))
    }

    /// Rasterize the current composite as frame `index`
    ///
    /// # Errors
    /// * `FrameWriteFailed` - If the host could not rasterize; wraps the
    ///   host's error message
    pub fn write<H>(&self, host: &mut H, index: FrameIndex) -> Result<PathBuf>
    where
        H: DocumentHost + ?Sized,
    {
        let path = self.path_for(index);
        host.rasterize_to(&path, &self.raster)
            .map_err(|err| LapseError::FrameWriteFailed {
                frame_index: index.value(),
                path: path.clone(),
                reason: err.to_string(),
            })?;

        tracing::debug!(frame_index = index.value(), frame_path = %path.display(), "frame written");
        Ok(path)
    }
}

/// Frames in `dir` matching `prefix`, sorted by index
///
/// A missing directory has no frames.
pub fn list_frames(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(io_error("list_frames", dir, err)),
    };

    let mut frames = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| io_error("list_frames", dir, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some(index) = parse_frame_index(name, prefix, RasterFormat::Png) {
            frames.push((index, path));
        }
    }

    frames.sort();
    Ok(frames.into_iter().map(|(_, path)| path).collect())
}

/// Delete every frame [`list_frames`] finds, returning how many were removed
pub fn remove_frames(dir: &Path, prefix: &str) -> Result<usize> {
    let frames = list_frames(dir, prefix)?;
    for path in &frames {
        fs::remove_file(path).map_err(|e| io_error("remove_frame", path, e))?;
    }
    if !frames.is_empty() {
        tracing::debug!(dir = %dir.display(), removed = frames.len(), "stale frames removed");
    }
    Ok(frames.len())
}

/// Frames in build-up order: last exported first
pub fn playback_order(mut frames: Vec<PathBuf>) -> Vec<PathBuf> {
    frames.reverse();
    frames
}
