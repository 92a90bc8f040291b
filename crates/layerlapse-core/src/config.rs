//! Export configuration.
//!
//! Every field has a default, so an empty TOML file is a valid
//! configuration:
//!
//! ```toml
//! resize = { max_dimension = 1000 }
//! resample = "bicubic"
//! frame_prefix = "psdtemp_"
//! close_after_export = false
//! clear_stale_frames = false
//!
//! [raster]
//! compression = 9
//! interlaced = false
//!
//! [discovery]
//! extensions = ["psd"]
//! exclude_dirs = ["00_backup", "backup"]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::discovery::DiscoveryOptions;
use crate::errors::{io_error, LapseError, Result};
use crate::frames::DEFAULT_FRAME_PREFIX;
use crate::host::{RasterOptions, ResampleFilter};
use crate::normalize::ResizePolicy;

/// Settings for one build-up export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    pub resize: ResizePolicy,
    pub resample: ResampleFilter,
    pub frame_prefix: String,
    /// Folder for frames; the document's folder when unset
    pub output_dir: Option<PathBuf>,
    pub raster: RasterOptions,
    /// Close the document without saving once frames are written
    pub close_after_export: bool,
    /// Delete existing frames with the same prefix before exporting
    pub clear_stale_frames: bool,
    pub discovery: DiscoveryOptions,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            resize: ResizePolicy::default(),
            resample: ResampleFilter::default(),
            frame_prefix: DEFAULT_FRAME_PREFIX.to_string(),
            output_dir: None,
            raster: RasterOptions::default(),
            close_after_export: false,
            clear_stale_frames: false,
            discovery: DiscoveryOptions::default(),
        }
    }
}

impl ExportConfig {
    /// Parse and validate a TOML configuration
    ///
    /// # Errors
    /// * `InvalidConfig` - If the text is not valid TOML for this shape or
    ///   fails [`validate`](Self::validate)
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: ExportConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| io_error("load_config", path, e))?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "export config loaded");
        Ok(config)
    }

    /// Check the invariants serde cannot express
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| {
            Err(LapseError::InvalidConfig {
                reason: reason.to_string(),
            })
        };

        if self.frame_prefix.is_empty() {
            return invalid("frame_prefix must not be empty");
        }
        if self.frame_prefix.contains(['/', '\\']) {
            return invalid("frame_prefix must not contain path separators");
        }
        if self.raster.compression > RasterOptions::MAX_COMPRESSION {
            return invalid("raster.compression must be between 0 and 9");
        }
        if matches!(
            self.resize,
            ResizePolicy::MaxDimension(0) | ResizePolicy::FixedHeight(0)
        ) {
            return invalid("resize target must be greater than zero");
        }
        Ok(())
    }

    /// Folder the frames of `document` are written to
    pub fn frame_dir(&self, document: &Path) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.clone(),
            None => document
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}
