//! Host document capability surface
//!
//! The core never composites pixels. Everything it needs from the
//! document-editing application goes through [`DocumentHost`]: enumerate the
//! layer tree, read and write leaf visibility, read and resize the canvas,
//! and rasterize the current composite to a file.
//!
//! ## Responsibilities
//!
//! - Define the narrow trait the sequencer drives
//! - Define the value types passed across it (resampling filter, raster
//!   options)
//!
//! ## Non-Responsibilities
//!
//! - Talking to a real editor (left to host implementations)
//! - Encoding frames into video (downstream tooling)

pub mod memory;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::model::{CanvasSize, LayerId, LayerNode};

pub use memory::{InMemoryHost, MemoryDocument, MemoryNode, RasterizedFrame};

/// Resampling filter requested when resizing the canvas
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResampleFilter {
    #[default]
    Bicubic,
    Bilinear,
    Nearest,
}

/// Raster file format of exported frames
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RasterFormat {
    #[default]
    Png,
}

impl RasterFormat {
    /// File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            RasterFormat::Png => "png",
        }
    }
}

/// Options passed to [`DocumentHost::rasterize_to`]
///
/// Frames are lossless: PNG at the highest compression level, not
/// interlaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterOptions {
    pub format: RasterFormat,
    /// PNG compression level, 0..=9
    pub compression: u8,
    pub interlaced: bool,
}

impl RasterOptions {
    pub const MAX_COMPRESSION: u8 = 9;
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            format: RasterFormat::Png,
            compression: Self::MAX_COMPRESSION,
            interlaced: false,
        }
    }
}

/// Capability surface of the host document-editing application
///
/// All calls are blocking. The sequencer holds `&mut` to the host for the
/// whole export pass, so no other mutation of the document can interleave.
///
/// # Errors
///
/// Implementations report failures as [`LapseError`](crate::errors::LapseError)
/// values; the sequencer decides which of them are recoverable.
pub trait DocumentHost {
    /// Path of the active document
    ///
    /// Returns `LapseError::NoActiveDocument` when nothing is open.
    fn document_path(&self) -> Result<PathBuf>;

    /// Root layer nodes of the active document, top to bottom
    fn layer_tree(&self) -> Result<Vec<LayerNode>>;

    /// Current visibility flag of a leaf layer
    fn is_visible(&self, layer: LayerId) -> Result<bool>;

    /// Set the visibility flag of a leaf layer
    fn set_visible(&mut self, layer: LayerId, visible: bool) -> Result<()>;

    /// Current canvas dimensions in pixels
    fn canvas_size(&self) -> Result<CanvasSize>;

    /// Resample the whole document to the given dimensions
    fn resize_canvas(&mut self, size: CanvasSize, filter: ResampleFilter) -> Result<()>;

    /// Rasterize the visible composite and write it to `path`
    ///
    /// Must not change any layer's visibility or the canvas dimensions.
    fn rasterize_to(&mut self, path: &Path, options: &RasterOptions) -> Result<()>;

    /// Close the document without saving changes
    fn close_document(&mut self) -> Result<()>;
}
