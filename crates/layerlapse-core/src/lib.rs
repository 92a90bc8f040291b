//! layerlapse core - layer traversal and frame sequencing for build-up timelapses
//!
//! This crate drives a layered document, through the [`DocumentHost`] trait,
//! to produce a numbered frame sequence that shows the artwork being built up
//! layer by layer, including:
//! - Deterministic flattening of nested layer groups into paint order
//! - Visibility capture with guaranteed, failure-isolated restoration
//! - Optional canvas normalization (max dimension or fixed height)
//! - The hide-one-leaf / write-one-frame export loop
//! - Frame naming, listing and cleanup for downstream encoders
//! - Discovery of documents on disk and staleness checks
//!
//! No pixels are composited here; that is the host's job.

pub mod config;
pub mod discovery;
pub mod errors;
pub mod frames;
pub mod host;
pub mod logging_facility;
pub mod model;
pub mod normalize;
pub mod sequencer;
pub mod traversal;
pub mod visibility;

// Used by the logging macros through `$crate`
pub use layerlapse_core_types;
#[doc(hidden)]
pub use tracing as __tracing;

// Re-export commonly used types
pub use config::ExportConfig;
pub use errors::{ExError, ExErrorKind, LapseError, Result};
pub use frames::{FrameIndex, FrameWriter};
pub use host::{DocumentHost, InMemoryHost, RasterOptions, ResampleFilter};
pub use model::{CanvasSize, LayerId, LayerNode};
pub use normalize::{NormalizeOutcome, ResizePolicy};
pub use sequencer::{export_build_up, ExportPhase, ExportReport};
pub use traversal::{flatten_leaves, FlatLeaf};
pub use visibility::{RestoreReport, VisibilityGuard, VisibilitySnapshot};
