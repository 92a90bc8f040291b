use std::path::{Path, PathBuf};

use layerlapse_core_types::RunId;
use thiserror::Error;

use crate::model::LayerId;

/// Result type alias using LapseError
pub type Result<T> = std::result::Result<T, LapseError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code usable for programmatic handling,
/// test assertions and the CLI's exit diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Input/configuration
    InvalidInput,
    InvalidConfig,

    // Host document
    NoActiveDocument,
    HostUnavailable,
    NotFound,

    // Visibility
    VisibilityRead,
    VisibilitySet,

    // Canvas
    InvalidCanvas,
    Resize,

    // Frames
    Rasterize,
    Close,

    // Integration/IO
    Io,
    Serialization,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::NoActiveDocument => "ERR_NO_ACTIVE_DOCUMENT",
            ExErrorKind::HostUnavailable => "ERR_HOST_UNAVAILABLE",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::VisibilityRead => "ERR_VISIBILITY_READ",
            ExErrorKind::VisibilitySet => "ERR_VISIBILITY_SET",
            ExErrorKind::InvalidCanvas => "ERR_INVALID_CANVAS",
            ExErrorKind::Resize => "ERR_RESIZE",
            ExErrorKind::Rasterize => "ERR_RASTERIZE",
            ExErrorKind::Close => "ERR_CLOSE",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Whether an export run may continue after an error of this kind
    ///
    /// Fatal kinds abort the run (after visibility restoration); recoverable
    /// kinds are logged and swallowed by the sequencer.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ExErrorKind::VisibilityRead
                | ExErrorKind::VisibilitySet
                | ExErrorKind::InvalidCanvas
                | ExErrorKind::Resize
                | ExErrorKind::Close
        )
    }
}

/// Canonical structured error type
///
/// Structured representation of an error with classification fields for
/// programmatic handling and context for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    layer_id: Option<LayerId>,
    frame_index: Option<u32>,
    path: Option<PathBuf>,
    run_id: Option<RunId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            layer_id: None,
            frame_index: None,
            path: None,
            run_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add layer context
    pub fn with_layer_id(mut self, layer_id: LayerId) -> Self {
        self.layer_id = Some(layer_id);
        self
    }

    /// Add frame index context
    pub fn with_frame_index(mut self, frame_index: u32) -> Self {
        self.frame_index = Some(frame_index);
        self
    }

    /// Add file path context
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add export run context
    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = Some(run_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn layer_id(&self) -> Option<LayerId> {
        self.layer_id
    }

    pub fn frame_index(&self) -> Option<u32> {
        self.frame_index
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn run_id(&self) -> Option<&RunId> {
        self.run_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(layer_id) = self.layer_id {
            write!(f, " (layer_id: {})", layer_id)?;
        }
        if let Some(frame_index) = self.frame_index {
            write!(f, " (frame_index: {})", frame_index)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Error taxonomy for layerlapse operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LapseError {
    // ===== Host Errors =====
    /// The host has no document open
    #[error("No active document in host")]
    NoActiveDocument,

    /// The host could not enumerate the layer tree
    #[error("Layer tree unavailable: {reason}")]
    LayerTreeUnavailable { reason: String },

    /// The host does not know the given layer
    #[error("Layer not found: {layer_id}")]
    LayerNotFound { layer_id: LayerId },

    // ===== Visibility Errors =====
    /// Reading a leaf's visibility failed
    #[error("Cannot read visibility of layer {layer_id}: {reason}")]
    VisibilityRead { layer_id: LayerId, reason: String },

    /// Setting a leaf's visibility failed
    #[error("Cannot set visibility of layer {layer_id}: {reason}")]
    VisibilitySet { layer_id: LayerId, reason: String },

    // ===== Canvas Errors =====
    /// Canvas dimensions could not be read
    #[error("Canvas size unavailable: {reason}")]
    CanvasSizeUnavailable { reason: String },

    /// Canvas has a zero-length side
    #[error("Invalid canvas size {width}x{height}")]
    InvalidCanvasSize { width: u32, height: u32 },

    /// Host refused or failed to resize the canvas
    #[error("Resize to {width}x{height} failed: {reason}")]
    ResizeFailed {
        width: u32,
        height: u32,
        reason: String,
    },

    // ===== Frame Errors =====
    /// Host failed to rasterize the canvas to a file
    #[error("Rasterize to {} failed: {reason}", path.display())]
    RasterizeFailed { path: PathBuf, reason: String },

    /// A frame of the sequence could not be written
    #[error("Frame {frame_index} could not be written to {}: {reason}", path.display())]
    FrameWriteFailed {
        frame_index: u32,
        path: PathBuf,
        reason: String,
    },

    /// Host failed to close the document
    #[error("Closing document failed: {reason}")]
    CloseFailed { reason: String },

    // ===== Configuration Errors =====
    /// Export configuration is invalid
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Caller input is invalid (bad path, unreadable document description)
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    // ===== Generic Errors =====
    /// Filesystem error
    #[error("IO error during {op} on {}: {message}", path.display())]
    Io {
        op: String,
        path: PathBuf,
        message: String,
    },

    /// Serialization error (JSON encoding/decoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Create an IO error with operation and path context
pub fn io_error(op: &str, path: &Path, err: std::io::Error) -> LapseError {
    LapseError::Io {
        op: op.to_string(),
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

impl From<LapseError> for ExError {
    fn from(err: LapseError) -> Self {
        match err {
            LapseError::NoActiveDocument => ExError::new(ExErrorKind::NoActiveDocument)
                .with_op("document_path")
                .with_message("No active document in host"),

            LapseError::LayerTreeUnavailable { reason } => {
                ExError::new(ExErrorKind::HostUnavailable)
                    .with_op("layer_tree")
                    .with_message(reason)
            }

            LapseError::LayerNotFound { layer_id } => ExError::new(ExErrorKind::NotFound)
                .with_layer_id(layer_id)
                .with_message("Layer not found"),

            LapseError::VisibilityRead { layer_id, reason } => {
                ExError::new(ExErrorKind::VisibilityRead)
                    .with_op("is_visible")
                    .with_layer_id(layer_id)
                    .with_message(reason)
            }

            LapseError::VisibilitySet { layer_id, reason } => {
                ExError::new(ExErrorKind::VisibilitySet)
                    .with_op("set_visible")
                    .with_layer_id(layer_id)
                    .with_message(reason)
            }

            LapseError::CanvasSizeUnavailable { reason } => {
                ExError::new(ExErrorKind::HostUnavailable)
                    .with_op("canvas_size")
                    .with_message(reason)
            }

            LapseError::InvalidCanvasSize { width, height } => {
                ExError::new(ExErrorKind::InvalidCanvas)
                    .with_op("canvas_size")
                    .with_message(format!("Invalid canvas size {}x{}", width, height))
            }

            LapseError::ResizeFailed {
                width,
                height,
                reason,
            } => ExError::new(ExErrorKind::Resize)
                .with_op("resize_canvas")
                .with_message(format!("Resize to {}x{} failed: {}", width, height, reason)),

            LapseError::RasterizeFailed { path, reason } => ExError::new(ExErrorKind::Rasterize)
                .with_op("rasterize_to")
                .with_path(path)
                .with_message(reason),

            LapseError::FrameWriteFailed {
                frame_index,
                path,
                reason,
            } => ExError::new(ExErrorKind::Rasterize)
                .with_op("write_frame")
                .with_frame_index(frame_index)
                .with_path(path)
                .with_message(reason),

            LapseError::CloseFailed { reason } => ExError::new(ExErrorKind::Close)
                .with_op("close_document")
                .with_message(reason),

            LapseError::InvalidConfig { reason } => ExError::new(ExErrorKind::InvalidConfig)
                .with_op("validate_config")
                .with_message(reason),

            LapseError::InvalidInput { reason } => {
                ExError::new(ExErrorKind::InvalidInput).with_message(reason)
            }

            LapseError::Io { op, path, message } => ExError::new(ExErrorKind::Io)
                .with_op(op)
                .with_path(path)
                .with_message(message),

            LapseError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }

            LapseError::Internal { message } => {
                ExError::new(ExErrorKind::Internal).with_message(message)
            }
        }
    }
}

impl From<serde_json::Error> for LapseError {
    fn from(err: serde_json::Error) -> Self {
        LapseError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for LapseError {
    fn from(err: toml::de::Error) -> Self {
        LapseError::InvalidConfig {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_kinds() {
        assert!(ExErrorKind::Resize.is_recoverable());
        assert!(ExErrorKind::VisibilitySet.is_recoverable());
        assert!(!ExErrorKind::Rasterize.is_recoverable());
        assert!(!ExErrorKind::NoActiveDocument.is_recoverable());
    }

    #[test]
    fn test_ex_error_display_includes_context() {
        let err = ExError::new(ExErrorKind::Rasterize)
            .with_op("write_frame")
            .with_frame_index(3)
            .with_message("disk full");

        let text = err.to_string();
        assert!(text.starts_with("[ERR_RASTERIZE]"));
        assert!(text.contains("write_frame"));
        assert!(text.contains("disk full"));
        assert!(text.contains("frame_index: 3"));
    }

    #[test]
    fn test_ex_error_source_chain() {
        let inner = ExError::new(ExErrorKind::Io).with_message("permission denied");
        let outer = ExError::new(ExErrorKind::Rasterize).with_source(inner);

        assert_eq!(outer.source_error().map(|e| e.kind()), Some(ExErrorKind::Io));
        assert!(std::error::Error::source(&outer).is_some());
    }

    #[test]
    fn test_io_error_helper() {
        let err = io_error(
            "remove_frame",
            Path::new("/tmp/x.png"),
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );

        match err {
            LapseError::Io { op, path, .. } => {
                assert_eq!(op, "remove_frame");
                assert_eq!(path, PathBuf::from("/tmp/x.png"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
