//! In-memory document host
//!
//! A fake [`DocumentHost`] that keeps the layer tree, visibility flags and
//! canvas size in memory and records every rasterize call instead of
//! producing pixels. It backs the test suite and the CLI's dry-run planner,
//! and can inject failures at each capability to exercise the sequencer's
//! error isolation.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{DocumentHost, RasterOptions, ResampleFilter};
use crate::errors::{io_error, LapseError, Result};
use crate::model::{CanvasSize, LayerGroup, LayerId, LayerNode};
use crate::traversal::flatten_leaves;

/// Serializable description of a layered document
///
/// ```json
/// {
///   "path": "art/cat.psd",
///   "width": 4000,
///   "height": 2000,
///   "layers": [
///     { "leaf": { "id": 1, "name": "ink" } },
///     { "group": { "name": "colour", "visible": true, "children": [
///       { "leaf": { "id": 2, "name": "shading", "visible": false } }
///     ] } }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryDocument {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub layers: Vec<MemoryNode>,
}

impl MemoryDocument {
    /// Parse a document description from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON document description
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|e| io_error("read_document", path, e))?;
        Self::from_json_str(&json)
    }
}

/// Layer tree node of a [`MemoryDocument`], carrying initial visibility
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum MemoryNode {
    Leaf {
        id: u64,
        #[serde(default)]
        name: String,
        #[serde(default = "default_visible")]
        visible: bool,
    },
    Group {
        #[serde(default)]
        name: String,
        #[serde(default = "default_visible")]
        visible: bool,
        #[serde(default)]
        children: Vec<MemoryNode>,
    },
}

fn default_visible() -> bool {
    true
}

impl MemoryNode {
    pub fn leaf(id: u64, name: impl Into<String>, visible: bool) -> Self {
        MemoryNode::Leaf {
            id,
            name: name.into(),
            visible,
        }
    }

    pub fn group(name: impl Into<String>, children: Vec<MemoryNode>) -> Self {
        MemoryNode::Group {
            name: name.into(),
            visible: true,
            children,
        }
    }

    pub fn hidden_group(name: impl Into<String>, children: Vec<MemoryNode>) -> Self {
        MemoryNode::Group {
            name: name.into(),
            visible: false,
            children,
        }
    }
}

/// One recorded call to [`DocumentHost::rasterize_to`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RasterizedFrame {
    pub path: PathBuf,
    pub size: CanvasSize,
    /// Leaves visible at rasterize time, in paint order
    pub visible: Vec<LayerId>,
    pub options: RasterOptions,
}

#[derive(Debug, Default)]
struct FailurePlan {
    visibility_reads: BTreeSet<LayerId>,
    visibility_sets: BTreeSet<LayerId>,
    hides: BTreeSet<LayerId>,
    canvas_size: bool,
    resize: bool,
    rasterize_at: Option<usize>,
    close: bool,
}

/// In-memory implementation of [`DocumentHost`]
#[derive(Debug)]
pub struct InMemoryHost {
    path: Option<PathBuf>,
    tree: Vec<LayerNode>,
    visibility: BTreeMap<LayerId, bool>,
    size: CanvasSize,
    frames: Vec<RasterizedFrame>,
    resizes: Vec<(CanvasSize, ResampleFilter)>,
    set_calls: usize,
    closed: bool,
    persist_frames: bool,
    failures: FailurePlan,
}

impl InMemoryHost {
    /// Host with no active document
    pub fn without_document() -> Self {
        Self {
            path: None,
            tree: Vec::new(),
            visibility: BTreeMap::new(),
            size: CanvasSize::new(0, 0),
            frames: Vec::new(),
            resizes: Vec::new(),
            set_calls: 0,
            closed: false,
            persist_frames: false,
            failures: FailurePlan::default(),
        }
    }

    /// Open a document description
    ///
    /// # Errors
    ///
    /// `InvalidInput` if two leaves share an id.
    pub fn from_document(document: MemoryDocument) -> Result<Self> {
        let mut visibility = BTreeMap::new();
        let tree = document
            .layers
            .into_iter()
            .map(|node| convert_node(node, &mut visibility))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            path: Some(document.path),
            tree,
            visibility,
            size: CanvasSize::new(document.width, document.height),
            ..Self::without_document()
        })
    }

    /// Also write a small placeholder file at every rasterize path
    ///
    /// The placeholder lists the visible layer ids, one per line; it is not
    /// an image.
    pub fn with_frame_files(mut self, enabled: bool) -> Self {
        self.persist_frames = enabled;
        self
    }

    /// Make reading this leaf's visibility fail
    pub fn fail_visibility_read(mut self, layer: LayerId) -> Self {
        self.failures.visibility_reads.insert(layer);
        self
    }

    /// Make every visibility write to this leaf fail
    pub fn fail_visibility_set(mut self, layer: LayerId) -> Self {
        self.failures.visibility_sets.insert(layer);
        self
    }

    /// Make hiding this leaf fail while showing it still succeeds
    pub fn fail_hide(mut self, layer: LayerId) -> Self {
        self.failures.hides.insert(layer);
        self
    }

    /// Make reading the canvas size fail
    pub fn fail_canvas_size(mut self) -> Self {
        self.failures.canvas_size = true;
        self
    }

    /// Make every resize request fail
    pub fn fail_resize(mut self) -> Self {
        self.failures.resize = true;
        self
    }

    /// Make the rasterize call with this zero-based call number fail
    pub fn fail_rasterize_at(mut self, call: usize) -> Self {
        self.failures.rasterize_at = Some(call);
        self
    }

    /// Make closing the document fail
    pub fn fail_close(mut self) -> Self {
        self.failures.close = true;
        self
    }

    /// Frames rasterized so far, in call order
    pub fn frames(&self) -> &[RasterizedFrame] {
        &self.frames
    }

    /// Current visibility of every leaf
    pub fn visibility(&self) -> &BTreeMap<LayerId, bool> {
        &self.visibility
    }

    /// Current visibility of one leaf
    pub fn visibility_of(&self, layer: LayerId) -> Option<bool> {
        self.visibility.get(&layer).copied()
    }

    /// Current canvas size
    pub fn size(&self) -> CanvasSize {
        self.size
    }

    /// Resize requests that succeeded, in order
    pub fn resizes(&self) -> &[(CanvasSize, ResampleFilter)] {
        &self.resizes
    }

    /// Number of `set_visible` calls received, failed ones included
    pub fn set_calls(&self) -> usize {
        self.set_calls
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// The current layer tree (group visibility only)
    pub fn tree(&self) -> &[LayerNode] {
        &self.tree
    }

    fn active_path(&self) -> Result<&Path> {
        match &self.path {
            Some(path) if !self.closed => Ok(path),
            _ => Err(LapseError::NoActiveDocument),
        }
    }

    fn visible_in_paint_order(&self) -> Vec<LayerId> {
        flatten_leaves(&self.tree)
            .into_iter()
            .filter(|leaf| leaf.ancestors_visible)
            .filter(|leaf| self.visibility.get(&leaf.id).copied().unwrap_or(false))
            .map(|leaf| leaf.id)
            .collect()
    }
}

fn convert_node(node: MemoryNode, visibility: &mut BTreeMap<LayerId, bool>) -> Result<LayerNode> {
    match node {
        MemoryNode::Leaf { id, name, visible } => {
            if visibility.insert(LayerId(id), visible).is_some() {
                return Err(LapseError::InvalidInput {
                    reason: format!("duplicate layer id {}", id),
                });
            }
            Ok(LayerNode::leaf(id, name))
        }
        MemoryNode::Group {
            name,
            visible,
            children,
        } => {
            let children = children
                .into_iter()
                .map(|child| convert_node(child, visibility))
                .collect::<Result<Vec<_>>>()?;
            let group = LayerGroup::new(name, children);
            Ok(LayerNode::Group(if visible { group } else { group.hidden() }))
        }
    }
}

impl DocumentHost for InMemoryHost {
    fn document_path(&self) -> Result<PathBuf> {
        self.active_path().map(Path::to_path_buf)
    }

    fn layer_tree(&self) -> Result<Vec<LayerNode>> {
        self.active_path()?;
        Ok(self.tree.clone())
    }

    fn is_visible(&self, layer: LayerId) -> Result<bool> {
        if self.failures.visibility_reads.contains(&layer) {
            return Err(LapseError::VisibilityRead {
                layer_id: layer,
                reason: "injected read failure".to_string(),
            });
        }
        self.visibility
            .get(&layer)
            .copied()
            .ok_or(LapseError::LayerNotFound { layer_id: layer })
    }

    fn set_visible(&mut self, layer: LayerId, visible: bool) -> Result<()> {
        self.set_calls += 1;
        if self.failures.visibility_sets.contains(&layer)
            || (!visible && self.failures.hides.contains(&layer))
        {
            return Err(LapseError::VisibilitySet {
                layer_id: layer,
                reason: "injected write failure".to_string(),
            });
        }
        match self.visibility.get_mut(&layer) {
            Some(flag) => {
                *flag = visible;
                Ok(())
            }
            None => Err(LapseError::LayerNotFound { layer_id: layer }),
        }
    }

    fn canvas_size(&self) -> Result<CanvasSize> {
        if self.failures.canvas_size {
            return Err(LapseError::CanvasSizeUnavailable {
                reason: "injected size failure".to_string(),
            });
        }
        self.active_path()?;
        Ok(self.size)
    }

    fn resize_canvas(&mut self, size: CanvasSize, filter: ResampleFilter) -> Result<()> {
        if self.failures.resize {
            return Err(LapseError::ResizeFailed {
                width: size.width,
                height: size.height,
                reason: "injected resize failure".to_string(),
            });
        }
        self.size = size;
        self.resizes.push((size, filter));
        Ok(())
    }

    fn rasterize_to(&mut self, path: &Path, options: &RasterOptions) -> Result<()> {
        let call = self.frames.len();
        if self.failures.rasterize_at == Some(call) {
            return Err(LapseError::RasterizeFailed {
                path: path.to_path_buf(),
                reason: "injected rasterize failure".to_string(),
            });
        }

        let visible = self.visible_in_paint_order();
        if self.persist_frames {
            let body: String = visible.iter().map(|id| format!("{}\n", id)).collect();
            fs::write(path, body).map_err(|e| io_error("write_frame", path, e))?;
        }

        self.frames.push(RasterizedFrame {
            path: path.to_path_buf(),
            size: self.size,
            visible,
            options: *options,
        });
        Ok(())
    }

    fn close_document(&mut self) -> Result<()> {
        if self.failures.close {
            return Err(LapseError::CloseFailed {
                reason: "injected close failure".to_string(),
            });
        }
        self.active_path()?;
        self.closed = true;
        Ok(())
    }
}
