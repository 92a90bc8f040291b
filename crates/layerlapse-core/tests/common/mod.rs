use std::path::{Path, PathBuf};

use layerlapse_core::host::{InMemoryHost, MemoryDocument, MemoryNode};
use layerlapse_core::model::LayerId;

/// Open an in-memory document at `/art/piece.psd`
#[allow(dead_code)]
pub fn open(width: u32, height: u32, layers: Vec<MemoryNode>) -> InMemoryHost {
    open_at(Path::new("/art/piece.psd"), width, height, layers)
}

/// Open an in-memory document at the given path
#[allow(dead_code)]
pub fn open_at(path: &Path, width: u32, height: u32, layers: Vec<MemoryNode>) -> InMemoryHost {
    InMemoryHost::from_document(MemoryDocument {
        path: path.to_path_buf(),
        width,
        height,
        layers,
    })
    .unwrap()
}

/// `count` visible root leaves with ids `1..=count`, top first
#[allow(dead_code)]
pub fn visible_stack(count: u64) -> Vec<MemoryNode> {
    (1..=count)
        .map(|id| MemoryNode::leaf(id, format!("layer {id}"), true))
        .collect()
}

/// Visible layer ids of every frame the host rasterized
#[allow(dead_code)]
pub fn frame_contents(host: &InMemoryHost) -> Vec<Vec<LayerId>> {
    host.frames().iter().map(|f| f.visible.clone()).collect()
}

#[allow(dead_code)]
pub fn ids(raw: &[u64]) -> Vec<LayerId> {
    raw.iter().copied().map(LayerId).collect()
}

/// Paths of frames `0..count` under `dir`
#[allow(dead_code)]
pub fn expected_frames(dir: &Path, count: usize) -> Vec<PathBuf> {
    (0..count)
        .map(|i| dir.join(format!("psdtemp_{i:05}.png")))
        .collect()
}
