pub mod canvas;
pub mod layer;

pub use canvas::CanvasSize;
pub use layer::{LayerGroup, LayerId, LayerNode, LeafLayer};
