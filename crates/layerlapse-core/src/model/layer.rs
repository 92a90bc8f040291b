use serde::{Deserialize, Serialize};

/// Host-assigned identifier of a drawable layer
///
/// Identifiers are opaque to the core: they are handed back to the host
/// unchanged when reading or writing visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(pub u64);

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A drawable (non-group) layer
///
/// Leaves carry pixel content in the host and are the unit of visibility
/// control during export. The visibility flag itself lives in the host and
/// is read through [`DocumentHost::is_visible`](crate::host::DocumentHost::is_visible).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafLayer {
    /// Host identifier
    pub id: LayerId,

    /// Display name, used only for diagnostics
    #[serde(default)]
    pub name: String,
}

impl LeafLayer {
    pub fn new(id: LayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// An ordered container of child layers and groups
///
/// A group contributes no pixels of its own; it only positions its
/// descendants within the document's paint order. A hidden group hides all
/// of its descendants whatever their own flags say.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerGroup {
    #[serde(default)]
    pub name: String,

    /// Group visibility as reported by the host; never changed by an export
    #[serde(default = "default_group_visible")]
    pub visible: bool,

    /// Children in top-to-bottom order
    #[serde(default)]
    pub children: Vec<LayerNode>,
}

fn default_group_visible() -> bool {
    true
}

impl LayerGroup {
    pub fn new(name: impl Into<String>, children: Vec<LayerNode>) -> Self {
        Self {
            name: name.into(),
            visible: true,
            children,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// One node of a document's layer tree
///
/// The tree is owned and acyclic by construction: a group owns its children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerNode {
    Leaf(LeafLayer),
    Group(LayerGroup),
}

impl LayerNode {
    /// Shorthand for a leaf node
    pub fn leaf(id: u64, name: impl Into<String>) -> Self {
        LayerNode::Leaf(LeafLayer::new(LayerId(id), name))
    }

    /// Shorthand for a group node
    pub fn group(name: impl Into<String>, children: Vec<LayerNode>) -> Self {
        LayerNode::Group(LayerGroup::new(name, children))
    }

    /// Shorthand for a hidden group node
    pub fn hidden_group(name: impl Into<String>, children: Vec<LayerNode>) -> Self {
        LayerNode::Group(LayerGroup::new(name, children).hidden())
    }

    pub fn is_group(&self) -> bool {
        matches!(self, LayerNode::Group(_))
    }

    pub fn name(&self) -> &str {
        match self {
            LayerNode::Leaf(leaf) => &leaf.name,
            LayerNode::Group(group) => &group.name,
        }
    }
}
