//! Deterministic layer-tree traversal

pub mod flatten;

pub use flatten::{flatten_leaves, FlatLeaf};
