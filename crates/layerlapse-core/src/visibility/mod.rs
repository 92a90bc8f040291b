//! Visibility capture and guaranteed restoration.
//!
//! ## Responsibilities
//!
//! - Snapshot the visibility of every leaf before an export mutates it
//! - Write the snapshot back on every exit path, isolating per-leaf failures
//!
//! ## Non-Responsibilities
//!
//! - Deciding which leaves to hide (handled by `sequencer`)

pub mod guard;
pub mod snapshot;

pub use guard::VisibilityGuard;
pub use snapshot::{RestoreReport, SnapshotEntry, VisibilitySnapshot};
