//! Structured logging for export runs
//!
//! ## Responsibilities
//!
//! - Install the global `tracing` subscriber once, per [`Profile`]
//! - Emit boundary lifecycle events through `log_op_start!`, `log_op_end!`
//!   and `log_op_error!`, keyed by the `schema` constants
//! - Capture events in memory for test assertions
//!
//! ## Conventions
//!
//! Only boundary functions (currently `sequencer::export_build_up`) emit
//! lifecycle events, and each of them carries the pass's `run_id`. Lower
//! layers log with plain `debug!` and `warn!`.
//!
//! ```rust
//! use layerlapse_core::logging_facility::{init, Profile};
//!
//! init(Profile::Production);
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
