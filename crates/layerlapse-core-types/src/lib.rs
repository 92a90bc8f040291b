//! Types shared by the layerlapse error and logging facilities
//!
//! - [`RunId`]: correlation id of one export pass
//! - [`schema`]: field keys and event names of lifecycle logs

pub mod correlation;
pub mod schema;

pub use correlation::RunId;
