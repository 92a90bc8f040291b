//! Boundary lifecycle macros
//!
//! A boundary operation emits exactly one `start` event and then either one
//! `end` or one `end_error`. Extra `key = value` fields (usually `run_id`)
//! are appended to the event as-is. The macros reach `tracing` through this
//! crate, so callers do not need their own dependency on it.

/// Log the start of a boundary operation
///
/// ```
/// # use layerlapse_core::log_op_start;
/// log_op_start!("export_build_up");
/// log_op_start!("export_build_up", run_id = "r1");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)+)?) => {
        $crate::__tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::layerlapse_core_types::schema::EVENT_START,
            $($($field)+)?
        )
    };
}

/// Log the successful end of a boundary operation
///
/// ```
/// # use layerlapse_core::log_op_end;
/// log_op_end!("export_build_up", duration_ms = 42, frame_count = 3u64);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)+)?) => {
        $crate::__tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::layerlapse_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($($field)+)?
        )
    };
}

/// Log the failed end of a boundary operation
///
/// The error is converted into an [`ExError`](crate::errors::ExError) so the
/// event carries its stable kind and code.
///
/// ```
/// # use layerlapse_core::{log_op_error, errors::LapseError};
/// log_op_error!("export_build_up", LapseError::NoActiveDocument, duration_ms = 10);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)+)?) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        $crate::__tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::layerlapse_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code(),
            err.message = ex_err.message(),
            $($($field)+)?
        )
    }};
}
