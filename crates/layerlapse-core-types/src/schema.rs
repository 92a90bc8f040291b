//! Field keys and event names shared by the export lifecycle logs
//!
//! Log consumers (and the test capture layer) key on these strings, so they
//! are part of the observable contract of an export run.

/// Module path of the emitting code
pub const FIELD_COMPONENT: &str = "component";
/// Boundary operation name, e.g. `export_build_up`
pub const FIELD_OP: &str = "op";
/// Lifecycle marker, one of the `EVENT_*` values
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
/// Correlates every lifecycle event of one export pass
pub const FIELD_RUN_ID: &str = "run_id";

pub const FIELD_LEAF_COUNT: &str = "leaf_count";
pub const FIELD_VISIBLE_COUNT: &str = "visible_count";
pub const FIELD_FRAME_COUNT: &str = "frame_count";

pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";
pub const FIELD_ERR_MESSAGE: &str = "err.message";

pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_distinct() {
        let events = [EVENT_START, EVENT_END, EVENT_END_ERROR];
        for (i, a) in events.iter().enumerate() {
            for b in &events[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_error_fields_share_prefix() {
        for key in [FIELD_ERR_KIND, FIELD_ERR_CODE, FIELD_ERR_MESSAGE] {
            assert!(key.starts_with("err."));
        }
    }
}
