//! In-memory event capture for log assertions in tests
//!
//! All tests in a binary share one global subscriber, and they run in
//! parallel. Assertions should therefore select their own events, normally
//! through [`TestCapture::events_for_run`] or a unique operation name.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};

use layerlapse_core_types::schema::{FIELD_COMPONENT, FIELD_EVENT, FIELD_OP, FIELD_RUN_ID};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// One recorded event; every field value is kept in its display form
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapturedEvent {
    pub level: Level,
    pub target: String,
    pub fields: BTreeMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn component(&self) -> Option<&str> {
        self.field(FIELD_COMPONENT)
    }

    pub fn op(&self) -> Option<&str> {
        self.field(FIELD_OP)
    }

    pub fn event(&self) -> Option<&str> {
        self.field(FIELD_EVENT)
    }

    pub fn run_id(&self) -> Option<&str> {
        self.field(FIELD_RUN_ID)
    }

    /// The free-text message, if the event had one
    pub fn message(&self) -> Option<&str> {
        self.field("message")
    }

    /// True for a lifecycle event of `op` with marker `event`
    pub fn is_lifecycle(&self, op: &str, event: &str) -> bool {
        self.op() == Some(op) && self.event() == Some(event)
    }
}

#[derive(Default)]
struct Fields(BTreeMap<String, String>);

impl Fields {
    fn put(&mut self, field: &Field, value: String) {
        self.0.insert(field.name().to_string(), value);
    }
}

impl Visit for Fields {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.put(field, format!("{:?}", value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, value.to_string());
    }
}

type Buffer = Arc<Mutex<Vec<CapturedEvent>>>;

/// `tracing` layer that appends every event to a shared buffer
pub struct CaptureLayer {
    buffer: Buffer,
}

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = Fields::default();
        event.record(&mut fields);

        let captured = CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            fields: fields.0,
        };
        if let Ok(mut buffer) = self.buffer.lock() {
            buffer.push(captured);
        }
    }
}

/// Read handle on the captured events
#[derive(Clone)]
pub struct TestCapture {
    buffer: Buffer,
}

impl TestCapture {
    /// A fresh layer and the handle reading from it
    ///
    /// Use this with a scoped subscriber (`tracing::subscriber::with_default`)
    /// when a test needs a private buffer.
    pub fn layer() -> (CaptureLayer, TestCapture) {
        let buffer = Buffer::default();
        (
            CaptureLayer {
                buffer: buffer.clone(),
            },
            TestCapture { buffer },
        )
    }

    pub fn events(&self) -> Vec<CapturedEvent> {
        self.buffer.lock().map(|b| b.clone()).unwrap_or_default()
    }

    pub fn events_for_run(&self, run_id: &str) -> Vec<CapturedEvent> {
        self.filter(|e| e.run_id() == Some(run_id))
    }

    pub fn filter<F>(&self, predicate: F) -> Vec<CapturedEvent>
    where
        F: Fn(&CapturedEvent) -> bool,
    {
        self.events().into_iter().filter(|e| predicate(e)).collect()
    }

    /// Lifecycle markers (`start`, `end`, `end_error`) of one run, in order
    pub fn lifecycle(&self, run_id: &str) -> Vec<String> {
        self.events_for_run(run_id)
            .into_iter()
            .filter_map(|e| e.event().map(str::to_string))
            .collect()
    }

    /// Warning-level events whose message contains `needle`
    pub fn warnings_containing(&self, needle: &str) -> Vec<CapturedEvent> {
        self.filter(|e| e.level == Level::WARN && e.message().is_some_and(|m| m.contains(needle)))
    }

    pub fn clear(&self) {
        if let Ok(mut buffer) = self.buffer.lock() {
            buffer.clear();
        }
    }
}

static GLOBAL_CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Install the capture layer as the global subscriber, once per process
///
/// ```
/// use layerlapse_core::logging_facility::test_capture::init_test_capture;
/// use layerlapse_core::log_op_start;
///
/// let capture = init_test_capture();
/// log_op_start!("doc_example_op", run_id = "doc-run");
/// assert_eq!(capture.lifecycle("doc-run"), vec!["start".to_string()]);
/// ```
pub fn init_test_capture() -> TestCapture {
    GLOBAL_CAPTURE
        .get_or_init(|| {
            let (layer, capture) = TestCapture::layer();
            if tracing_subscriber::registry().with(layer).try_init().is_err() {
                tracing::debug!("global subscriber already installed, capture is inert");
            }
            capture
        })
        .clone()
}
