//! In-memory trace sink.

use std::sync::Mutex;

use docpilot_core::BoxFuture;
use docpilot_core::telemetry::{TelemetryError, TraceEvent, TraceSink};

/// Collects every recorded [`TraceEvent`].
#[derive(Default)]
pub struct RecordingTraceSink {
    events: Mutex<Vec<TraceEvent>>,
}

impl RecordingTraceSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.lock().expect("trace sink lock poisoned").clone()
    }
}

impl TraceSink for RecordingTraceSink {
    fn record(&self, event: TraceEvent) -> BoxFuture<'_, Result<(), TelemetryError>> {
        self.events
            .lock()
            .expect("trace sink lock poisoned")
            .push(event);
        Box::pin(async { Ok(()) })
    }
}
