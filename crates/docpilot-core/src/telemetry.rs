//! Optional trace export for assistant runs.
//!
//! A [`Tracer`] is handed to the assistant at construction. The underlying
//! [`TraceSink`] is built on first use and shared by every later call.
//! An unconfigured tracer drops events silently, and delivery failures
//! are logged rather than returned.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use chrono::{SecondsFormat, Utc};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use docpilot_config::TelemetryConfig;

use crate::BoxFuture;
use crate::build_info;

/// Errors from delivering a trace event.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("trace delivery failed: {0}")]
    Delivery(String),

    #[error("trace endpoint rejected event: HTTP {0}")]
    Rejected(u16),
}

/// One exported trace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceEvent {
    pub trace_id: String,
    pub environment: String,
    pub name: String,
    /// Identifier of the object being traced (e.g. a conversation).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub metadata: serde_json::Value,
}

/// Destination for trace events.
pub trait TraceSink: Send + Sync {
    fn record(&self, event: TraceEvent) -> BoxFuture<'_, Result<(), TelemetryError>>;
}

/// Posts trace events as JSON batches to an ingestion endpoint.
pub struct HttpTraceSink {
    client: Client,
    endpoint: String,
    public_key: String,
    secret_key: Zeroizing<String>,
}

impl HttpTraceSink {
    pub fn new(
        endpoint: impl Into<String>,
        public_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::builder()
                .user_agent(build_info::user_agent())
                .build()
                .unwrap_or_default(),
            endpoint: endpoint.into(),
            public_key: public_key.into(),
            secret_key: Zeroizing::new(secret_key.into()),
        }
    }

    fn batch_body(event: &TraceEvent) -> serde_json::Value {
        serde_json::json!({
            "batch": [{
                "id": event.trace_id,
                "type": "trace-create",
                "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                "body": {
                    "id": event.trace_id,
                    "name": event.name,
                    "environment": event.environment,
                    "sessionId": event.target_id,
                    "userId": event.user_id,
                    "metadata": event.metadata,
                    "release": build_info::VERSION,
                }
            }]
        })
    }
}

impl TraceSink for HttpTraceSink {
    fn record(&self, event: TraceEvent) -> BoxFuture<'_, Result<(), TelemetryError>> {
        let body = Self::batch_body(&event);
        Box::pin(async move {
            let resp = self
                .client
                .post(&self.endpoint)
                .basic_auth(&self.public_key, Some(self.secret_key.as_str()))
                .json(&body)
                .send()
                .await
                .map_err(|e| TelemetryError::Delivery(e.to_string()))?;
            if !resp.status().is_success() {
                return Err(TelemetryError::Rejected(resp.status().as_u16()));
            }
            Ok(())
        })
    }
}

type SinkFactory = Box<dyn Fn() -> Option<Arc<dyn TraceSink>> + Send + Sync>;

/// Lazily-initialised handle to the trace sink.
pub struct Tracer {
    environment: String,
    factory: SinkFactory,
    sink: OnceLock<Option<Arc<dyn TraceSink>>>,
}

impl Tracer {
    /// A tracer that drops every event.
    pub fn disabled() -> Self {
        Self {
            environment: String::new(),
            factory: Box::new(|| None),
            sink: OnceLock::new(),
        }
    }

    /// A tracer exporting over HTTP when `config` is active, disabled otherwise.
    pub fn from_config(config: &TelemetryConfig) -> Self {
        if !config.is_active() {
            debug!("trace export not configured");
            return Self::disabled();
        }
        let config = config.clone();
        Self {
            environment: config.environment.clone(),
            factory: Box::new(move || {
                debug!(endpoint = %config.endpoint, "creating trace sink");
                Some(Arc::new(HttpTraceSink::new(
                    config.endpoint.clone(),
                    config.public_key.clone(),
                    config.secret_key.clone(),
                )) as Arc<dyn TraceSink>)
            }),
            sink: OnceLock::new(),
        }
    }

    /// A tracer writing to a caller-supplied sink.
    pub fn with_sink(environment: impl Into<String>, sink: Arc<dyn TraceSink>) -> Self {
        Self {
            environment: environment.into(),
            factory: Box::new(move || Some(Arc::clone(&sink))),
            sink: OnceLock::new(),
        }
    }

    /// The sink, created on first call and reused afterwards.
    fn sink(&self) -> Option<&Arc<dyn TraceSink>> {
        self.sink.get_or_init(|| (self.factory)()).as_ref()
    }

    pub fn is_enabled(&self) -> bool {
        self.sink().is_some()
    }

    /// Export one trace. Never fails; delivery errors are logged.
    pub async fn record(
        &self,
        name: &str,
        target_id: Option<&str>,
        user_id: Option<&str>,
        metadata: serde_json::Value,
    ) {
        let Some(sink) = self.sink() else {
            return;
        };
        let event = TraceEvent {
            trace_id: next_trace_id(),
            environment: self.environment.clone(),
            name: name.to_string(),
            target_id: target_id.map(str::to_string),
            user_id: user_id.map(str::to_string),
            metadata,
        };
        let trace_id = event.trace_id.clone();
        if let Err(e) = sink.record(event).await {
            warn!(trace_id, error = %e, "failed to export trace");
        }
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Self::disabled()
    }
}

impl std::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracer")
            .field("environment", &self.environment)
            .field("initialised", &self.sink.get().is_some())
            .finish()
    }
}

/// Process-unique trace id: start time plus a counter.
fn next_trace_id() -> String {
    static NEXT: AtomicU64 = AtomicU64::new(1);
    format!(
        "{:x}-{:04x}",
        Utc::now().timestamp_millis(),
        NEXT.fetch_add(1, Ordering::Relaxed)
    )
}
