//! Interaction Logger — best-effort, write-only audit trail of completed flows.
//!
//! The logger is chosen once at start-up: `StoreInteractionLogger` when a
//! document store is configured, `NoopInteractionLogger` otherwise. Neither
//! ever reports failure to its caller; write errors end in the server log.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info};

pub mod store;

/// Collection every interaction record is appended to.
pub const INTERACTIONS_COLLECTION: &str = "interactions";

/// Characters of an embedded document kept in a logged record.
pub const DOCUMENT_PREVIEW_CHARS: usize = 100;

const TRUNCATION_MARKER: &str = "...";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// One completed flow. `createdAt` is stamped by the store on write.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRecord {
    pub flow_name: String,
    pub input: Value,
    pub output: Value,
}

/// Append-only document store. Returns the generated document id.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn create(
        &self,
        collection: &str,
        record: &InteractionRecord,
    ) -> Result<String, StoreError>;
}

/// Receives every successful flow. Implementations must not fail the caller.
#[async_trait]
pub trait InteractionLogger: Send + Sync {
    async fn record(&self, flow_name: &str, input: Value, output: Value);
}

/// Used when no document store is configured.
pub struct NoopInteractionLogger;

#[async_trait]
impl InteractionLogger for NoopInteractionLogger {
    async fn record(&self, flow_name: &str, _input: Value, _output: Value) {
        debug!("Interaction store not configured; skipping log for {flow_name}");
    }
}

pub struct StoreInteractionLogger {
    store: Arc<dyn DocumentStore>,
}

impl StoreInteractionLogger {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl InteractionLogger for StoreInteractionLogger {
    async fn record(&self, flow_name: &str, input: Value, output: Value) {
        let record = InteractionRecord {
            flow_name: flow_name.to_string(),
            input: sanitize_input(input),
            output,
        };

        match self.store.create(INTERACTIONS_COLLECTION, &record).await {
            Ok(id) => info!("Interaction for flow '{flow_name}' saved with id {id}"),
            Err(e) => error!("Failed to save interaction for flow '{flow_name}': {e}"),
        }
    }
}

/// Replaces every embedded data URI longer than the preview with its first
/// `DOCUMENT_PREVIEW_CHARS` characters plus a truncation marker. Keeps records
/// under the store's per-document size ceiling.
pub fn sanitize_input(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(truncate_data_uri(s)),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize_input).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, sanitize_input(v)))
                .collect(),
        ),
        other => other,
    }
}

fn truncate_data_uri(s: String) -> String {
    if !s.starts_with("data:") || s.chars().count() <= DOCUMENT_PREVIEW_CHARS {
        return s;
    }
    let mut preview: String = s.chars().take(DOCUMENT_PREVIEW_CHARS).collect();
    preview.push_str(TRUNCATION_MARKER);
    preview
}
