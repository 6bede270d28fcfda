//! Test doubles for the model provider and the document store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;

use crate::interactions::{DocumentStore, InteractionRecord, StoreError};
use crate::llm_client::{LlmError, ModelProvider, ModelRequest};

enum Behaviour {
    Return(Value),
    Fail,
    Hang,
}

/// Canned model: counts calls and remembers the last request.
pub struct StubModel {
    behaviour: Behaviour,
    calls: AtomicUsize,
    last_request: Mutex<Option<ModelRequest>>,
}

impl StubModel {
    fn with(behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            behaviour,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    pub fn returning(value: Value) -> Arc<Self> {
        Self::with(Behaviour::Return(value))
    }

    pub fn failing() -> Arc<Self> {
        Self::with(Behaviour::Fail)
    }

    pub fn hanging() -> Arc<Self> {
        Self::with(Behaviour::Hang)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<ModelRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelProvider for StubModel {
    async fn generate(&self, request: &ModelRequest) -> Result<Value, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        match &self.behaviour {
            Behaviour::Return(value) => Ok(value.clone()),
            Behaviour::Fail => Err(LlmError::Api {
                status: 529,
                message: "overloaded".to_string(),
            }),
            Behaviour::Hang => std::future::pending().await,
        }
    }
}

/// Document store that keeps every record in memory.
#[derive(Default)]
pub struct RecordingStore {
    records: Mutex<Vec<(String, InteractionRecord)>>,
}

impl RecordingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn records(&self) -> Vec<(String, InteractionRecord)> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentStore for RecordingStore {
    async fn create(&self, collection: &str, record: &InteractionRecord) -> Result<String, StoreError> {
        let mut records = self.records.lock().unwrap();
        records.push((collection.to_string(), record.clone()));
        Ok(format!("doc-{}", records.len()))
    }
}

/// Document store whose every write is rejected.
#[derive(Default)]
pub struct FailingStore {
    attempts: AtomicUsize,
}

impl FailingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for FailingStore {
    async fn create(&self, _collection: &str, _record: &InteractionRecord) -> Result<String, StoreError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let rejected = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        Err(StoreError::Serialization(rejected))
    }
}

/// A resume long enough to pass validation.
pub fn resume_text() -> String {
    "Computer science sophomore. Built a Rust CLI for parsing logs, \
     led a 4-person hackathon team, and tutored intro programming for two semesters."
        .to_string()
}

/// A PDF data URI whose decoded payload is `payload_len` bytes.
pub fn pdf_data_uri(payload_len: usize) -> String {
    let mut payload = b"%PDF-1.4\n".to_vec();
    payload.resize(payload_len.max(payload.len()), b'x');
    format!("data:application/pdf;base64,{}", STANDARD.encode(payload))
}
