#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use omni_search::{
    BackendError, BackendHit, Client, ClientConfig, Embedder, FullTextRequest, MemoryBackend,
    NearestRequest, ScriptSearchRequest, SearchBackend, TrigramRequest, VectorSearchRequest,
};

pub const SCHEMA: &str = "search";
pub const MODEL: &str = "mini";

/// Documents and `mini` embeddings shared by the integration tests.
pub async fn seeded_backend() -> Arc<MemoryBackend> {
    let backend = Arc::new(MemoryBackend::new(SCHEMA).unwrap());
    for (id, language, text) in [
        ("1", "en", "Two factor authentication"),
        ("2", "en", "Two factor backup codes"),
        ("3", "en", "Password reset guide"),
        ("4", "ja", "鬼滅の刃 東京 tokyo"),
        ("5", "ja", "東京タワー"),
    ] {
        backend
            .upsert_document("article", id, language, text)
            .await
            .unwrap();
    }
    for (id, language, vector) in [
        ("1", "en", [1.0, 0.0, 0.0]),
        ("2", "en", [0.8, 0.6, 0.0]),
        ("3", "en", [0.0, 0.0, 1.0]),
        ("4", "ja", [0.9, 0.1, 0.0]),
    ] {
        backend
            .upsert_embedding("article", id, MODEL, language, vector.to_vec())
            .await;
    }
    backend
}

pub fn lexical_client(backend: Arc<dyn SearchBackend>) -> Client {
    Client::new(ClientConfig::new(backend, SCHEMA)).unwrap()
}

pub fn semantic_client(backend: Arc<dyn SearchBackend>, embedder: Arc<dyn Embedder>) -> Client {
    Client::new(
        ClientConfig::new(backend, SCHEMA)
            .with_embedder(embedder)
            .with_default_model(MODEL),
    )
    .unwrap()
}

pub fn install_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// Embedder doubles
// ============================================================================

/// Returns a fixed vector and records every `(model, text)` call.
pub struct RecordingEmbedder {
    vector: Vec<f32>,
    calls: Mutex<Vec<(String, String)>>,
}

impl RecordingEmbedder {
    pub fn new(vector: Vec<f32>) -> Self {
        Self {
            vector,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Embedder for RecordingEmbedder {
    async fn embed_query_text(&self, model: &str, text: &str) -> Result<Vec<f32>, String> {
        self.calls
            .lock()
            .unwrap()
            .push((model.to_string(), text.to_string()));
        Ok(self.vector.clone())
    }
}

pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed_query_text(&self, _model: &str, _text: &str) -> Result<Vec<f32>, String> {
        Err("provider unavailable".to_string())
    }
}

// ============================================================================
// Backend double
// ============================================================================

/// How a [`CountingBackend`] misbehaves on one adapter method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    Fail(&'static str),
    Stall(&'static str),
}

/// Parameters of one adapter call as the client built them. Fields a method
/// does not take stay `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: &'static str,
    pub language: String,
    pub entity_types: Vec<String>,
    pub limit: usize,
    pub min_similarity: Option<f32>,
    pub prefix: Option<bool>,
    pub two_stage: Option<bool>,
    pub oversample_factor: Option<usize>,
}

impl RecordedCall {
    fn new(method: &'static str, language: &str, entity_types: &[String], limit: usize) -> Self {
        Self {
            method,
            language: language.to_string(),
            entity_types: entity_types.to_vec(),
            limit,
            min_similarity: None,
            prefix: None,
            two_stage: None,
            oversample_factor: None,
        }
    }
}

/// Wraps a [`MemoryBackend`], recording adapter calls in order.
pub struct CountingBackend {
    inner: Arc<MemoryBackend>,
    calls: Mutex<Vec<RecordedCall>>,
    fault: Option<Fault>,
}

impl CountingBackend {
    pub fn new(inner: Arc<MemoryBackend>) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
            fault: None,
        }
    }

    pub fn with_fault(mut self, fault: Fault) -> Self {
        self.fault = Some(fault);
        self
    }

    /// Method names in call order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().iter().map(|c| c.method).collect()
    }

    /// Recorded calls of one method, sorted by language.
    pub fn recorded(&self, method: &str) -> Vec<RecordedCall> {
        let mut calls: Vec<RecordedCall> = self
            .calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.method == method)
            .cloned()
            .collect();
        calls.sort_by(|a, b| a.language.cmp(&b.language));
        calls
    }

    async fn enter(&self, call: RecordedCall) -> Result<(), BackendError> {
        let method = call.method;
        self.calls.lock().unwrap().push(call);
        match self.fault {
            Some(Fault::Fail(name)) if name == method => {
                Err(BackendError::Other(format!("{method} unavailable")))
            }
            Some(Fault::Stall(name)) if name == method => {
                std::future::pending::<()>().await;
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl SearchBackend for CountingBackend {
    async fn full_text_search(
        &self,
        request: FullTextRequest<'_>,
    ) -> Result<Vec<BackendHit>, BackendError> {
        self.enter(RecordedCall::new(
            "full_text_search",
            request.language,
            request.entity_types,
            request.limit,
        ))
        .await?;
        self.inner.full_text_search(request).await
    }

    async fn trigram_search(
        &self,
        request: TrigramRequest<'_>,
    ) -> Result<Vec<BackendHit>, BackendError> {
        self.enter(RecordedCall {
            min_similarity: Some(request.min_similarity),
            ..RecordedCall::new(
                "trigram_search",
                request.language,
                request.entity_types,
                request.limit,
            )
        })
        .await?;
        self.inner.trigram_search(request).await
    }

    async fn script_search(
        &self,
        request: ScriptSearchRequest<'_>,
    ) -> Result<Vec<BackendHit>, BackendError> {
        self.enter(RecordedCall {
            prefix: Some(request.prefix),
            ..RecordedCall::new(
                "script_search",
                request.language,
                request.entity_types,
                request.limit,
            )
        })
        .await?;
        self.inner.script_search(request).await
    }

    async fn vector_search(
        &self,
        request: VectorSearchRequest<'_>,
    ) -> Result<Vec<BackendHit>, BackendError> {
        self.enter(RecordedCall {
            two_stage: Some(request.two_stage),
            oversample_factor: Some(request.oversample_factor),
            ..RecordedCall::new(
                "vector_search",
                request.language,
                request.entity_types,
                request.limit,
            )
        })
        .await?;
        self.inner.vector_search(request).await
    }

    async fn nearest_to_entity(
        &self,
        request: NearestRequest<'_>,
    ) -> Result<Vec<BackendHit>, BackendError> {
        self.enter(RecordedCall {
            min_similarity: Some(request.min_similarity),
            ..RecordedCall::new(
                "nearest_to_entity",
                request.language,
                request.entity_types,
                request.limit,
            )
        })
        .await?;
        self.inner.nearest_to_entity(request).await
    }
}
