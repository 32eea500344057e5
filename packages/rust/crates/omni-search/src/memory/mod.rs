//! In-process reference implementation of [`SearchBackend`].
//!
//! Holds documents and embeddings in memory and answers every adapter call
//! with the same ranking rules a database-backed adapter follows: best
//! first, ties by entity type, id and language, no duplicate keys. Useful
//! for tests, demos and small corpora. Full-text search runs on an in-RAM
//! tantivy index with BM25 ranking.
//!
//! Filter fragments are opaque here too: a [`SqlFilter`] is honored only if
//! a predicate was registered under exactly that fragment with
//! [`MemoryBackend::register_filter`].

mod fulltext;
mod ngram;
mod trigram;
mod vector;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::backend::{
    BackendHit, FilterArgs, FullTextRequest, NearestRequest, ScriptSearchRequest, SearchBackend,
    SqlFilter, TrigramRequest, VectorSearchRequest,
};
use crate::error::BackendError;
use crate::fusion::RankedKey;

pub use fulltext::normalize_fts_score;
pub use ngram::{build_prefix_query, normalize_ngram_score};

use fulltext::TextIndex;
use ngram::NgramQuery;
use vector::{Candidate, QuantizedVector};

/// `k` used to normalize raw n-gram scores.
const NGRAM_SCORE_K: f32 = 1.0;

/// Predicate standing in for a registered filter fragment.
pub type FilterPredicate = Arc<dyn Fn(&RankedKey, &FilterArgs) -> bool + Send + Sync>;

struct IndexedDocument {
    key: RankedKey,
    text_lower: String,
    latin_words: Vec<String>,
    trigrams: HashSet<String>,
}

impl IndexedDocument {
    fn new(key: RankedKey, text: &str) -> Self {
        let text_lower = text.to_lowercase();
        Self {
            latin_words: ngram::latin_words(&text_lower),
            trigrams: trigram::trigrams(text),
            text_lower,
            key,
        }
    }
}

struct StoredEmbedding {
    exact: Vec<f32>,
    quantized: QuantizedVector,
}

struct Store {
    documents: BTreeMap<RankedKey, IndexedDocument>,
    text_index: TextIndex,
    /// `(model, key) -> embedding`
    embeddings: BTreeMap<(String, RankedKey), StoredEmbedding>,
    filters: HashMap<String, FilterPredicate>,
}

impl Store {
    /// Resolve a request filter to a predicate; `None` means "no filter".
    fn filter(&self, filter: &SqlFilter) -> Result<Option<FilterPredicate>, BackendError> {
        if filter.is_empty() {
            return Ok(None);
        }
        self.filters
            .get(filter.sql.trim())
            .cloned()
            .map(Some)
            .ok_or_else(|| BackendError::UnsupportedFilter(filter.sql.clone()))
    }
}

/// In-memory backend for one schema.
pub struct MemoryBackend {
    schema: String,
    store: RwLock<Store>,
}

impl MemoryBackend {
    /// Empty backend answering requests for `schema`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::FullText`] when the full-text index cannot be opened.
    pub fn new(schema: impl Into<String>) -> Result<Self, BackendError> {
        let store = Store {
            documents: BTreeMap::new(),
            text_index: TextIndex::new()?,
            embeddings: BTreeMap::new(),
            filters: HashMap::new(),
        };
        Ok(Self {
            schema: schema.into(),
            store: RwLock::new(store),
        })
    }

    /// Schema this backend answers for.
    #[must_use]
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Insert or replace the document for `(entity_type, entity_id, language)`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::FullText`] when the text cannot be indexed.
    pub async fn upsert_document(
        &self,
        entity_type: &str,
        entity_id: &str,
        language: &str,
        text: &str,
    ) -> Result<(), BackendError> {
        let key = RankedKey::new(entity_type, entity_id, language.trim().to_lowercase());
        let mut store = self.store.write().await;
        store.text_index.upsert(&key, text)?;
        let document = IndexedDocument::new(key.clone(), text);
        store.documents.insert(key, document);
        Ok(())
    }

    /// Insert or replace the embedding for `(entity_type, entity_id, model, language)`.
    pub async fn upsert_embedding(
        &self,
        entity_type: &str,
        entity_id: &str,
        model: &str,
        language: &str,
        embedding: Vec<f32>,
    ) {
        let key = RankedKey::new(entity_type, entity_id, language.trim().to_lowercase());
        let stored = StoredEmbedding {
            quantized: QuantizedVector::quantize(&embedding),
            exact: embedding,
        };
        self.store
            .write()
            .await
            .embeddings
            .insert((model.to_string(), key), stored);
    }

    /// Remove every document and embedding of one entity.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::FullText`] when the text index rejects the delete.
    pub async fn remove_entity(
        &self,
        entity_type: &str,
        entity_id: &str,
    ) -> Result<(), BackendError> {
        let mut store = self.store.write().await;
        store.text_index.remove_entity(entity_type, entity_id)?;
        store
            .documents
            .retain(|key, _| !(key.entity_type == entity_type && key.entity_id == entity_id));
        store
            .embeddings
            .retain(|(_, key), _| !(key.entity_type == entity_type && key.entity_id == entity_id));
        Ok(())
    }

    /// Register the predicate evaluated for filter fragment `sql`.
    pub async fn register_filter<F>(&self, sql: &str, predicate: F)
    where
        F: Fn(&RankedKey, &FilterArgs) -> bool + Send + Sync + 'static,
    {
        self.store
            .write()
            .await
            .filters
            .insert(sql.trim().to_string(), Arc::new(predicate));
    }

    /// Number of stored documents.
    pub async fn document_count(&self) -> usize {
        self.store.read().await.documents.len()
    }

    fn check_schema(&self, schema: &str) -> Result<(), BackendError> {
        if schema.trim() == self.schema {
            Ok(())
        } else {
            Err(BackendError::InvalidRequest(format!(
                "unknown schema {schema:?}"
            )))
        }
    }

    /// Score every eligible document of one language and rank the matches.
    async fn scan_documents<F>(
        &self,
        schema: &str,
        language: &str,
        entity_types: &[String],
        limit: usize,
        filter: &SqlFilter,
        score: F,
    ) -> Result<Vec<BackendHit>, BackendError>
    where
        F: Fn(&IndexedDocument) -> Option<f32>,
    {
        self.check_schema(schema)?;
        if limit == 0 {
            return Ok(Vec::new());
        }
        let store = self.store.read().await;
        let predicate = store.filter(filter)?;

        let hits = store
            .documents
            .values()
            .filter(|doc| doc.key.language == language)
            .filter(|doc| type_allowed(entity_types, &doc.key.entity_type))
            .filter(|doc| predicate.as_ref().is_none_or(|p| p(&doc.key, &filter.args)))
            .filter_map(|doc| score(doc).map(|s| hit(&doc.key, s)))
            .collect();
        Ok(rank_hits(hits, limit))
    }
}

impl std::fmt::Debug for MemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBackend")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

fn type_allowed(entity_types: &[String], entity_type: &str) -> bool {
    entity_types.is_empty() || entity_types.iter().any(|t| t == entity_type)
}

fn hit(key: &RankedKey, score: f32) -> BackendHit {
    BackendHit::new(&key.entity_type, &key.entity_id, &key.language, score)
}

/// Score desc, then entity type, id, language; truncate to `limit`.
fn rank_hits(mut hits: Vec<BackendHit>, limit: usize) -> Vec<BackendHit> {
    hits.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.entity_type.cmp(&b.entity_type))
            .then_with(|| a.entity_id.cmp(&b.entity_id))
            .then_with(|| a.language.cmp(&b.language))
    });
    hits.truncate(limit);
    hits
}

#[async_trait]
impl SearchBackend for MemoryBackend {
    async fn full_text_search(
        &self,
        request: FullTextRequest<'_>,
    ) -> Result<Vec<BackendHit>, BackendError> {
        self.check_schema(request.schema)?;
        if request.limit == 0 {
            return Ok(Vec::new());
        }
        let store = self.store.read().await;
        let predicate = store.filter(request.filter)?;

        let hits = store
            .text_index
            .search(request.query, request.language)?
            .into_iter()
            .filter(|(key, _)| type_allowed(request.entity_types, &key.entity_type))
            .filter(|(key, _)| {
                predicate
                    .as_ref()
                    .is_none_or(|p| p(key, &request.filter.args))
            })
            .map(|(key, raw)| hit(&key, normalize_fts_score(raw)))
            .collect();
        Ok(rank_hits(hits, request.limit))
    }

    async fn trigram_search(
        &self,
        request: TrigramRequest<'_>,
    ) -> Result<Vec<BackendHit>, BackendError> {
        let query = trigram::trigrams(request.query);
        let min_similarity = request.min_similarity;
        self.scan_documents(
            request.schema,
            request.language,
            request.entity_types,
            request.limit,
            request.filter,
            |doc| {
                let score = trigram::similarity(&query, &doc.trigrams);
                (score > 0.0 && score >= min_similarity).then_some(score)
            },
        )
        .await
    }

    async fn script_search(
        &self,
        request: ScriptSearchRequest<'_>,
    ) -> Result<Vec<BackendHit>, BackendError> {
        let query = NgramQuery::parse(request.query, request.prefix);
        self.scan_documents(
            request.schema,
            request.language,
            request.entity_types,
            request.limit,
            request.filter,
            |doc| {
                query
                    .score(&doc.text_lower, &doc.latin_words)
                    .map(|raw| normalize_ngram_score(raw, NGRAM_SCORE_K))
            },
        )
        .await
    }

    async fn vector_search(
        &self,
        request: VectorSearchRequest<'_>,
    ) -> Result<Vec<BackendHit>, BackendError> {
        self.check_schema(request.schema)?;
        if request.limit == 0 || request.embedding.is_empty() {
            return Ok(Vec::new());
        }
        let store = self.store.read().await;
        let predicate = store.filter(request.filter)?;
        let dimensions = request.embedding.len();

        let mut skipped = 0_usize;
        let mut candidates = Vec::new();
        for ((model, key), stored) in &store.embeddings {
            if model != request.model
                || key.language != request.language
                || !type_allowed(request.entity_types, &key.entity_type)
                || !predicate
                    .as_ref()
                    .is_none_or(|p| p(key, &request.filter.args))
            {
                continue;
            }
            if stored.exact.len() != dimensions {
                skipped += 1;
                continue;
            }
            candidates.push(Candidate {
                item: key,
                exact: &stored.exact,
                quantized: &stored.quantized,
            });
        }
        if skipped > 0 {
            tracing::debug!(
                event = "search.memory.vector.dimension_skipped",
                model = request.model,
                expected = dimensions,
                skipped,
                "skipped stored embeddings with a different dimension"
            );
        }

        let candidate_count = request.two_stage.then(|| request.candidate_count());
        let hits = vector::rank_candidates(request.embedding, candidates, candidate_count)
            .into_iter()
            .map(|(key, score)| hit(key, score))
            .collect();
        Ok(rank_hits(hits, request.limit))
    }

    async fn nearest_to_entity(
        &self,
        request: NearestRequest<'_>,
    ) -> Result<Vec<BackendHit>, BackendError> {
        self.check_schema(request.schema)?;
        if request.limit == 0 {
            return Ok(Vec::new());
        }
        let store = self.store.read().await;
        let predicate = store.filter(request.filter)?;

        let anchor_key = RankedKey::new(request.entity_type, request.entity_id, request.language);
        let Some(anchor) = store
            .embeddings
            .get(&(request.model.to_string(), anchor_key))
        else {
            return Ok(Vec::new());
        };

        let hits = store
            .embeddings
            .iter()
            .filter(|((model, key), _)| {
                model == request.model
                    && key.language == request.language
                    && !(key.entity_type == request.entity_type
                        && key.entity_id == request.entity_id)
                    && !request.exclude_ids.iter().any(|id| *id == key.entity_id)
                    && type_allowed(request.entity_types, &key.entity_type)
                    && predicate
                        .as_ref()
                        .is_none_or(|p| p(key, &request.filter.args))
            })
            .filter_map(|((_, key), stored)| {
                let score = vector::cosine_similarity(&anchor.exact, &stored.exact);
                let keep = request.min_similarity <= 0.0 || score >= request.min_similarity;
                keep.then(|| hit(key, score))
            })
            .collect();
        Ok(rank_hits(hits, request.limit))
    }
}
