//! Backend adapter contract.
//!
//! Each adapter executes one retrieval strategy inside the storage engine
//! and returns hits best first, without duplicate keys. The orchestrator
//! composes adapters; it never computes textual similarity itself.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::BackendError;
use crate::fusion::{RankedKey, RankedList};

/// Named arguments referenced by a [`SqlFilter`] fragment.
pub type FilterArgs = BTreeMap<String, serde_json::Value>;

/// Host-supplied constraint appended to every backend query as
/// `... AND (<sql>)`.
///
/// The fragment is trusted: it is never inspected or rewritten here, and must
/// not be built from unsanitized user input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SqlFilter {
    /// Trusted SQL fragment; empty means no filter.
    #[serde(default)]
    pub sql: String,
    /// Named arguments used by `sql`.
    #[serde(default)]
    pub args: FilterArgs,
}

impl SqlFilter {
    /// Filter with a fragment and no arguments.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            args: FilterArgs::new(),
        }
    }

    /// Add one named argument.
    #[must_use]
    pub fn arg(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.args.insert(name.into(), value.into());
        self
    }

    /// True when no fragment is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sql.trim().is_empty()
    }
}

/// One ranked hit returned by an adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendHit {
    /// Entity type
    pub entity_type: String,
    /// Entity id
    pub entity_id: String,
    /// Document language
    pub language: String,
    /// Backend-native score (scale differs per backend)
    pub score: f32,
}

impl BackendHit {
    /// Build a hit.
    pub fn new(
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
        language: impl Into<String>,
        score: f32,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
            language: language.into(),
            score,
        }
    }

    /// Fusion identity of this hit.
    #[must_use]
    pub fn key(&self) -> RankedKey {
        RankedKey::new(&self.entity_type, &self.entity_id, &self.language)
    }

    pub(crate) fn into_parts(self) -> (RankedKey, f32) {
        (
            RankedKey {
                entity_type: self.entity_type,
                entity_id: self.entity_id,
                language: self.language,
            },
            self.score,
        )
    }
}

/// Strip scores from an adapter result, keeping its order.
///
/// A key repeated by the adapter keeps only its first (best) rank.
#[must_use]
pub fn into_ranked_list(hits: Vec<BackendHit>) -> RankedList {
    let mut seen = HashSet::with_capacity(hits.len());
    hits.into_iter()
        .map(|hit| hit.into_parts().0)
        .filter(|key| seen.insert(key.clone()))
        .collect()
}

/// Language-aware full-text search request.
#[derive(Debug, Clone)]
pub struct FullTextRequest<'a> {
    /// Storage schema
    pub schema: &'a str,
    /// Query normalized for embeddings; the adapter applies FTS normalization.
    pub query: &'a str,
    /// Document language
    pub language: &'a str,
    /// Entity types to search (non-empty)
    pub entity_types: &'a [String],
    /// Maximum hits
    pub limit: usize,
    /// Host filter
    pub filter: &'a SqlFilter,
}

/// Fuzzy trigram search request.
#[derive(Debug, Clone)]
pub struct TrigramRequest<'a> {
    /// Storage schema
    pub schema: &'a str,
    /// Normalized query
    pub query: &'a str,
    /// Document language
    pub language: &'a str,
    /// Entity types to search
    pub entity_types: &'a [String],
    /// Maximum hits
    pub limit: usize,
    /// Hits below this similarity are dropped by the adapter.
    pub min_similarity: f32,
    /// Host filter
    pub filter: &'a SqlFilter,
}

/// CJK n-gram (script-aware) search request.
#[derive(Debug, Clone)]
pub struct ScriptSearchRequest<'a> {
    /// Storage schema
    pub schema: &'a str,
    /// Normalized query
    pub query: &'a str,
    /// Document language
    pub language: &'a str,
    /// Entity types to search
    pub entity_types: &'a [String],
    /// Maximum hits
    pub limit: usize,
    /// Trailing-wildcard matching for interactive use.
    pub prefix: bool,
    /// Host filter
    pub filter: &'a SqlFilter,
}

/// Nearest-neighbor search over a model's embedding space.
#[derive(Debug, Clone)]
pub struct VectorSearchRequest<'a> {
    /// Storage schema
    pub schema: &'a str,
    /// Query embedding
    pub embedding: &'a [f32],
    /// Embedding model name
    pub model: &'a str,
    /// Document language
    pub language: &'a str,
    /// Entity types to search
    pub entity_types: &'a [String],
    /// Maximum hits
    pub limit: usize,
    /// Approximate first pass over `oversample_factor * limit` candidates,
    /// then exact re-rank.
    pub two_stage: bool,
    /// First-stage candidate multiplier (positive).
    pub oversample_factor: usize,
    /// Host filter
    pub filter: &'a SqlFilter,
}

impl VectorSearchRequest<'_> {
    /// Size of the first-stage candidate set.
    #[must_use]
    pub fn candidate_count(&self) -> usize {
        if self.two_stage {
            self.limit.saturating_mul(self.oversample_factor.max(1))
        } else {
            self.limit
        }
    }
}

/// Similarity relative to an existing entity's stored embedding.
#[derive(Debug, Clone)]
pub struct NearestRequest<'a> {
    /// Storage schema
    pub schema: &'a str,
    /// Anchor entity type
    pub entity_type: &'a str,
    /// Anchor entity id
    pub entity_id: &'a str,
    /// Embedding model name
    pub model: &'a str,
    /// Document language
    pub language: &'a str,
    /// Entity types to return (empty = any)
    pub entity_types: &'a [String],
    /// Maximum hits
    pub limit: usize,
    /// Ids never returned
    pub exclude_ids: &'a [String],
    /// Hits below this similarity are dropped (0 disables).
    pub min_similarity: f32,
    /// Host filter
    pub filter: &'a SqlFilter,
}

/// Retrieval backends consumed by [`crate::Client`].
///
/// Implementations hold the connection handle; every method must be safe to
/// call concurrently for one request.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Full-text relevance ranking; empty when nothing matches.
    async fn full_text_search(
        &self,
        request: FullTextRequest<'_>,
    ) -> Result<Vec<BackendHit>, BackendError>;

    /// Typo-tolerant trigram ranking.
    async fn trigram_search(
        &self,
        request: TrigramRequest<'_>,
    ) -> Result<Vec<BackendHit>, BackendError>;

    /// CJK n-gram ranking.
    async fn script_search(
        &self,
        request: ScriptSearchRequest<'_>,
    ) -> Result<Vec<BackendHit>, BackendError>;

    /// Embedding nearest-neighbor ranking.
    async fn vector_search(
        &self,
        request: VectorSearchRequest<'_>,
    ) -> Result<Vec<BackendHit>, BackendError>;

    /// Entities nearest to an existing entity's embedding.
    async fn nearest_to_entity(
        &self,
        request: NearestRequest<'_>,
    ) -> Result<Vec<BackendHit>, BackendError>;
}
