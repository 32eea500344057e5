//! Entities similar to an existing one, by stored embedding.

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::{Client, guarded};
use crate::backend::NearestRequest;
use crate::error::{SearchError, SearchResult};
use crate::options::{SimilarOptions, dedup_trimmed};

/// One nearest-neighbor result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarHit {
    /// Entity type
    pub entity_type: String,
    /// Entity id
    pub entity_id: String,
    /// Embedding model the similarity was computed in
    pub model: String,
    /// Document language
    pub language: String,
    /// Cosine similarity to the anchor entity
    pub score: f32,
}

impl Client {
    /// Entities nearest to `(entity_type, entity_id)` in the model's
    /// embedding space. No routing or fusion: the backend ranking is
    /// returned as is. The anchor itself is never returned.
    ///
    /// # Errors
    ///
    /// [`SearchError::MissingEntity`], [`SearchError::MissingModel`], or the
    /// backend failure.
    pub async fn similar_to(
        &self,
        entity_type: &str,
        entity_id: &str,
        opts: &SimilarOptions,
    ) -> SearchResult<Vec<SimilarHit>> {
        self.similar_to_with_cancel(entity_type, entity_id, opts, &CancellationToken::new())
            .await
    }

    /// [`Client::similar_to`] that aborts with [`SearchError::Cancelled`]
    /// once `cancel` fires.
    ///
    /// # Errors
    ///
    /// Same as [`Client::similar_to`], plus [`SearchError::Cancelled`].
    pub async fn similar_to_with_cancel(
        &self,
        entity_type: &str,
        entity_id: &str,
        opts: &SimilarOptions,
        cancel: &CancellationToken,
    ) -> SearchResult<Vec<SimilarHit>> {
        let entity_type = entity_type.trim();
        let entity_id = entity_id.trim();
        if entity_type.is_empty() || entity_id.is_empty() {
            return Err(SearchError::MissingEntity);
        }
        let model = self
            .defaults
            .model_or_default(&opts.model)
            .ok_or(SearchError::MissingModel("similarity search"))?;
        let language = self.defaults.language_or_default(&opts.language).to_lowercase();
        let limit = self.defaults.limit_or_default(opts.limit);
        let entity_types = dedup_trimmed(&opts.entity_types);
        let exclude_ids = dedup_trimmed(&opts.exclude_ids);

        let request = NearestRequest {
            schema: &self.schema,
            entity_type,
            entity_id,
            model,
            language: &language,
            entity_types: &entity_types,
            limit,
            exclude_ids: &exclude_ids,
            min_similarity: opts.min_similarity,
            filter: &opts.filter,
        };
        let hits = guarded(cancel, "similar_to", async {
            Ok(self.backend.nearest_to_entity(request).await?)
        })
        .await?;

        tracing::debug!(
            event = "search.similar.done",
            entity_type,
            entity_id,
            model,
            language = %language,
            returned = hits.len(),
            "similar entities returned"
        );
        Ok(hits
            .into_iter()
            .map(|hit| SimilarHit {
                entity_type: hit.entity_type,
                entity_id: hit.entity_id,
                model: model.to_string(),
                language: hit.language,
                score: hit.score,
            })
            .collect())
    }
}
