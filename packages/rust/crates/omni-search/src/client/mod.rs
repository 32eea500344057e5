//! Request orchestration: `search`, `typeahead` and `similar_to`.
//!
//! ```text
//! client/
//! ├── mod.rs        # Client construction and cancellation guard
//! ├── search.rs     # Hybrid search (routing, fan-out, RRF)
//! ├── typeahead.rs  # Interactive suggestions (max-score merge)
//! └── similar.rs    # Nearest neighbors of an existing entity
//! ```

mod search;
mod similar;
mod typeahead;

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::backend::SearchBackend;
use crate::config::{ClientConfig, ClientDefaults};
use crate::embedder::Embedder;
use crate::error::{SearchError, SearchResult};

pub use search::SearchHit;
pub use similar::SimilarHit;

// ============================================================================
// Client
// ============================================================================

/// Hybrid search client.
///
/// Cheap to clone; clones share the backend, the embedder and the defaults.
/// Defaults are fixed at construction and never mutated, so one client can
/// serve concurrent requests without locking.
#[derive(Clone)]
pub struct Client {
    backend: Arc<dyn SearchBackend>,
    schema: String,
    embedder: Option<Arc<dyn Embedder>>,
    defaults: Arc<ClientDefaults>,
}

impl Client {
    /// Build a client from its configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Backend handle, schema and defaults. Zero/empty defaults
    ///   fall back to the crate constants (`en`, limit 20, RRF-k 60,
    ///   oversample 4).
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::MissingBackend`] or [`SearchError::MissingSchema`].
    pub fn new(config: ClientConfig) -> SearchResult<Self> {
        let defaults = ClientDefaults::from_config(&config);
        let Some(backend) = config.backend else {
            tracing::warn!(
                event = "search.client.rejected",
                reason = "backend",
                "client config has no backend"
            );
            return Err(SearchError::MissingBackend);
        };
        let schema = config.schema.trim().to_string();
        if schema.is_empty() {
            tracing::warn!(
                event = "search.client.rejected",
                reason = "schema",
                "client config has no schema"
            );
            return Err(SearchError::MissingSchema);
        }

        tracing::debug!(
            event = "search.client.created",
            schema = %schema,
            language = %defaults.language,
            model = %defaults.model,
            limit = defaults.limit,
            rrf_k = defaults.rrf_k,
            two_stage = defaults.two_stage,
            oversample_factor = defaults.oversample_factor,
            has_embedder = config.embedder.is_some(),
            "search client created"
        );

        Ok(Self {
            backend,
            schema,
            embedder: config.embedder,
            defaults: Arc::new(defaults),
        })
    }

    /// Storage schema every request targets.
    #[must_use]
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Resolved client defaults.
    #[must_use]
    pub fn defaults(&self) -> &ClientDefaults {
        &self.defaults
    }

    /// True when semantic search is available.
    #[must_use]
    pub fn has_embedder(&self) -> bool {
        self.embedder.is_some()
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("schema", &self.schema)
            .field("has_embedder", &self.embedder.is_some())
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

/// Run `work` unless `cancel` fires first; cancellation drops the in-flight
/// backend calls.
async fn guarded<T, F>(
    cancel: &CancellationToken,
    operation: &'static str,
    work: F,
) -> SearchResult<T>
where
    F: Future<Output = SearchResult<T>>,
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => {
            tracing::debug!(event = "search.request.cancelled", operation, "search request cancelled");
            Err(SearchError::Cancelled)
        }
        result = work => result,
    }
}
