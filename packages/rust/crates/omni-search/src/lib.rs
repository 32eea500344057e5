//! omni-search - Hybrid retrieval orchestration
//!
//! # Architecture
//!
//! ```text
//! omni-search/src/
//! ├── lib.rs         # Re-exports
//! ├── error.rs       # SearchError / BackendError
//! ├── normalize.rs   # Query normalization (embedding vs full-text variants)
//! ├── script.rs      # CJK language / script predicates
//! ├── routing.rs     # Lexical backend routing
//! ├── language.rs    # Language fallback policy
//! ├── fusion/        # Reciprocal Rank Fusion
//! ├── typeahead.rs   # Max-score suggestion merge
//! ├── backend.rs     # SearchBackend adapter contract
//! ├── embedder.rs    # Embedder capability
//! ├── options.rs     # Per-request options
//! ├── config.rs      # ClientConfig, ClientDefaults, SearchSettings
//! ├── client/        # Client: search, typeahead, similar_to
//! └── memory/        # In-process MemoryBackend
//! ```
//!
//! A [`Client`] never computes textual similarity itself: it normalizes the
//! query, decides which [`SearchBackend`] strategies apply for each
//! language, fans out, and fuses the ranked lists with RRF.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use omni_search::{Client, ClientConfig, MemoryBackend, SearchMode, SearchOptions};
//!
//! # async fn run() -> omni_search::SearchResult<()> {
//! let backend = Arc::new(MemoryBackend::new("search")?);
//! backend
//!     .upsert_document("article", "1", "en", "Two factor authentication")
//!     .await?;
//!
//! let client = Client::new(ClientConfig::new(backend, "search"))?;
//! let opts = SearchOptions::default()
//!     .with_mode(SearchMode::Lexical)
//!     .with_entity_types(["article"]);
//! let hits = client.search("two-factor", &opts).await?;
//! assert_eq!(hits[0].entity_id, "1");
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod client;
pub mod config;
pub mod embedder;
pub mod error;
pub mod fusion;
pub mod language;
pub mod memory;
pub mod normalize;
pub mod options;
pub mod routing;
pub mod script;
pub mod typeahead;

// ============================================================================
// Re-exports
// ============================================================================

pub use backend::{
    BackendHit, FilterArgs, FullTextRequest, NearestRequest, ScriptSearchRequest, SearchBackend,
    SqlFilter, TrigramRequest, VectorSearchRequest,
};
pub use client::{Client, SearchHit, SimilarHit};
pub use config::{ClientConfig, ClientDefaults, SearchSettings};
pub use embedder::Embedder;
pub use error::{BackendError, SearchError, SearchResult};
pub use fusion::{FusedHit, RankedKey, RankedList, fuse_rrf};
pub use language::{LanguageMode, resolve_languages};
pub use memory::MemoryBackend;
pub use normalize::{is_noop_query, normalize_for_embedding, normalize_for_fts};
pub use options::{SearchMode, SearchOptions, SimilarOptions, TypeaheadOptions};
pub use routing::{LexicalRoute, RouteMode, lexical_route};
pub use tokio_util::sync::CancellationToken;
pub use typeahead::{TypeaheadHit, TypeaheadMerge};
