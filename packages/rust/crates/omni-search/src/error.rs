//! Error types for search orchestration.

use thiserror::Error;

/// Result alias used across the crate.
pub type SearchResult<T> = Result<T, SearchError>;

/// Errors raised by backend adapters.
///
/// The orchestrator never retries or suppresses these; a single failing
/// adapter call fails the whole request.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The adapter cannot evaluate the supplied filter fragment.
    #[error("unsupported filter: {0}")]
    UnsupportedFilter(String),

    /// The request is malformed from the adapter's point of view.
    #[error("invalid backend request: {0}")]
    InvalidRequest(String),

    /// Query vector and stored vector dimensions disagree.
    #[error("invalid dimension: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension
        expected: usize,
        /// Actual dimension
        actual: usize,
    },

    /// In-process full-text index failure.
    #[error("full-text index error: {0}")]
    FullText(#[from] tantivy::TantivyError),

    /// Any other adapter failure (connection, query execution, ...).
    #[error("{0}")]
    Other(String),
}

/// Errors for `Search`, `Typeahead` and `SimilarTo` requests.
#[derive(Error, Debug)]
pub enum SearchError {
    /// Client constructed without a backend handle.
    #[error("Backend is required")]
    MissingBackend,

    /// Client constructed without a schema name.
    #[error("Schema is required")]
    MissingSchema,

    /// Semantic search requested but no embedder is configured.
    #[error("Embedder is required for semantic search")]
    MissingEmbedder,

    /// Semantic or similarity search requested without a resolvable model.
    #[error("Model is required for {0}")]
    MissingModel(&'static str),

    /// The active mode needs an entity-type filter that was not supplied.
    #[error("{field} is required for {mode}")]
    MissingEntityTypes {
        /// Option field the caller must populate
        field: &'static str,
        /// Mode that requires it
        mode: &'static str,
    },

    /// `SimilarTo` called with an empty entity type or id.
    #[error("entity_type and entity_id are required")]
    MissingEntity,

    /// Unrecognized search mode.
    #[error("invalid SearchOptions.Mode {0:?}")]
    InvalidSearchMode(String),

    /// Unrecognized language-fallback mode.
    #[error("invalid {field}.LanguageMode {value:?}")]
    InvalidLanguageMode {
        /// Options struct carrying the bad value
        field: &'static str,
        /// The rejected value
        value: String,
    },

    /// Backend adapter failure, propagated verbatim.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// Embedding provider failure.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// The caller's cancellation token fired before the request completed.
    #[error("search cancelled")]
    Cancelled,

    /// Settings file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file could not be parsed.
    #[error("settings parse error: {0}")]
    Settings(#[from] serde_yaml::Error),
}

impl SearchError {
    /// True for errors caused by request options rather than configuration
    /// or backend failures.
    #[must_use]
    pub fn is_invalid_option(&self) -> bool {
        matches!(
            self,
            Self::InvalidSearchMode(_) | Self::InvalidLanguageMode { .. }
        )
    }
}
