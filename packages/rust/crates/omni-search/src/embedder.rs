//! Query embedding capability.

use async_trait::async_trait;

/// Turns query text into a vector for a named model.
///
/// Any provider (hosted API, local model) can implement this. An empty
/// vector means "no results" and is not an error.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed `text` with `model`.
    ///
    /// # Errors
    ///
    /// Returns a provider-specific message when embedding fails.
    async fn embed_query_text(&self, model: &str, text: &str) -> Result<Vec<f32>, String>;
}
