//! Per-request options for `Search`, `Typeahead` and `SimilarTo`.
//!
//! Mode fields are kept as text so raw caller input reaches validation;
//! use the `with_*` helpers to set them from the typed enums.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::backend::SqlFilter;
use crate::language::LanguageMode;

/// Which retrieval signals a `Search` request uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Lexical backends only.
    Lexical,
    /// Vector search only.
    Semantic,
    /// Both, fused.
    #[default]
    Dual,
}

impl SearchMode {
    /// Wire name of the mode.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lexical => "lexical",
            Self::Semantic => "semantic",
            Self::Dual => "dual",
        }
    }

    /// Parse an optional textual mode; empty means [`SearchMode::Dual`].
    ///
    /// # Errors
    ///
    /// Returns the rejected value when it names no known mode.
    pub fn parse_optional(value: &str) -> Result<Self, String> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(Self::Dual);
        }
        trimmed.parse()
    }

    /// True for lexical and dual.
    #[must_use]
    pub fn uses_lexical(self) -> bool {
        matches!(self, Self::Lexical | Self::Dual)
    }

    /// True for semantic and dual.
    #[must_use]
    pub fn uses_semantic(self) -> bool {
        matches!(self, Self::Semantic | Self::Dual)
    }
}

impl FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lexical" => Ok(Self::Lexical),
            "semantic" => Ok(Self::Semantic),
            "dual" => Ok(Self::Dual),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for [`crate::Client::search`]. Zero/empty fields fall back to client defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Requested language (client default when empty).
    pub language: String,
    /// `exact` (default) or `fallback_en`.
    pub language_mode: String,
    /// `lexical`, `semantic` or `dual` (default).
    pub mode: String,
    /// Seeds both lexical and semantic filters unless either is set explicitly.
    pub entity_types: Vec<String>,
    /// Entity types for lexical backends.
    pub lexical_entity_types: Vec<String>,
    /// Entity types for vector search.
    pub semantic_entity_types: Vec<String>,
    /// Maximum results.
    pub limit: usize,
    /// Embedding model override.
    pub model: String,
    /// Two-stage vector retrieval override.
    pub two_stage: Option<bool>,
    /// First-stage candidate multiplier.
    pub oversample_factor: usize,
    /// RRF smoothing constant.
    pub rrf_k: u32,
    /// Host filter applied by every backend.
    pub filter: SqlFilter,
}

impl SearchOptions {
    /// Set the search mode.
    #[must_use]
    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode.as_str().to_string();
        self
    }

    /// Set the language fallback mode.
    #[must_use]
    pub fn with_language_mode(mut self, mode: LanguageMode) -> Self {
        self.language_mode = mode.as_str().to_string();
        self
    }

    /// Set the requested language.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Set the combined entity-type filter.
    #[must_use]
    pub fn with_entity_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entity_types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Set the result limit.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// Options for [`crate::Client::typeahead`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeaheadOptions {
    /// Requested language (client default when empty).
    pub language: String,
    /// `exact` (default) or `fallback_en`.
    pub language_mode: String,
    /// Entity types to suggest (required).
    pub entity_types: Vec<String>,
    /// Maximum suggestions (10 when zero).
    pub limit: usize,
    /// Trigram threshold; also drops weaker CJK hits when positive.
    pub min_similarity: f32,
    /// Host filter applied by every backend.
    pub filter: SqlFilter,
}

impl TypeaheadOptions {
    /// Set the language fallback mode.
    #[must_use]
    pub fn with_language_mode(mut self, mode: LanguageMode) -> Self {
        self.language_mode = mode.as_str().to_string();
        self
    }
}

/// Options for [`crate::Client::similar_to`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarOptions {
    /// Language (client default when empty).
    pub language: String,
    /// Embedding model (client default when empty).
    pub model: String,
    /// Maximum results.
    pub limit: usize,
    /// Entity types to return (empty = any).
    pub entity_types: Vec<String>,
    /// Ids never returned.
    pub exclude_ids: Vec<String>,
    /// Similarity floor (0 disables).
    pub min_similarity: f32,
    /// Host filter.
    pub filter: SqlFilter,
}

/// Trim, drop empties and deduplicate, keeping first-seen order.
///
/// ```
/// use omni_search::options::dedup_trimmed;
///
/// let types = vec![" gallery".to_string(), String::new(), "gallery".to_string(), "video".to_string()];
/// assert_eq!(dedup_trimmed(&types), vec!["gallery", "video"]);
/// ```
#[must_use]
pub fn dedup_trimmed(values: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty() && seen.insert(*v))
        .map(str::to_string)
        .collect()
}
