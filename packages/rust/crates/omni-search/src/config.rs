//! Client configuration.
//!
//! - [`ClientConfig`]: construction input (backend handle, schema, embedder, defaults).
//! - [`ClientDefaults`]: immutable defaults resolved once in [`crate::Client::new`].
//! - [`SearchSettings`]: YAML file settings, merged override-over-base.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::backend::SearchBackend;
use crate::embedder::Embedder;
use crate::error::SearchResult;
use crate::fusion::DEFAULT_RRF_K;
use crate::language::FALLBACK_LANGUAGE;

/// Result limit when neither request nor client sets one.
pub const DEFAULT_LIMIT: usize = 20;
/// Typeahead limit when the request sets none.
pub const DEFAULT_TYPEAHEAD_LIMIT: usize = 10;
/// First-stage multiplier when neither request nor client sets one.
pub const DEFAULT_OVERSAMPLE_FACTOR: usize = 4;
/// Trigram threshold used by full `Search` requests.
pub const SEARCH_TRIGRAM_MIN_SIMILARITY: f32 = 0.1;

/// Input to [`crate::Client::new`]. Zero/empty defaults are replaced by the
/// hardcoded fallbacks above.
#[derive(Clone, Default)]
pub struct ClientConfig {
    /// Retrieval backend (the connection handle). Required.
    pub backend: Option<Arc<dyn SearchBackend>>,
    /// Storage schema name. Required.
    pub schema: String,
    /// Query embedder; required only for semantic search.
    pub embedder: Option<Arc<dyn Embedder>>,
    /// Default language.
    pub default_language: String,
    /// Default embedding model.
    pub default_model: String,
    /// Default result limit.
    pub default_limit: usize,
    /// Default RRF constant.
    pub default_rrf_k: u32,
    /// Default two-stage flag.
    pub two_stage: bool,
    /// Default oversample factor.
    pub oversample_factor: usize,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("backend", &self.backend.is_some())
            .field("schema", &self.schema)
            .field("embedder", &self.embedder.is_some())
            .field("default_language", &self.default_language)
            .field("default_model", &self.default_model)
            .field("default_limit", &self.default_limit)
            .field("default_rrf_k", &self.default_rrf_k)
            .field("two_stage", &self.two_stage)
            .field("oversample_factor", &self.oversample_factor)
            .finish()
    }
}

impl ClientConfig {
    /// Config with the two required fields set.
    pub fn new(backend: Arc<dyn SearchBackend>, schema: impl Into<String>) -> Self {
        Self {
            backend: Some(backend),
            schema: schema.into(),
            ..Self::default()
        }
    }

    /// Attach a query embedder.
    #[must_use]
    pub fn with_embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the default model.
    #[must_use]
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }
}

/// Client-wide defaults, fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientDefaults {
    /// Language used when a request names none.
    pub language: String,
    /// Model used when a request names none (may be empty).
    pub model: String,
    /// Positive result limit.
    pub limit: usize,
    /// Positive RRF constant.
    pub rrf_k: u32,
    /// Two-stage vector retrieval.
    pub two_stage: bool,
    /// Positive first-stage multiplier.
    pub oversample_factor: usize,
}

impl ClientDefaults {
    /// Resolve defaults from a config, applying hardcoded fallbacks.
    #[must_use]
    pub fn from_config(config: &ClientConfig) -> Self {
        let language = config.default_language.trim();
        Self {
            language: if language.is_empty() {
                FALLBACK_LANGUAGE.to_string()
            } else {
                language.to_string()
            },
            model: config.default_model.trim().to_string(),
            limit: positive_or(config.default_limit, DEFAULT_LIMIT),
            rrf_k: if config.default_rrf_k == 0 {
                DEFAULT_RRF_K
            } else {
                config.default_rrf_k
            },
            two_stage: config.two_stage,
            oversample_factor: positive_or(config.oversample_factor, DEFAULT_OVERSAMPLE_FACTOR),
        }
    }

    /// Request language, or the default when blank.
    #[must_use]
    pub fn language_or_default<'a>(&'a self, requested: &'a str) -> &'a str {
        let trimmed = requested.trim();
        if trimmed.is_empty() {
            self.language.as_str()
        } else {
            trimmed
        }
    }

    /// Request model, or the default when blank. `None` when both are blank.
    #[must_use]
    pub fn model_or_default<'a>(&'a self, requested: &'a str) -> Option<&'a str> {
        let trimmed = requested.trim();
        let model = if trimmed.is_empty() {
            self.model.as_str()
        } else {
            trimmed
        };
        (!model.is_empty()).then_some(model)
    }

    /// Request limit, or the default when zero.
    #[must_use]
    pub fn limit_or_default(&self, requested: usize) -> usize {
        positive_or(requested, self.limit)
    }

    /// Request RRF constant, or the default when zero.
    #[must_use]
    pub fn rrf_k_or_default(&self, requested: u32) -> u32 {
        if requested == 0 { self.rrf_k } else { requested }
    }

    /// Request oversample factor, or the default when zero.
    #[must_use]
    pub fn oversample_or_default(&self, requested: usize) -> usize {
        positive_or(requested, self.oversample_factor)
    }
}

fn positive_or(value: usize, fallback: usize) -> usize {
    if value == 0 { fallback } else { value }
}

/// File-backed defaults, e.g.
///
/// ```yaml
/// schema: search
/// default_language: en
/// default_model: text-embedding-3-small
/// default_limit: 20
/// default_rrf_k: 60
/// two_stage: true
/// oversample_factor: 4
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchSettings {
    /// Storage schema name.
    pub schema: Option<String>,
    /// Default language.
    pub default_language: Option<String>,
    /// Default embedding model.
    pub default_model: Option<String>,
    /// Default result limit.
    pub default_limit: Option<usize>,
    /// Default RRF constant.
    pub default_rrf_k: Option<u32>,
    /// Default two-stage flag.
    pub two_stage: Option<bool>,
    /// Default oversample factor.
    pub oversample_factor: Option<usize>,
}

impl SearchSettings {
    /// Parse settings from YAML text. Empty text yields empty settings.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SearchError::Settings`] on malformed YAML or unknown keys.
    pub fn from_yaml_str(text: &str) -> SearchResult<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Read settings from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an IO or parse error.
    pub fn load(path: &Path) -> SearchResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Load system settings, then apply user overrides when that file exists.
    ///
    /// # Errors
    ///
    /// Returns an IO or parse error for either file that exists but cannot be read.
    pub fn load_merged(system: &Path, user: &Path) -> SearchResult<Self> {
        let base = if system.exists() {
            Self::load(system)?
        } else {
            Self::default()
        };
        if !user.exists() {
            return Ok(base);
        }
        let overrides = Self::load(user)?;
        tracing::debug!(
            event = "search.settings.merged",
            system = %system.display(),
            user = %user.display(),
            "merged user search settings over system settings"
        );
        Ok(base.merge(overrides))
    }

    /// Merge `overrides` over `self`; set fields in `overrides` win.
    #[must_use]
    pub fn merge(self, overrides: Self) -> Self {
        Self {
            schema: overrides.schema.or(self.schema),
            default_language: overrides.default_language.or(self.default_language),
            default_model: overrides.default_model.or(self.default_model),
            default_limit: overrides.default_limit.or(self.default_limit),
            default_rrf_k: overrides.default_rrf_k.or(self.default_rrf_k),
            two_stage: overrides.two_stage.or(self.two_stage),
            oversample_factor: overrides.oversample_factor.or(self.oversample_factor),
        }
    }

    /// Copy every set field into `config`.
    #[must_use]
    pub fn apply_to(&self, mut config: ClientConfig) -> ClientConfig {
        if let Some(schema) = &self.schema {
            config.schema.clone_from(schema);
        }
        if let Some(language) = &self.default_language {
            config.default_language.clone_from(language);
        }
        if let Some(model) = &self.default_model {
            config.default_model.clone_from(model);
        }
        if let Some(limit) = self.default_limit {
            config.default_limit = limit;
        }
        if let Some(k) = self.default_rrf_k {
            config.default_rrf_k = k;
        }
        if let Some(two_stage) = self.two_stage {
            config.two_stage = two_stage;
        }
        if let Some(factor) = self.oversample_factor {
            config.oversample_factor = factor;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fallbacks() {
        let defaults = ClientDefaults::from_config(&ClientConfig::default());
        assert_eq!(defaults.language, "en");
        assert_eq!(defaults.model, "");
        assert_eq!(defaults.limit, DEFAULT_LIMIT);
        assert_eq!(defaults.rrf_k, DEFAULT_RRF_K);
        assert_eq!(defaults.oversample_factor, DEFAULT_OVERSAMPLE_FACTOR);
        assert!(!defaults.two_stage);
    }

    #[test]
    fn test_request_overrides() {
        let config = ClientConfig {
            default_language: " ja ".to_string(),
            default_model: "m1".to_string(),
            default_limit: 7,
            default_rrf_k: 30,
            oversample_factor: 3,
            ..ClientConfig::default()
        };
        let defaults = ClientDefaults::from_config(&config);
        assert_eq!(defaults.language_or_default(""), "ja");
        assert_eq!(defaults.language_or_default("es"), "es");
        assert_eq!(defaults.model_or_default(""), Some("m1"));
        assert_eq!(defaults.model_or_default(" m2 "), Some("m2"));
        assert_eq!(defaults.limit_or_default(0), 7);
        assert_eq!(defaults.limit_or_default(3), 3);
        assert_eq!(defaults.rrf_k_or_default(0), 30);
        assert_eq!(defaults.oversample_or_default(0), 3);
        assert_eq!(defaults.oversample_or_default(8), 8);
    }

    #[test]
    fn test_model_missing_everywhere() {
        let defaults = ClientDefaults::from_config(&ClientConfig::default());
        assert_eq!(defaults.model_or_default("  "), None);
    }

    #[test]
    fn test_settings_merge_user_over_system() {
        let system = SearchSettings::from_yaml_str(
            "schema: search\ndefault_limit: 20\ndefault_model: base\n",
        )
        .unwrap();
        let user = SearchSettings::from_yaml_str("default_model: tuned\ntwo_stage: true\n").unwrap();
        let merged = system.merge(user);
        assert_eq!(merged.schema.as_deref(), Some("search"));
        assert_eq!(merged.default_model.as_deref(), Some("tuned"));
        assert_eq!(merged.default_limit, Some(20));
        assert_eq!(merged.two_stage, Some(true));
    }

    #[test]
    fn test_settings_reject_unknown_keys() {
        assert!(SearchSettings::from_yaml_str("rrf: 3\n").is_err());
        assert_eq!(
            SearchSettings::from_yaml_str("").unwrap(),
            SearchSettings::default()
        );
    }

    #[test]
    fn test_settings_apply_to_config() {
        let settings = SearchSettings {
            schema: Some("s".to_string()),
            default_rrf_k: Some(10),
            ..SearchSettings::default()
        };
        let config = settings.apply_to(ClientConfig::default());
        assert_eq!(config.schema, "s");
        assert_eq!(config.default_rrf_k, 10);
        assert_eq!(config.default_limit, 0);
    }
}
