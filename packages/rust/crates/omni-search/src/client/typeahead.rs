//! Interactive suggestions while the user is still typing.

use futures::future::{BoxFuture, try_join_all};
use tokio_util::sync::CancellationToken;

use super::{Client, guarded};
use crate::backend::{BackendHit, ScriptSearchRequest, TrigramRequest};
use crate::config::DEFAULT_TYPEAHEAD_LIMIT;
use crate::error::{BackendError, SearchError, SearchResult};
use crate::language::{LanguageMode, resolve_languages};
use crate::normalize::{is_noop_query, normalize_for_embedding};
use crate::options::{TypeaheadOptions, dedup_trimmed};
use crate::routing::{RouteMode, lexical_route};
use crate::typeahead::{TypeaheadHit, TypeaheadMerge};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Trigram,
    Script,
}

impl Client {
    /// Typo-tolerant prefix suggestions. No RRF and no semantic path: hits
    /// from every backend and language are merged by key, keeping the best
    /// score.
    ///
    /// # Errors
    ///
    /// Invalid language mode, missing entity types, or the first failing
    /// backend call.
    pub async fn typeahead(
        &self,
        query: &str,
        opts: &TypeaheadOptions,
    ) -> SearchResult<Vec<TypeaheadHit>> {
        self.typeahead_with_cancel(query, opts, &CancellationToken::new())
            .await
    }

    /// [`Client::typeahead`] that aborts with [`SearchError::Cancelled`] once
    /// `cancel` fires.
    ///
    /// # Errors
    ///
    /// Same as [`Client::typeahead`], plus [`SearchError::Cancelled`].
    pub async fn typeahead_with_cancel(
        &self,
        query: &str,
        opts: &TypeaheadOptions,
        cancel: &CancellationToken,
    ) -> SearchResult<Vec<TypeaheadHit>> {
        let normalized = normalize_for_embedding(query);
        if is_noop_query(&normalized) {
            return Ok(Vec::new());
        }

        let language_mode = LanguageMode::parse_optional(&opts.language_mode).map_err(|value| {
            SearchError::InvalidLanguageMode {
                field: "TypeaheadOptions",
                value,
            }
        })?;
        let languages = resolve_languages(
            self.defaults.language_or_default(&opts.language),
            language_mode,
        );
        let entity_types = dedup_trimmed(&opts.entity_types);
        if entity_types.is_empty() {
            return Err(SearchError::MissingEntityTypes {
                field: "EntityTypes",
                mode: "typeahead",
            });
        }
        let limit = if opts.limit == 0 {
            DEFAULT_TYPEAHEAD_LIMIT
        } else {
            opts.limit
        };
        let min_similarity = opts.min_similarity;

        let mut sources = Vec::new();
        let mut calls: Vec<BoxFuture<'_, Result<Vec<BackendHit>, BackendError>>> = Vec::new();
        for language in &languages {
            let route = lexical_route(language, &normalized, RouteMode::Interactive);
            if route.use_trigram {
                sources.push(Source::Trigram);
                calls.push(self.backend.trigram_search(TrigramRequest {
                    schema: &self.schema,
                    query: &normalized,
                    language,
                    entity_types: &entity_types,
                    limit,
                    min_similarity,
                    filter: &opts.filter,
                }));
            }
            if route.use_cjk {
                sources.push(Source::Script);
                calls.push(self.backend.script_search(ScriptSearchRequest {
                    schema: &self.schema,
                    query: &normalized,
                    language,
                    entity_types: &entity_types,
                    limit,
                    prefix: true,
                    filter: &opts.filter,
                }));
            }
        }

        let results = guarded(cancel, "typeahead", async {
            Ok(try_join_all(calls).await?)
        })
        .await?;

        let mut merge = TypeaheadMerge::new();
        for (source, hits) in sources.into_iter().zip(results) {
            // The trigram backend enforces its own threshold.
            if source == Source::Script && min_similarity > 0.0 {
                merge.extend(hits.into_iter().filter(|hit| hit.score >= min_similarity));
            } else {
                merge.extend(hits);
            }
        }

        let merged = merge.len();
        let hits = merge.finish(limit);
        tracing::debug!(
            event = "search.typeahead.done",
            query = %normalized,
            languages = ?languages,
            merged,
            returned = hits.len(),
            "typeahead merged"
        );
        Ok(hits)
    }
}
