//! Hybrid search: lexical routing per language, semantic vector search, RRF.

use std::sync::Arc;

use futures::future::{BoxFuture, try_join, try_join_all};
use tokio_util::sync::CancellationToken;

use super::{Client, guarded};
use crate::backend::{
    BackendHit, FullTextRequest, ScriptSearchRequest, SqlFilter, TrigramRequest,
    VectorSearchRequest, into_ranked_list,
};
use crate::config::SEARCH_TRIGRAM_MIN_SIMILARITY;
use crate::embedder::Embedder;
use crate::error::{BackendError, SearchError, SearchResult};
use crate::fusion::{FusedHit, RankedList, fuse_rrf};
use crate::language::{LanguageMode, resolve_languages};
use crate::normalize::{is_noop_query, normalize_for_embedding};
use crate::options::{SearchMode, SearchOptions, dedup_trimmed};
use crate::routing::{RouteMode, lexical_route};

/// One fused search result; `score` is the summed RRF score.
pub type SearchHit = FusedHit;

type BackendCall<'a> = BoxFuture<'a, Result<Vec<BackendHit>, BackendError>>;

/// Everything a request needs once validation has passed.
struct SearchPlan {
    languages: Vec<String>,
    mode: SearchMode,
    limit: usize,
    rrf_k: u32,
    lexical_types: Vec<String>,
    semantic_types: Vec<String>,
    semantic: Option<SemanticPlan>,
}

struct SemanticPlan {
    embedder: Arc<dyn Embedder>,
    model: String,
    two_stage: bool,
    oversample_factor: usize,
}

impl Client {
    /// Hybrid search over lexical and/or semantic signals, fused with RRF.
    ///
    /// A query that normalizes to nothing searchable returns no hits and
    /// calls no backend. Every validation error is raised before the first
    /// backend call.
    ///
    /// # Errors
    ///
    /// Invalid options, missing embedder/model/entity types, embedding
    /// failures, and the first failing backend call.
    pub async fn search(&self, query: &str, opts: &SearchOptions) -> SearchResult<Vec<SearchHit>> {
        self.search_with_cancel(query, opts, &CancellationToken::new())
            .await
    }

    /// [`Client::search`] that aborts with [`SearchError::Cancelled`] once
    /// `cancel` fires.
    ///
    /// # Errors
    ///
    /// Same as [`Client::search`], plus [`SearchError::Cancelled`].
    pub async fn search_with_cancel(
        &self,
        query: &str,
        opts: &SearchOptions,
        cancel: &CancellationToken,
    ) -> SearchResult<Vec<SearchHit>> {
        let normalized = normalize_for_embedding(query);
        if is_noop_query(&normalized) {
            tracing::debug!(event = "search.query.noop", "query has nothing searchable");
            return Ok(Vec::new());
        }

        let plan = self.plan_search(opts)?;
        tracing::debug!(
            event = "search.query.planned",
            query = %normalized,
            languages = ?plan.languages,
            mode = %plan.mode,
            limit = plan.limit,
            rrf_k = plan.rrf_k,
            "search planned"
        );

        let lexical = self.lexical_lists(&normalized, &plan, &opts.filter);
        let semantic = self.semantic_lists(&normalized, &plan, &opts.filter);
        let (mut lists, semantic) =
            guarded(cancel, "search", try_join(lexical, semantic)).await?;

        let Some(semantic) = semantic else {
            tracing::debug!(
                event = "search.embedding.empty",
                "embedder returned an empty vector"
            );
            return Ok(Vec::new());
        };
        lists.extend(semantic);

        if lists.is_empty() {
            return Ok(Vec::new());
        }

        let mut hits = fuse_rrf(&lists, plan.rrf_k);
        let fused = hits.len();
        hits.truncate(plan.limit);
        tracing::debug!(
            event = "search.fusion.done",
            lists = lists.len(),
            fused,
            returned = hits.len(),
            "search fused"
        );
        Ok(hits)
    }

    /// Validate options and resolve defaults. No backend is touched.
    fn plan_search(&self, opts: &SearchOptions) -> SearchResult<SearchPlan> {
        let language_mode = LanguageMode::parse_optional(&opts.language_mode).map_err(|value| {
            SearchError::InvalidLanguageMode {
                field: "SearchOptions",
                value,
            }
        })?;
        let languages = resolve_languages(
            self.defaults.language_or_default(&opts.language),
            language_mode,
        );
        let mode = SearchMode::parse_optional(&opts.mode).map_err(SearchError::InvalidSearchMode)?;
        let limit = self.defaults.limit_or_default(opts.limit);
        let rrf_k = self.defaults.rrf_k_or_default(opts.rrf_k);

        let combined = dedup_trimmed(&opts.entity_types);
        let mut lexical_types = dedup_trimmed(&opts.lexical_entity_types);
        if lexical_types.is_empty() {
            lexical_types.clone_from(&combined);
        }
        let mut semantic_types = dedup_trimmed(&opts.semantic_entity_types);
        if semantic_types.is_empty() {
            semantic_types = combined;
        }
        if mode.uses_lexical() && lexical_types.is_empty() {
            return Err(SearchError::MissingEntityTypes {
                field: "LexicalEntityTypes",
                mode: "lexical/dual search",
            });
        }
        if mode.uses_semantic() && semantic_types.is_empty() {
            return Err(SearchError::MissingEntityTypes {
                field: "SemanticEntityTypes",
                mode: "semantic/dual search",
            });
        }

        let semantic = if mode.uses_semantic() {
            let embedder = self
                .embedder
                .clone()
                .ok_or(SearchError::MissingEmbedder)?;
            let model = self
                .defaults
                .model_or_default(&opts.model)
                .ok_or(SearchError::MissingModel("semantic search"))?
                .to_string();
            Some(SemanticPlan {
                embedder,
                model,
                two_stage: opts.two_stage.unwrap_or(self.defaults.two_stage),
                oversample_factor: self.defaults.oversample_or_default(opts.oversample_factor),
            })
        } else {
            None
        };

        Ok(SearchPlan {
            languages,
            mode,
            limit,
            rrf_k,
            lexical_types,
            semantic_types,
            semantic,
        })
    }

    /// One ranked list per (language, routed lexical backend), in call order.
    async fn lexical_lists(
        &self,
        query: &str,
        plan: &SearchPlan,
        filter: &SqlFilter,
    ) -> SearchResult<Vec<RankedList>> {
        if !plan.mode.uses_lexical() {
            return Ok(Vec::new());
        }

        let mut calls: Vec<BackendCall<'_>> = Vec::new();
        for language in &plan.languages {
            let route = lexical_route(language, query, RouteMode::Full);
            tracing::debug!(
                event = "search.lexical.routed",
                language = %language,
                fts = route.use_fts,
                trigram = route.use_trigram,
                cjk = route.use_cjk,
                "lexical route"
            );
            if route.use_fts {
                calls.push(self.backend.full_text_search(FullTextRequest {
                    schema: &self.schema,
                    query,
                    language,
                    entity_types: &plan.lexical_types,
                    limit: plan.limit,
                    filter,
                }));
            }
            if route.use_trigram {
                calls.push(self.backend.trigram_search(TrigramRequest {
                    schema: &self.schema,
                    query,
                    language,
                    entity_types: &plan.lexical_types,
                    limit: plan.limit,
                    min_similarity: SEARCH_TRIGRAM_MIN_SIMILARITY,
                    filter,
                }));
            }
            if route.use_cjk {
                calls.push(self.backend.script_search(ScriptSearchRequest {
                    schema: &self.schema,
                    query,
                    language,
                    entity_types: &plan.lexical_types,
                    limit: plan.limit,
                    prefix: false,
                    filter,
                }));
            }
        }

        let results = try_join_all(calls).await?;
        tracing::debug!(
            event = "search.lexical.done",
            lists = results.len(),
            hits = results.iter().map(Vec::len).sum::<usize>(),
            "lexical backends returned"
        );
        Ok(results.into_iter().map(into_ranked_list).collect())
    }

    /// One ranked list per language from vector search.
    ///
    /// `Ok(None)` when the embedder returned an empty vector, which ends the
    /// request with no results.
    async fn semantic_lists(
        &self,
        query: &str,
        plan: &SearchPlan,
        filter: &SqlFilter,
    ) -> SearchResult<Option<Vec<RankedList>>> {
        let Some(semantic) = &plan.semantic else {
            return Ok(Some(Vec::new()));
        };

        let embedding = semantic
            .embedder
            .embed_query_text(&semantic.model, query)
            .await
            .map_err(SearchError::Embedding)?;
        if embedding.is_empty() {
            return Ok(None);
        }

        let calls = plan.languages.iter().map(|language| {
            self.backend.vector_search(VectorSearchRequest {
                schema: &self.schema,
                embedding: &embedding,
                model: &semantic.model,
                language,
                entity_types: &plan.semantic_types,
                limit: plan.limit,
                two_stage: semantic.two_stage,
                oversample_factor: semantic.oversample_factor,
                filter,
            })
        });
        let results = try_join_all(calls).await?;
        tracing::debug!(
            event = "search.semantic.done",
            model = %semantic.model,
            dimensions = embedding.len(),
            two_stage = semantic.two_stage,
            oversample_factor = semantic.oversample_factor,
            hits = results.iter().map(Vec::len).sum::<usize>(),
            "vector search returned"
        );
        Ok(Some(results.into_iter().map(into_ranked_list).collect()))
    }
}
