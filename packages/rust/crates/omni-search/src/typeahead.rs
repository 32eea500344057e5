//! Typeahead merge: union per-backend hits, keep the best score per key.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::backend::BackendHit;
use crate::fusion::RankedKey;

/// One typeahead suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeaheadHit {
    /// Entity type
    pub entity_type: String,
    /// Entity id
    pub entity_id: String,
    /// Document language
    pub language: String,
    /// Backend similarity score (max across backends)
    pub score: f32,
}

/// Request-local merge structure.
///
/// Map iteration order is never observed: [`TypeaheadMerge::finish`]
/// re-imposes score-desc / type / id / language ordering.
#[derive(Debug, Default)]
pub struct TypeaheadMerge {
    merged: HashMap<RankedKey, f32>,
}

impl TypeaheadMerge {
    /// Empty merge.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a hit, keeping the higher score on key collision.
    pub fn add(&mut self, hit: BackendHit) {
        let (key, score) = hit.into_parts();
        self.merged
            .entry(key)
            .and_modify(|best| {
                if score > *best {
                    *best = score;
                }
            })
            .or_insert(score);
    }

    /// Add every hit from one backend list.
    pub fn extend<I>(&mut self, hits: I)
    where
        I: IntoIterator<Item = BackendHit>,
    {
        for hit in hits {
            self.add(hit);
        }
    }

    /// Number of distinct keys merged so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.merged.len()
    }

    /// True when nothing was merged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.merged.is_empty()
    }

    /// Sort deterministically and truncate to `limit`.
    #[must_use]
    pub fn finish(self, limit: usize) -> Vec<TypeaheadHit> {
        let mut entries: Vec<(RankedKey, f32)> = self.merged.into_iter().collect();
        entries.sort_by(|(ka, sa), (kb, sb)| sb.total_cmp(sa).then_with(|| ka.cmp(kb)));
        entries.truncate(limit);
        entries
            .into_iter()
            .map(|(key, score)| TypeaheadHit {
                entity_type: key.entity_type,
                entity_id: key.entity_id,
                language: key.language,
                score,
            })
            .collect()
    }
}
