//! Shared types for RRF fusion.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Identity of a retrievable unit as seen by a ranking list.
///
/// Ordering is entity type, then entity id, then language; fusion and
/// typeahead use it to break exact score ties.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RankedKey {
    /// Entity type (e.g. `gallery`)
    pub entity_type: String,
    /// Entity id within its type
    pub entity_id: String,
    /// Language of the indexed document
    pub language: String,
}

impl RankedKey {
    /// Build a key from its three parts.
    pub fn new(
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
            language: language.into(),
        }
    }
}

/// Output of one backend call, best first (rank 1 is index 0).
pub type RankedList = Vec<RankedKey>;

/// A fused result. `score` is the summed RRF score, comparable only within
/// one fusion run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedHit {
    /// Entity type
    pub entity_type: String,
    /// Entity id
    pub entity_id: String,
    /// Document language
    pub language: String,
    /// Summed RRF score (higher is better)
    pub score: f64,
}

impl FusedHit {
    pub(crate) fn from_key(key: RankedKey, score: f64) -> Self {
        Self {
            entity_type: key.entity_type,
            entity_id: key.entity_id,
            language: key.language,
            score,
        }
    }

    /// Score descending, then entity type, id and language ascending.
    #[must_use]
    pub fn rank_order(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.entity_type.cmp(&other.entity_type))
            .then_with(|| self.entity_id.cmp(&other.entity_id))
            .then_with(|| self.language.cmp(&other.language))
    }
}
