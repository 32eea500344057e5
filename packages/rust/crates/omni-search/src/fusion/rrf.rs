//! Basic Reciprocal Rank Fusion.

use std::collections::HashMap;

use super::kernels::rrf_term;
use super::types::{FusedHit, RankedKey, RankedList};

/// Fuse ranked lists into one deduplicated list, best first.
///
/// Each key at 1-based rank `r` of a list contributes `1 / (k + r)`; a key
/// absent from a list contributes nothing from it. Exact score ties are
/// broken by entity type, entity id, then language, so the output does not
/// depend on the order of `lists`. A `k` of zero is treated as one.
#[must_use]
pub fn fuse_rrf(lists: &[RankedList], k: u32) -> Vec<FusedHit> {
    let k = k.max(1);
    let mut scores: HashMap<&RankedKey, f64> = HashMap::new();

    for list in lists {
        for (index, key) in list.iter().enumerate() {
            *scores.entry(key).or_insert(0.0) += rrf_term(k, index + 1);
        }
    }

    let mut fused: Vec<FusedHit> = scores
        .into_iter()
        .map(|(key, score)| FusedHit::from_key(key.clone(), score))
        .collect();
    fused.sort_by(FusedHit::rank_order);
    fused
}
