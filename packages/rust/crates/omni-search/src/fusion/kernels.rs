//! Compute kernel for fusion: the RRF term.

/// RRF contribution of a 1-based `rank` under smoothing constant `k`: `1 / (k + rank)`.
#[inline]
#[must_use]
pub fn rrf_term(k: u32, rank: usize) -> f64 {
    let rank = u32::try_from(rank).unwrap_or(u32::MAX);
    1.0 / (f64::from(k) + f64::from(rank))
}
