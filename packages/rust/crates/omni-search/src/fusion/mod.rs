//! Reciprocal Rank Fusion over independently ranked backend lists.
//!
//! Layout: `kernels` (RRF term), `types` (keys, lists, fused hits), `rrf` (fusion).

mod kernels;
mod rrf;
mod types;

pub use kernels::rrf_term;
pub use rrf::fuse_rrf;
pub use types::{FusedHit, RankedKey, RankedList};

/// Default RRF smoothing constant.
///
/// Larger values flatten the influence of rank position.
pub const DEFAULT_RRF_K: u32 = 60;
