//! Vector scoring: exact cosine plus an int8 approximation for the first
//! stage of two-stage retrieval.

/// Cosine similarity; 0 for zero vectors or mismatched dimensions.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0_f32;
    let mut norm_a = 0.0_f32;
    let mut norm_b = 0.0_f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a <= 0.0 || norm_b <= 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Symmetric per-vector int8 scalar quantization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct QuantizedVector {
    values: Vec<i8>,
    norm_squared: i64,
}

impl QuantizedVector {
    pub(crate) fn quantize(vector: &[f32]) -> Self {
        let max_abs = vector.iter().fold(0.0_f32, |acc, v| acc.max(v.abs()));
        let scale = if max_abs > 0.0 { 127.0 / max_abs } else { 0.0 };
        #[allow(clippy::cast_possible_truncation)]
        let values: Vec<i8> = vector
            .iter()
            .map(|v| (v * scale).round().clamp(-127.0, 127.0) as i8)
            .collect();
        let norm_squared = values.iter().map(|&v| i64::from(v) * i64::from(v)).sum();
        Self {
            values,
            norm_squared,
        }
    }

    /// Approximate cosine similarity against another quantized vector.
    pub(crate) fn approx_cosine(&self, other: &Self) -> f32 {
        if self.values.len() != other.values.len()
            || self.norm_squared == 0
            || other.norm_squared == 0
        {
            return 0.0;
        }
        let dot: i64 = self
            .values
            .iter()
            .zip(&other.values)
            .map(|(&a, &b)| i64::from(a) * i64::from(b))
            .sum();
        #[allow(clippy::cast_precision_loss)]
        let denominator = ((self.norm_squared as f64) * (other.norm_squared as f64)).sqrt();
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
        let score = (dot as f64 / denominator) as f32;
        score
    }
}

/// A stored vector eligible for one query.
pub(crate) struct Candidate<'a, T> {
    pub item: T,
    pub exact: &'a [f32],
    pub quantized: &'a QuantizedVector,
}

/// Rank candidates against `query`.
///
/// With `candidate_count == None` every candidate is scored exactly. With
/// `Some(n)`, candidates are first ranked by the int8 approximation, the top
/// `n` survive, and only those are scored exactly. Returns `(item, exact
/// similarity)` best first (ties keep input order); callers truncate.
pub(crate) fn rank_candidates<T>(
    query: &[f32],
    candidates: Vec<Candidate<'_, T>>,
    candidate_count: Option<usize>,
) -> Vec<(T, f32)> {
    let survivors: Vec<Candidate<'_, T>> = match candidate_count {
        Some(count) if count < candidates.len() => {
            let quantized_query = QuantizedVector::quantize(query);
            let mut approximated: Vec<(f32, Candidate<'_, T>)> = candidates
                .into_iter()
                .map(|c| (quantized_query.approx_cosine(c.quantized), c))
                .collect();
            approximated.sort_by(|a, b| b.0.total_cmp(&a.0));
            approximated.truncate(count);
            approximated.into_iter().map(|(_, c)| c).collect()
        }
        _ => candidates,
    };

    let mut scored: Vec<(T, f32)> = survivors
        .into_iter()
        .map(|c| {
            let score = cosine_similarity(query, c.exact);
            (c.item, score)
        })
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0], &[1.0, 0.0]).abs() < f32::EPSILON);
        assert!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]).abs() < f32::EPSILON);
    }

    #[test]
    fn test_quantized_tracks_exact() {
        let a = [0.3, -0.7, 0.2, 0.9];
        let b = [0.25, -0.6, 0.1, 1.0];
        let exact = cosine_similarity(&a, &b);
        let approx = QuantizedVector::quantize(&a).approx_cosine(&QuantizedVector::quantize(&b));
        assert!((exact - approx).abs() < 0.02, "exact {exact} approx {approx}");
        assert_eq!(QuantizedVector::quantize(&a).values, vec![42, -99, 28, 127]);
    }

    #[test]
    fn test_two_stage_keeps_best_candidates() {
        let vectors = [vec![1.0, 0.0], vec![0.0, 1.0], vec![0.9, 0.1], vec![-1.0, 0.0]];
        let quantized: Vec<QuantizedVector> =
            vectors.iter().map(|v| QuantizedVector::quantize(v)).collect();
        let build = || {
            vectors
                .iter()
                .zip(&quantized)
                .enumerate()
                .map(|(i, (exact, q))| Candidate {
                    item: i,
                    exact: exact.as_slice(),
                    quantized: q,
                })
                .collect::<Vec<_>>()
        };

        let exact = rank_candidates(&[1.0, 0.0], build(), None);
        let two_stage = rank_candidates(&[1.0, 0.0], build(), Some(2));

        assert_eq!(exact.len(), 4);
        assert_eq!(two_stage.len(), 2);
        let exact_ids: Vec<usize> = exact.iter().map(|(i, _)| *i).collect();
        let staged_ids: Vec<usize> = two_stage.iter().map(|(i, _)| *i).collect();
        assert_eq!(&exact_ids[..2], staged_ids.as_slice());
        assert_eq!(staged_ids, vec![0, 2]);
    }
}
