//! Trigram similarity in the style of `pg_trgm`: each lowercased word is
//! padded with two leading blanks and one trailing blank before splitting
//! into three-character windows.

use std::collections::HashSet;

pub(crate) fn trigrams(text: &str) -> HashSet<String> {
    let mut out = HashSet::new();
    for word in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
    {
        let padded: Vec<char> = format!("  {} ", word.to_lowercase()).chars().collect();
        for window in padded.windows(3) {
            out.insert(window.iter().collect());
        }
    }
    out
}

/// Share of the query's trigrams found in the document, in `[0, 1]`.
///
/// Measuring against the query (not the union) keeps short prefixes such as
/// `tok` close to long documents containing `tokyo`.
pub(crate) fn similarity(query: &HashSet<String>, document: &HashSet<String>) -> f32 {
    if query.is_empty() {
        return 0.0;
    }
    let shared = query.intersection(document).count();
    #[allow(clippy::cast_precision_loss)]
    let score = shared as f32 / query.len() as f32;
    score
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigrams_of_short_word() {
        let grams = trigrams("Tok");
        let expected: HashSet<String> = ["  t", " to", "tok", "ok "]
            .iter()
            .map(|s| (*s).to_string())
            .collect();
        assert_eq!(grams, expected);
    }

    #[test]
    fn test_prefix_similarity() {
        let score = similarity(&trigrams("tok"), &trigrams("tokyo school"));
        assert!((score - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_typo_tolerance() {
        let doc = trigrams("authentication");
        assert!(similarity(&trigrams("authentcation"), &doc) > 0.5);
        assert!(similarity(&trigrams("zebra"), &doc) < 0.2);
    }

    #[test]
    fn test_empty_query() {
        assert!(similarity(&HashSet::new(), &trigrams("anything")).abs() < f32::EPSILON);
    }
}
