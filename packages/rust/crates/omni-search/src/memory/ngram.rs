//! Script-aware matching for CJK text.
//!
//! CJK runs match as substrings (what an n-gram index answers); runs of
//! other letters/digits match as whole words, or as word prefixes when the
//! query token ends in `*`.

use crate::script::is_cjk_char;

/// Append `*` to every token that lacks one, for interactive prefix search.
///
/// ```
/// use omni_search::memory::build_prefix_query;
///
/// assert_eq!(build_prefix_query("blue archive"), "blue* archive*");
/// assert_eq!(build_prefix_query("tok*"), "tok*");
/// ```
#[must_use]
pub fn build_prefix_query(query: &str) -> String {
    query
        .split_whitespace()
        .map(|token| {
            if token.ends_with('*') {
                token.to_string()
            } else {
                format!("{token}*")
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Map a raw n-gram match score into `[0, 1)`: `raw / (raw + k)`.
/// A non-positive `k` is treated as 1.
#[must_use]
pub fn normalize_ngram_score(raw: f32, k: f32) -> f32 {
    if raw <= 0.0 {
        return 0.0;
    }
    let k = if k > 0.0 { k } else { 1.0 };
    raw / (raw + k)
}

#[derive(Debug, PartialEq, Eq)]
enum Term {
    /// CJK run, matched as a substring.
    Cjk(String),
    /// Word, matched exactly or as a prefix.
    Word { text: String, prefix: bool },
}

/// A parsed script-aware query. Every term must match.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct NgramQuery {
    terms: Vec<Term>,
}

impl NgramQuery {
    pub(crate) fn parse(query: &str, prefix_mode: bool) -> Self {
        let query = if prefix_mode {
            build_prefix_query(query)
        } else {
            query.to_string()
        };
        let mut terms = Vec::new();
        for token in query.split_whitespace() {
            let (body, prefix) = match token.strip_suffix('*') {
                Some(body) => (body, true),
                None => (token, false),
            };
            split_runs(&body.to_lowercase(), prefix, &mut terms);
        }
        Self { terms }
    }

    /// Raw match count, `None` when some term is missing.
    pub(crate) fn score(&self, text_lower: &str, words: &[String]) -> Option<f32> {
        if self.terms.is_empty() {
            return None;
        }
        let mut raw = 0_usize;
        for term in &self.terms {
            let count = match term {
                Term::Cjk(run) => text_lower.matches(run.as_str()).count(),
                Term::Word { text, prefix: true } => {
                    words.iter().filter(|w| w.starts_with(text.as_str())).count()
                }
                Term::Word { text, prefix: false } => words.iter().filter(|w| *w == text).count(),
            };
            if count == 0 {
                return None;
            }
            raw += count;
        }
        #[allow(clippy::cast_precision_loss)]
        Some(raw as f32)
    }
}

/// Non-CJK word runs of a lowercased document, the counterpart of
/// [`Term::Word`].
pub(crate) fn latin_words(text_lower: &str) -> Vec<String> {
    let mut terms = Vec::new();
    for token in text_lower.split_whitespace() {
        split_runs(token, false, &mut terms);
    }
    terms
        .into_iter()
        .filter_map(|term| match term {
            Term::Word { text, .. } => Some(text),
            Term::Cjk(_) => None,
        })
        .collect()
}

/// Split one token into CJK runs and word runs.
fn split_runs(token: &str, prefix: bool, terms: &mut Vec<Term>) {
    let mut current = String::new();
    let mut current_is_cjk = false;

    let flush = |current: &mut String, is_cjk: bool, terms: &mut Vec<Term>| {
        if current.is_empty() {
            return;
        }
        let text = std::mem::take(current);
        terms.push(if is_cjk {
            Term::Cjk(text)
        } else {
            Term::Word { text, prefix }
        });
    };

    for c in token.chars() {
        if is_cjk_char(c) {
            if !current_is_cjk {
                flush(&mut current, false, terms);
            }
            current_is_cjk = true;
            current.push(c);
        } else if c.is_alphanumeric() {
            if current_is_cjk {
                flush(&mut current, true, terms);
            }
            current_is_cjk = false;
            current.push(c);
        } else {
            flush(&mut current, current_is_cjk, terms);
        }
    }
    flush(&mut current, current_is_cjk, terms);
}
