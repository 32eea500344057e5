//! Query normalization for the two query consumers.
//!
//! - [`normalize_for_embedding`]: text sent to embedding models and trigram matching.
//! - [`normalize_for_fts`]: text handed to a full-text engine's web-style query parser.
//!
//! Both collapse intra-token hyphens (`two-factor` -> `two factor`) so that
//! hyphenated compounds are never parsed as negation, and both treat a
//! leading `-` as punctuation. Only the FTS variant turns the word `not` into
//! syntactic negation.

const NEGATION_WORD: &str = "not";

fn is_letter_or_number(c: char) -> bool {
    c.is_alphabetic() || c.is_numeric()
}

/// Replace every `-` sitting between two letters/numbers with a space.
fn collapse_intra_token_hyphens(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    for (i, &c) in chars.iter().enumerate() {
        let between_word_chars = c == '-'
            && i > 0
            && i + 1 < chars.len()
            && is_letter_or_number(chars[i - 1])
            && is_letter_or_number(chars[i + 1]);
        out.push(if between_word_chars { ' ' } else { c });
    }
    out
}

fn strip_leading_hyphens(token: &str) -> &str {
    token.trim_start_matches('-')
}

/// Clean a user query for embedding models and non-FTS lexical backends.
///
/// Natural-language words such as `not` are kept verbatim.
///
/// ```
/// use omni_search::normalize::normalize_for_embedding;
///
/// assert_eq!(normalize_for_embedding("two-factor"), "two factor");
/// assert_eq!(normalize_for_embedding("--factor"), "factor");
/// assert_eq!(normalize_for_embedding("two not factor"), "two not factor");
/// ```
#[must_use]
pub fn normalize_for_embedding(input: &str) -> String {
    let collapsed = collapse_intra_token_hyphens(input.trim());
    collapsed
        .split_whitespace()
        .map(strip_leading_hyphens)
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Clean a user query for a web-style full-text query parser.
///
/// `not X` (case-insensitive) becomes `-X`. Only the next whitespace-delimited
/// token is negated; phrase negation such as `not "two factor"` is not handled.
///
/// ```
/// use omni_search::normalize::normalize_for_fts;
///
/// assert_eq!(normalize_for_fts("not factor"), "-factor");
/// assert_eq!(normalize_for_fts("X NOT Y"), "X -Y");
/// ```
#[must_use]
pub fn normalize_for_fts(input: &str) -> String {
    let collapsed = collapse_intra_token_hyphens(input.trim());
    let mut tokens = collapsed.split_whitespace().peekable();
    let mut out: Vec<String> = Vec::new();

    while let Some(raw) = tokens.next() {
        let token = strip_leading_hyphens(raw);
        if token.is_empty() {
            continue;
        }
        if token.eq_ignore_ascii_case(NEGATION_WORD) && tokens.peek().is_some() {
            if let Some(next) = tokens.next().map(strip_leading_hyphens)
                && !next.is_empty()
            {
                out.push(format!("-{next}"));
            }
            continue;
        }
        out.push(token.to_string());
    }

    out.join(" ")
}

/// True when a normalized query has nothing to search for: it is empty or
/// carries no letter and no digit. Callers answer such queries with zero
/// results without touching any backend.
#[must_use]
pub fn is_noop_query(normalized: &str) -> bool {
    !normalized.chars().any(is_letter_or_number)
}
