//! Lexical backend routing by language and query script.
//!
//! Stemming full-text engines do poorly on unsegmented CJK text, so CJK
//! languages always route through the script-aware and/or trigram paths,
//! whatever the interaction mode.

use crate::script::{has_ascii_alphanumeric, has_cjk_script, is_cjk_language};

/// Which lexical backends a (language, query) pair should consult.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LexicalRoute {
    /// Language-aware full-text search.
    pub use_fts: bool,
    /// Fuzzy trigram similarity.
    pub use_trigram: bool,
    /// CJK n-gram (script-aware) search.
    pub use_cjk: bool,
}

impl LexicalRoute {
    /// True when no backend applies.
    #[must_use]
    pub fn is_empty(self) -> bool {
        !(self.use_fts || self.use_trigram || self.use_cjk)
    }
}

/// Whether the caller wants full search or interactive (typeahead) suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteMode {
    /// Full `Search` request.
    Full,
    /// Interactive `Typeahead` request.
    Interactive,
}

/// Decide which lexical backends to call.
///
/// For CJK languages both flags may be set when the query mixes scripts
/// (`"鬼滅 tokyo"`); both are unset only for an empty query.
#[must_use]
pub fn lexical_route(language: &str, normalized_query: &str, mode: RouteMode) -> LexicalRoute {
    if !is_cjk_language(language) {
        return match mode {
            RouteMode::Full => LexicalRoute {
                use_fts: true,
                ..LexicalRoute::default()
            },
            RouteMode::Interactive => LexicalRoute {
                use_trigram: true,
                ..LexicalRoute::default()
            },
        };
    }

    LexicalRoute {
        use_fts: false,
        use_trigram: has_ascii_alphanumeric(normalized_query),
        use_cjk: has_cjk_script(normalized_query),
    }
}
