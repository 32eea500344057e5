//! Language fallback policy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Language used when neither the request nor the client names one.
pub const FALLBACK_LANGUAGE: &str = "en";

/// How a requested language expands into the languages actually queried.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageMode {
    /// Only the requested language.
    #[default]
    Exact,
    /// The requested language first, then English.
    #[serde(rename = "fallback_en")]
    FallbackEnglish,
}

impl LanguageMode {
    /// Wire name of the mode.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::FallbackEnglish => "fallback_en",
        }
    }

    /// Parse an optional textual mode; empty means [`LanguageMode::Exact`].
    ///
    /// # Errors
    ///
    /// Returns the rejected value when it names no known mode.
    pub fn parse_optional(value: &str) -> Result<Self, String> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(Self::Exact);
        }
        trimmed.parse()
    }
}

impl FromStr for LanguageMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exact" => Ok(Self::Exact),
            "fallback_en" => Ok(Self::FallbackEnglish),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for LanguageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expand `language` into the ordered list of languages to query.
///
/// The language is trimmed and lowercased; an empty value means English.
/// Fallback mode never lists English twice.
#[must_use]
pub fn resolve_languages(language: &str, mode: LanguageMode) -> Vec<String> {
    let mut lang = language.trim().to_lowercase();
    if lang.is_empty() {
        lang = FALLBACK_LANGUAGE.to_string();
    }

    match mode {
        LanguageMode::Exact => vec![lang],
        LanguageMode::FallbackEnglish if lang == FALLBACK_LANGUAGE => vec![lang],
        LanguageMode::FallbackEnglish => vec![lang, FALLBACK_LANGUAGE.to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_languages() {
        assert_eq!(resolve_languages("es", LanguageMode::Exact), vec!["es"]);
        assert_eq!(resolve_languages("ja", LanguageMode::default()), vec!["ja"]);
        assert_eq!(
            resolve_languages("es", LanguageMode::FallbackEnglish),
            vec!["es", "en"]
        );
        assert_eq!(
            resolve_languages("en", LanguageMode::FallbackEnglish),
            vec!["en"]
        );
        assert_eq!(resolve_languages("  ES ", LanguageMode::Exact), vec!["es"]);
        assert_eq!(resolve_languages("", LanguageMode::Exact), vec!["en"]);
    }

    #[test]
    fn test_parse_language_mode() {
        assert_eq!(LanguageMode::parse_optional(""), Ok(LanguageMode::Exact));
        assert_eq!(LanguageMode::parse_optional("exact"), Ok(LanguageMode::Exact));
        assert_eq!(
            LanguageMode::parse_optional("fallback_en"),
            Ok(LanguageMode::FallbackEnglish)
        );
        assert_eq!(
            LanguageMode::parse_optional("invalid"),
            Err("invalid".to_string())
        );
    }

    #[test]
    fn test_language_mode_serde_names() {
        let json = serde_json::to_string(&LanguageMode::FallbackEnglish).unwrap();
        assert_eq!(json, "\"fallback_en\"");
        let mode: LanguageMode = serde_json::from_str("\"exact\"").unwrap();
        assert_eq!(mode, LanguageMode::Exact);
    }
}
