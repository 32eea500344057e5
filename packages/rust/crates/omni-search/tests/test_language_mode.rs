//! Strict vs fallback-to-English language resolution through the client.

mod search_support;

use omni_search::{
    LanguageMode, SearchError, SearchMode, SearchOptions, TypeaheadOptions, resolve_languages,
};
use search_support::{lexical_client, seeded_backend};

fn spanish_lexical() -> SearchOptions {
    SearchOptions::default()
        .with_mode(SearchMode::Lexical)
        .with_language("es")
        .with_entity_types(["article"])
}

#[test]
fn test_resolve_languages() {
    assert_eq!(resolve_languages("es", LanguageMode::Exact), vec!["es"]);
    assert_eq!(
        resolve_languages("es", LanguageMode::FallbackEnglish),
        vec!["es", "en"]
    );
    assert_eq!(
        resolve_languages("en", LanguageMode::FallbackEnglish),
        vec!["en"]
    );
    assert!(LanguageMode::parse_optional("nope").is_err());
}

#[tokio::test]
async fn test_exact_mode_finds_nothing_in_other_language() {
    let client = lexical_client(seeded_backend().await);
    let hits = client.search("factor", &spanish_lexical()).await.unwrap();
    assert!(hits.is_empty());
}

#[tokio::test]
async fn test_fallback_mode_returns_english_hits() {
    let client = lexical_client(seeded_backend().await);
    let opts = spanish_lexical().with_language_mode(LanguageMode::FallbackEnglish);

    let hits = client.search("factor", &opts).await.unwrap();

    assert!(!hits.is_empty());
    assert!(hits.iter().all(|h| h.language == "en"));
}

#[tokio::test]
async fn test_language_is_case_insensitive() {
    let client = lexical_client(seeded_backend().await);
    let opts = spanish_lexical().with_language(" EN ");
    let hits = client.search("factor", &opts).await.unwrap();
    assert_eq!(hits.len(), 2);
}

#[tokio::test]
async fn test_default_language_applies_when_unset() {
    let client = lexical_client(seeded_backend().await);
    let opts = spanish_lexical().with_language("");
    let hits = client.search("factor", &opts).await.unwrap();
    assert_eq!(hits.len(), 2);
}

#[tokio::test]
async fn test_typeahead_rejects_unknown_language_mode() {
    let client = lexical_client(seeded_backend().await);
    let opts = TypeaheadOptions {
        language_mode: "invalid".to_string(),
        entity_types: vec!["article".to_string()],
        ..TypeaheadOptions::default()
    };

    let err = client.typeahead("fac", &opts).await.unwrap_err();

    assert!(matches!(
        err,
        SearchError::InvalidLanguageMode {
            field: "TypeaheadOptions",
            ..
        }
    ));
    assert!(err.to_string().contains("invalid TypeaheadOptions.LanguageMode"));
}
