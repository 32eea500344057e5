//! Tests for `Client::similar_to`.

mod search_support;

use std::sync::Arc;

use omni_search::{SearchError, SimilarOptions};
use search_support::{
    CountingBackend, MODEL, RecordingEmbedder, lexical_client, seeded_backend, semantic_client,
};

fn ids(hits: &[omni_search::SimilarHit]) -> Vec<&str> {
    hits.iter().map(|h| h.entity_id.as_str()).collect()
}

#[tokio::test]
async fn test_similar_excludes_anchor() {
    let embedder = Arc::new(RecordingEmbedder::new(vec![1.0, 0.0, 0.0]));
    let client = semantic_client(seeded_backend().await, embedder.clone());

    let hits = client
        .similar_to("article", "1", &SimilarOptions::default())
        .await
        .unwrap();

    assert_eq!(ids(&hits), vec!["2", "3"]);
    assert!((hits[0].score - 0.8).abs() < 1e-5);
    assert!(hits.iter().all(|h| h.model == MODEL && h.language == "en"));
    assert!(embedder.calls().is_empty());
}

#[tokio::test]
async fn test_exclude_ids_and_min_similarity() {
    let client = semantic_client(
        seeded_backend().await,
        Arc::new(RecordingEmbedder::new(vec![1.0])),
    );

    let excluded = SimilarOptions {
        exclude_ids: vec![" 2 ".to_string()],
        ..SimilarOptions::default()
    };
    let hits = client.similar_to("article", "1", &excluded).await.unwrap();
    assert_eq!(ids(&hits), vec!["3"]);

    let thresholded = SimilarOptions {
        min_similarity: 0.5,
        ..SimilarOptions::default()
    };
    let hits = client.similar_to("article", "1", &thresholded).await.unwrap();
    assert_eq!(ids(&hits), vec!["2"]);
}

#[tokio::test]
async fn test_language_option_selects_embedding_space() {
    let client = semantic_client(
        seeded_backend().await,
        Arc::new(RecordingEmbedder::new(vec![1.0])),
    );
    let opts = SimilarOptions {
        language: "ja".to_string(),
        ..SimilarOptions::default()
    };
    // Document 1 has no Japanese embedding.
    let hits = client.similar_to("article", "1", &opts).await.unwrap();
    assert!(hits.is_empty());
}

#[tokio::test]
async fn test_model_required() {
    let backend = Arc::new(CountingBackend::new(seeded_backend().await));
    let client = lexical_client(backend.clone());

    let err = client
        .similar_to("article", "1", &SimilarOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Model is required for similarity search");
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_entity_required() {
    let client = lexical_client(seeded_backend().await);
    let opts = SimilarOptions {
        model: MODEL.to_string(),
        ..SimilarOptions::default()
    };
    for (entity_type, entity_id) in [("", "1"), ("article", "  ")] {
        let err = client
            .similar_to(entity_type, entity_id, &opts)
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::MissingEntity));
    }
}
