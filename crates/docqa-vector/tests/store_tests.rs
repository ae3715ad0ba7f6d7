use std::sync::Arc;

use docqa_core::error::{Error, Result};
use docqa_core::traits::Embedder;
use docqa_core::types::{Chunk, DocumentType, Metadata};
use docqa_embed::{HashEmbedder, ZeroEmbedder};
use docqa_vector::{MetadataFilter, SharedStore, VectorStore};

fn chunk(text: &str, source: &str, doc_type: DocumentType) -> Chunk {
    Chunk::new(text, Metadata::new(source).with_document_type(doc_type))
}

fn hash_store() -> VectorStore {
    VectorStore::new(Arc::new(HashEmbedder::new(256)))
}

fn seeded() -> VectorStore {
    let mut store = hash_store();
    store.add(vec![
        chunk("leave policy details", "hr_policy.pdf", DocumentType::Hr),
        chunk("compressor alarm triggered", "alarm_log.pdf", DocumentType::Ops),
        chunk("pump pressure alarm cleared", "alarm_log.pdf", DocumentType::Ops),
        chunk("incident response steps", "incident_sop.pdf", DocumentType::It),
        chunk("compressor maintenance schedule", "ops_notes.txt", DocumentType::Ops),
        chunk("compressor noise reported by staff", "company_news.pdf", DocumentType::Hr),
    ]);
    store
}

#[test]
fn ops_filter_excludes_other_types_regardless_of_similarity() {
    let mut store = hash_store();
    store.add(vec![
        chunk("leave policy details", "hr.pdf", DocumentType::Hr),
        chunk("compressor alarm triggered", "alarm.pdf", DocumentType::Ops),
    ]);

    let hits = store
        .search("compressor failure", 3, &MetadataFilter::document_type(DocumentType::Ops))
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].chunk.text, "compressor alarm triggered");
    assert!(hits[0].score > 0.0);
}

#[test]
fn every_hit_satisfies_the_filter() {
    let store = seeded();
    for doc_type in DocumentType::ALL {
        let filter = MetadataFilter::document_type(doc_type);
        for hit in store.search("compressor alarm policy", 10, &filter).unwrap() {
            assert_eq!(hit.chunk.document_type(), doc_type);
        }
    }
}

#[test]
fn results_are_sorted_and_bounded() {
    let store = seeded();
    let hits = store.search("compressor alarm", 3, &MetadataFilter::new()).unwrap();
    assert_eq!(hits.len(), 3);
    assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
}

#[test]
fn repeated_searches_agree() {
    let store = seeded();
    let filter = MetadataFilter::new();
    let first = store.search("compressor alarm", 5, &filter).unwrap();
    let second = store.search("compressor alarm", 5, &filter).unwrap();
    assert_eq!(first, second);
}

#[test]
fn equal_scores_keep_insertion_order() {
    let mut store = hash_store();
    store.add(vec![
        Chunk::new("pump alarm", Metadata::new("first.pdf")),
        Chunk::new("unrelated words", Metadata::new("middle.pdf")),
        Chunk::new("pump alarm", Metadata::new("second.pdf")),
    ]);
    let hits = store.search("pump alarm", 2, &MetadataFilter::new()).unwrap();
    let sources: Vec<&str> = hits.iter().map(|h| h.chunk.metadata.source.as_str()).collect();
    assert_eq!(sources, vec!["first.pdf", "second.pdf"]);
    assert_eq!(hits[0].score, hits[1].score);
}

#[test]
fn top_three_is_prefix_of_top_five() {
    let store = seeded();
    let filter = MetadataFilter::new();
    let top3 = store.search("compressor alarm", 3, &filter).unwrap();
    let top5 = store.search("compressor alarm", 5, &filter).unwrap();
    assert_eq!(top3[..], top5[..3]);
}

#[test]
fn empty_store_returns_nothing() {
    let store = hash_store();
    assert!(store.search("anything", 3, &MetadataFilter::new()).unwrap().is_empty());
    let ops = MetadataFilter::document_type(DocumentType::Ops);
    assert!(store.search("compressor", 3, &ops).unwrap().is_empty());
}

#[test]
fn missing_filter_key_matches_nothing() {
    let store = seeded();
    let filter = MetadataFilter::new().with("page", "0");
    assert!(store.search("compressor", 5, &filter).unwrap().is_empty());
}

#[test]
fn query_vector_must_match_dimension() {
    let store = seeded();
    let err = store.search_by_vector(&[1.0, 0.0], 3, &MetadataFilter::new()).unwrap_err();
    assert!(matches!(err, Error::DimensionMismatch { expected: 256, actual: 2 }));
}

#[test]
fn zero_embedder_scores_everything_zero() {
    let mut store = VectorStore::new(Arc::new(ZeroEmbedder::new(8)));
    store.add(vec![chunk("compressor alarm", "a.pdf", DocumentType::Ops)]);
    let hits = store.search("compressor", 3, &MetadataFilter::new()).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].score, 0.0);
}

/// Fails on any text containing "poison".
struct PickyEmbedder(HashEmbedder);

impl Embedder for PickyEmbedder {
    fn model_id(&self) -> &str {
        "picky"
    }

    fn dim(&self) -> usize {
        self.0.dim()
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.contains("poison") {
            return Err(Error::Embedding("refused".into()));
        }
        self.0.embed(text)
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

#[test]
fn failed_embeddings_are_skipped_not_fatal() {
    let mut store = VectorStore::new(Arc::new(PickyEmbedder(HashEmbedder::new(32))));
    let report = store.add(vec![
        Chunk::new("good one", Metadata::new("a.txt")),
        Chunk::new("poison pill", Metadata::new("b.txt")),
        Chunk::new("good two", Metadata::new("c.txt")),
    ]);
    assert_eq!(report.added, 2);
    assert_eq!(report.skipped, 1);
    let sources: Vec<&str> = store.entries().iter().map(|e| e.chunk.metadata.source.as_str()).collect();
    assert_eq!(sources, vec!["a.txt", "c.txt"]);
}

#[test]
fn snapshots_are_isolated_from_later_ingests() {
    let shared = SharedStore::new(Arc::new(HashEmbedder::new(64)));
    shared.ingest(vec![Chunk::new("first batch", Metadata::new("a.txt"))]);
    let before = shared.snapshot();

    let report = shared.ingest(vec![
        Chunk::new("second batch", Metadata::new("b.txt")),
        Chunk::new("third batch", Metadata::new("c.txt")),
    ]);
    assert_eq!(report.added, 2);
    assert_eq!(before.len(), 1);
    assert_eq!(shared.len(), 3);
}

/// Emits NaN components for texts containing "corrupt".
struct NanEmbedder(HashEmbedder);

impl Embedder for NanEmbedder {
    fn model_id(&self) -> &str {
        "nan"
    }

    fn dim(&self) -> usize {
        self.0.dim()
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.contains("corrupt") {
            return Ok(vec![f32::NAN; self.dim()]);
        }
        self.0.embed(text)
    }
}

#[test]
fn nan_scores_rank_last_without_panicking() {
    let mut store = VectorStore::new(Arc::new(NanEmbedder(HashEmbedder::new(64))));
    store.add(vec![
        Chunk::new("corrupt pump alarm", Metadata::new("a.pdf")),
        Chunk::new("pump alarm", Metadata::new("b.pdf")),
        Chunk::new("corrupt reading", Metadata::new("c.pdf")),
        Chunk::new("pump maintenance", Metadata::new("d.pdf")),
    ]);
    let hits = store.search("pump alarm", 4, &MetadataFilter::new()).unwrap();
    let sources: Vec<&str> = hits.iter().map(|h| h.chunk.metadata.source.as_str()).collect();
    assert_eq!(sources, vec!["b.pdf", "d.pdf", "a.pdf", "c.pdf"]);
    assert!(hits[2].score.is_nan() && hits[3].score.is_nan());
}
