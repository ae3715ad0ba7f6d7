use std::sync::Arc;

use docqa_core::config::RetrievalConfig;
use docqa_core::types::{Chunk, DocumentType, Metadata};
use docqa_embed::HashEmbedder;
use docqa_rag::{IntentClassifier, PromptGenerator, Retriever};
use docqa_vector::SharedStore;

fn seeded_store() -> Arc<SharedStore> {
    let store = Arc::new(SharedStore::new(Arc::new(HashEmbedder::new(256))));
    store.ingest(vec![
        Chunk::new("leave policy details", Metadata::new("hr.pdf").with_document_type(DocumentType::Hr)),
        Chunk::new("compressor alarm triggered", Metadata::new("alarm.pdf").with_document_type(DocumentType::Ops)),
    ]);
    store
}

fn retriever(store: Arc<SharedStore>, fallback_unfiltered: bool) -> Retriever {
    let config = RetrievalConfig { top_k: 3, fallback_unfiltered };
    Retriever::new(store, Arc::new(PromptGenerator::new()), config)
}

#[test]
fn classifies_reference_questions() {
    let classifier = IntentClassifier::new();
    assert_eq!(classifier.classify("What does the document say about compliance?"), DocumentType::Hr);
    assert_eq!(classifier.classify("What happened to Compressor C-101?"), DocumentType::Ops);
    assert_eq!(
        classifier.classify(
            "Artificial Intelligence (AI) refers to systems that can perform tasks requiring human intelligence."
        ),
        DocumentType::General
    );
}

#[test]
fn earlier_groups_win() {
    let classifier = IntentClassifier::new();
    assert_eq!(classifier.classify("compressor failure"), DocumentType::It);
    assert_eq!(classifier.classify("pump leave schedule"), DocumentType::Hr);
    assert_eq!(classifier.classify("OUTAGE report"), DocumentType::It);
}

#[test]
fn ops_question_only_sees_ops_chunks() {
    let retrieval = retriever(seeded_store(), false)
        .retrieve_with_intent("  What happened to the compressor alarm?  ")
        .unwrap();
    assert_eq!(retrieval.rewritten, "What happened to the compressor alarm?");
    assert_eq!(retrieval.intent, DocumentType::Ops);
    assert_eq!(retrieval.hits.len(), 1);
    assert_eq!(retrieval.hits[0].chunk.text, "compressor alarm triggered");
    assert!(retrieval.hits[0].score > 0.0);
}

#[test]
fn strict_retrieval_returns_nothing_when_intent_has_no_chunks() {
    // "failure" puts this in IT, and the store holds no IT chunks.
    let retrieval = retriever(seeded_store(), false).retrieve_with_intent("compressor failure").unwrap();
    assert_eq!(retrieval.intent, DocumentType::It);
    assert!(retrieval.hits.is_empty());
    assert!(!retrieval.used_fallback);
}

#[test]
fn fallback_retries_without_the_filter() {
    let retrieval = retriever(seeded_store(), true).retrieve_with_intent("compressor failure").unwrap();
    assert!(retrieval.used_fallback);
    assert_eq!(retrieval.hits.len(), 2);
    assert_eq!(retrieval.hits[0].chunk.text, "compressor alarm triggered");
}

#[test]
fn fallback_is_not_used_when_filtered_search_has_hits() {
    let retrieval = retriever(seeded_store(), true).retrieve_with_intent("leave policy").unwrap();
    assert!(!retrieval.used_fallback);
    assert_eq!(retrieval.hits.len(), 1);
    assert_eq!(retrieval.hits[0].chunk.document_type(), DocumentType::Hr);
}

#[test]
fn empty_store_yields_no_hits_either_way() {
    let store = Arc::new(SharedStore::new(Arc::new(HashEmbedder::new(64))));
    for fallback in [false, true] {
        let retrieval = retriever(Arc::clone(&store), fallback).retrieve_with_intent("compressor alarm").unwrap();
        assert!(retrieval.hits.is_empty());
        assert!(!retrieval.used_fallback);
    }
}
