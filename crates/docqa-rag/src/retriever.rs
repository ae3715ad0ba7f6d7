use std::sync::Arc;

use docqa_core::config::RetrievalConfig;
use docqa_core::error::Result;
use docqa_core::types::{DocumentType, ScoredChunk};
use docqa_vector::{MetadataFilter, SharedStore};
use tracing::debug;

use crate::generator::Generator;
use crate::intent::IntentClassifier;

/// What a retrieval decided, alongside the hits.
#[derive(Debug, Clone)]
pub struct Retrieval {
    pub rewritten: String,
    pub intent: DocumentType,
    pub hits: Vec<ScoredChunk>,
    /// The intent filter found nothing and the unfiltered retry ran.
    pub used_fallback: bool,
}

/// Intent-scoped search over the shared store.
pub struct Retriever {
    store: Arc<SharedStore>,
    generator: Arc<dyn Generator>,
    classifier: IntentClassifier,
    config: RetrievalConfig,
}

impl Retriever {
    pub fn new(store: Arc<SharedStore>, generator: Arc<dyn Generator>, config: RetrievalConfig) -> Self {
        Self { store, generator, classifier: IntentClassifier::new(), config }
    }

    pub fn retrieve(&self, query: &str) -> Result<Vec<ScoredChunk>> {
        Ok(self.retrieve_with_intent(query)?.hits)
    }

    /// Rewrite, classify, then search with `document_type = intent`.
    ///
    /// Strict unless `retrieval.fallback_unfiltered` is set, in which case an
    /// empty filtered result is retried once without the filter.
    pub fn retrieve_with_intent(&self, query: &str) -> Result<Retrieval> {
        let rewritten = self.generator.rewrite_query(query);
        let intent = self.classifier.classify(&rewritten);
        let store = self.store.snapshot();

        let mut hits = store.search(&rewritten, self.config.top_k, &MetadataFilter::document_type(intent))?;
        let mut used_fallback = false;
        if hits.is_empty() && self.config.fallback_unfiltered && !store.is_empty() {
            hits = store.search(&rewritten, self.config.top_k, &MetadataFilter::new())?;
            used_fallback = true;
        }
        debug!(%intent, hits = hits.len(), used_fallback, "retrieved context");
        Ok(Retrieval { rewritten, intent, hits, used_fallback })
    }
}
