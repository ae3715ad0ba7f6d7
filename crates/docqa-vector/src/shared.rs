use std::sync::{Arc, Mutex, PoisonError, RwLock};

use docqa_core::traits::Embedder;
use docqa_core::types::Chunk;
use indicatif::ProgressBar;

use crate::store::{AddReport, VectorStore};

/// A [`VectorStore`] that serves queries while it is being extended.
///
/// Writers build a new store from a clone of the current one and swap it in,
/// so a reader's [`snapshot`](Self::snapshot) never observes a half-applied
/// ingest. Writers are serialized.
pub struct SharedStore {
    current: RwLock<Arc<VectorStore>>,
    writer: Mutex<()>,
}

impl SharedStore {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { current: RwLock::new(Arc::new(VectorStore::new(embedder))), writer: Mutex::new(()) }
    }

    pub fn snapshot(&self) -> Arc<VectorStore> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ingest(&self, chunks: Vec<Chunk>) -> AddReport {
        self.ingest_with_progress(chunks, &ProgressBar::hidden())
    }

    pub fn ingest_with_progress(&self, chunks: Vec<Chunk>, pb: &ProgressBar) -> AddReport {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = (*self.snapshot()).clone();
        let report = next.add_with_progress(chunks, pb);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(next);
        report
    }
}
