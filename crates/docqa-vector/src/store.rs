//! Embedding-backed chunk store.
//!
//! Scores are dot products of the stored and query embeddings; the embedders
//! in this workspace emit unit vectors, so the score is cosine similarity.

use std::sync::Arc;

use docqa_core::error::{Error, Result};
use docqa_core::traits::Embedder;
use docqa_core::types::{Chunk, ScoredChunk};
use indicatif::ProgressBar;
use serde::Serialize;
use tracing::{debug, warn};

use crate::filter::MetadataFilter;

const EMBED_BATCH: usize = 32;

#[derive(Debug, Clone)]
pub struct EmbeddedChunk {
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
}

/// Outcome of an [`VectorStore::add`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AddReport {
    pub added: usize,
    pub skipped: usize,
}

#[derive(Clone)]
pub struct VectorStore {
    embedder: Arc<dyn Embedder>,
    entries: Vec<EmbeddedChunk>,
}

impl VectorStore {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder, entries: Vec::new() }
    }

    pub fn dim(&self) -> usize {
        self.embedder.dim()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[EmbeddedChunk] {
        &self.entries
    }

    pub fn add(&mut self, chunks: Vec<Chunk>) -> AddReport {
        self.add_with_progress(chunks, &ProgressBar::hidden())
    }

    /// Embed and append `chunks` in order.
    ///
    /// A chunk whose embedding fails, or comes back with the wrong dimension,
    /// is skipped and counted; the rest of the batch is still stored.
    pub fn add_with_progress(&mut self, chunks: Vec<Chunk>, pb: &ProgressBar) -> AddReport {
        let mut report = AddReport::default();
        let dim = self.dim();
        let mut pending = chunks.into_iter().peekable();
        while pending.peek().is_some() {
            let batch: Vec<Chunk> = pending.by_ref().take(EMBED_BATCH).collect();
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let vectors: Vec<Result<Vec<f32>>> = match self.embedder.embed_batch(&texts) {
                Ok(vectors) if vectors.len() == batch.len() => vectors.into_iter().map(Ok).collect(),
                Ok(vectors) => {
                    warn!(expected = batch.len(), got = vectors.len(), "embedder returned wrong count; embedding one by one");
                    texts.iter().map(|t| self.embedder.embed(t)).collect()
                }
                Err(e) => {
                    debug!(error = %e, "batch embedding failed; embedding one by one");
                    texts.iter().map(|t| self.embedder.embed(t)).collect()
                }
            };
            for (chunk, vector) in batch.into_iter().zip(vectors) {
                match vector {
                    Ok(embedding) if embedding.len() == dim => {
                        self.entries.push(EmbeddedChunk { chunk, embedding });
                        report.added += 1;
                    }
                    Ok(embedding) => {
                        warn!(source = %chunk.metadata.source, expected = dim, actual = embedding.len(), "skipping chunk with wrong embedding size");
                        report.skipped += 1;
                    }
                    Err(e) => {
                        warn!(source = %chunk.metadata.source, error = %e, "skipping chunk that failed to embed");
                        report.skipped += 1;
                    }
                }
                pb.inc(1);
            }
        }
        debug!(added = report.added, skipped = report.skipped, total = self.entries.len(), "vector store updated");
        report
    }

    /// Up to `top_k` chunks matching `filter`, best first.
    pub fn search(&self, query: &str, top_k: usize, filter: &MetadataFilter) -> Result<Vec<ScoredChunk>> {
        if self.entries.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }
        let query_vec = self.embedder.embed(query)?;
        self.search_by_vector(&query_vec, top_k, filter)
    }

    /// Ties keep insertion order.
    pub fn search_by_vector(&self, query: &[f32], top_k: usize, filter: &MetadataFilter) -> Result<Vec<ScoredChunk>> {
        if query.len() != self.dim() {
            return Err(Error::DimensionMismatch { expected: self.dim(), actual: query.len() });
        }
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| filter.matches(&e.chunk.metadata))
            .map(|(i, e)| (i, dot(query, &e.embedding)))
            .collect();
        scored.sort_by(|a, b| rank_key(b.1).total_cmp(&rank_key(a.1)));
        scored.truncate(top_k);
        Ok(scored
            .into_iter()
            .map(|(i, score)| ScoredChunk { chunk: self.entries[i].chunk.clone(), score })
            .collect())
    }
}

/// Total order for ranking: NaN sorts last and `-0.0` ties with `0.0`.
fn rank_key(score: f32) -> f32 {
    if score.is_nan() {
        f32::NEG_INFINITY
    } else {
        score + 0.0
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
