//! The question-answering service and its lifecycle.
//!
//! One [`QaService`] is built per process and shared by reference (the HTTP
//! layer holds it in an `Arc`). It starts `Initializing`, becomes `Ready` or
//! `Degraded` once ingestion finishes, and refuses queries after `shutdown`.

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use docqa_core::config::{resolve_with_base, AppConfig};
use docqa_core::error::Result;
use docqa_core::types::SourceDocument;
use docqa_embed::{load_embedder, LoadedEmbedder};
use docqa_text::{DocumentLoader, LoadReport, TextChunker};
use docqa_vector::SharedStore;
use indicatif::ProgressBar;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::generator::{build_generator, Generator};
use crate::retriever::Retriever;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Readiness {
    Initializing,
    Ready,
    /// Serving, but the embedding model failed to load and every score is 0.
    Degraded,
    ShuttingDown,
}

impl Readiness {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initializing => "INITIALIZING",
            Self::Ready => "READY",
            Self::Degraded => "DEGRADED",
            Self::ShuttingDown => "SHUTTING_DOWN",
        }
    }

    /// Whether queries are accepted in this state.
    pub fn is_serving(self) -> bool {
        matches!(self, Self::Ready | Self::Degraded)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("the question-answering service is not initialized")]
    NotReady,
    #[error("question must not be empty")]
    EmptyQuestion,
    #[error("failed to process the question: {0}")]
    Processing(String),
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    pub load: LoadReport,
    pub chunks: usize,
    pub embedded: usize,
    pub skipped: usize,
    pub degraded: bool,
}

pub struct QaService {
    config: AppConfig,
    base_dir: PathBuf,
    chunker: TextChunker,
    store: Arc<SharedStore>,
    retriever: Retriever,
    generator: Arc<dyn Generator>,
    degraded: bool,
    readiness: RwLock<Readiness>,
}

impl QaService {
    pub fn new(config: AppConfig, embedder: LoadedEmbedder, generator: Arc<dyn Generator>) -> Self {
        let store = Arc::new(SharedStore::new(embedder.embedder));
        let retriever = Retriever::new(Arc::clone(&store), Arc::clone(&generator), config.retrieval.clone());
        Self {
            chunker: TextChunker::from_config(&config.chunking),
            base_dir: PathBuf::from("."),
            config,
            store,
            retriever,
            generator,
            degraded: embedder.degraded,
            readiness: RwLock::new(Readiness::Initializing),
        }
    }

    /// Load the embedder and generator named by `config`. Relative paths
    /// resolve against `base_dir`. The service is left `Initializing`.
    pub fn from_config(config: AppConfig, base_dir: &Path) -> Result<Self> {
        config.validate()?;
        let embedder = load_embedder(&config.embedding, base_dir);
        let generator = build_generator(&config.generator)?;
        let mut service = Self::new(config, embedder, generator);
        service.base_dir = base_dir.to_path_buf();
        Ok(service)
    }

    /// `from_config`, ingest `data.pdf_folder`, mark ready.
    pub fn bootstrap(config: AppConfig, base_dir: &Path) -> Result<(Self, IngestReport)> {
        let service = Self::from_config(config, base_dir)?;
        let report = service.ingest_folder(None, &ProgressBar::hidden());
        service.mark_ready();
        Ok((service, report))
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn chunk_count(&self) -> usize {
        self.store.len()
    }

    pub fn data_folder(&self) -> PathBuf {
        resolve_with_base(&self.base_dir, &self.config.data.pdf_folder)
    }

    pub fn ingest(&self, documents: &[SourceDocument]) -> IngestReport {
        self.ingest_with_progress(documents, &ProgressBar::hidden())
    }

    /// Chunk and embed `documents` into the store. `pb` is sized to the chunk
    /// count before embedding starts.
    pub fn ingest_with_progress(&self, documents: &[SourceDocument], pb: &ProgressBar) -> IngestReport {
        let chunks = self.chunker.chunk_documents(documents);
        let chunk_total = chunks.len();
        pb.set_length(chunk_total as u64);
        let added = self.store.ingest_with_progress(chunks, pb);
        if added.skipped > 0 {
            warn!(skipped = added.skipped, "some chunks could not be embedded");
        }
        info!(chunks = chunk_total, stored = self.store.len(), "ingestion finished");
        IngestReport {
            load: LoadReport::default(),
            chunks: chunk_total,
            embedded: added.added,
            skipped: added.skipped,
            degraded: self.degraded,
        }
    }

    /// Load and ingest `folder`, or `data.pdf_folder` when `None`.
    pub fn ingest_folder(&self, folder: Option<&Path>, pb: &ProgressBar) -> IngestReport {
        let dir = folder.map_or_else(|| self.data_folder(), Path::to_path_buf);
        let corpus = DocumentLoader::new().load_folder(&dir);
        if corpus.documents.is_empty() {
            warn!(folder = %dir.display(), "no documents loaded; answers will fall back");
        }
        let mut report = self.ingest_with_progress(&corpus.documents, pb);
        report.load = corpus.report;
        report
    }

    /// Leave `Initializing`. No effect once shutting down.
    pub fn mark_ready(&self) {
        let mut state = self.readiness.write().unwrap_or_else(PoisonError::into_inner);
        if *state == Readiness::ShuttingDown {
            return;
        }
        *state = if self.degraded { Readiness::Degraded } else { Readiness::Ready };
        info!(state = state.as_str(), chunks = self.store.len(), "question answering service ready");
    }

    pub fn readiness(&self) -> Readiness {
        *self.readiness.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn shutdown(&self) {
        *self.readiness.write().unwrap_or_else(PoisonError::into_inner) = Readiness::ShuttingDown;
        info!("question answering service shutting down");
    }

    pub fn query(&self, question: &str) -> std::result::Result<String, QueryError> {
        if !self.readiness().is_serving() {
            return Err(QueryError::NotReady);
        }
        let question = question.trim();
        if question.is_empty() {
            return Err(QueryError::EmptyQuestion);
        }
        let hits = self.retriever.retrieve(question).map_err(|e| processing_error(question, &e))?;
        self.generator
            .generate_answer(question, &hits)
            .map_err(|e| processing_error(question, &e))
    }
}

fn processing_error(question: &str, e: &docqa_core::Error) -> QueryError {
    error!(question, error = %e, "query failed");
    QueryError::Processing(e.to_string())
}
