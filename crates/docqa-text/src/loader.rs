//! Reads source documents from a folder.
//!
//! PDFs yield one [`SourceDocument`] per page (0-based `page`), `.txt` files
//! yield one document each. A file that cannot be read or parsed is skipped
//! and recorded in the [`LoadReport`]; it never aborts the whole run.

use std::fs;
use std::path::{Path, PathBuf};

use docqa_core::error::{Error, Result};
use docqa_core::types::{Metadata, SourceDocument};
use serde::Serialize;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    pub files_seen: usize,
    pub files_loaded: usize,
    pub pages: usize,
    pub failures: Vec<LoadFailure>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct LoadedCorpus {
    pub documents: Vec<SourceDocument>,
    pub report: LoadReport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Pdf,
    Text,
}

impl FileKind {
    fn of(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" => Some(Self::Text),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct DocumentLoader;

impl DocumentLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load every supported file under `dir`, in path order.
    pub fn load_folder(&self, dir: &Path) -> LoadedCorpus {
        let mut corpus = LoadedCorpus::default();
        if !dir.is_dir() {
            error!(folder = %dir.display(), "document folder not found");
            return corpus;
        }
        info!(folder = %dir.display(), "loading documents");
        for path in self.list_files(dir) {
            corpus.report.files_seen += 1;
            match self.load_file(&path) {
                Ok(docs) => {
                    debug!(file = %path.display(), pages = docs.len(), "loaded");
                    corpus.report.files_loaded += 1;
                    corpus.report.pages += docs.len();
                    corpus.documents.extend(docs);
                }
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "skipping document");
                    corpus.report.failures.push(LoadFailure { path, reason: e.to_string() });
                }
            }
        }
        info!(
            files = corpus.report.files_loaded,
            pages = corpus.report.pages,
            failed = corpus.report.failures.len(),
            "document loading finished"
        );
        corpus
    }

    pub fn load_file(&self, path: &Path) -> Result<Vec<SourceDocument>> {
        match FileKind::of(path) {
            Some(FileKind::Pdf) => self.load_pdf(path),
            Some(FileKind::Text) => self.load_txt(path),
            None => Err(Error::Extraction {
                path: path.display().to_string(),
                reason: "unsupported file type".to_string(),
            }),
        }
    }

    fn load_pdf(&self, path: &Path) -> Result<Vec<SourceDocument>> {
        let source = path.display().to_string();
        let extraction = |reason: String| Error::Extraction { path: source.clone(), reason };

        let doc = lopdf::Document::load(path).map_err(|e| extraction(e.to_string()))?;
        let pages = doc.get_pages();
        let total_pages = pages.len().to_string();
        let mut out = Vec::with_capacity(pages.len());
        for (index, page_number) in pages.keys().copied().enumerate() {
            let text = match doc.extract_text(&[page_number]) {
                Ok(text) => text,
                Err(e) => {
                    warn!(file = %source, page = page_number, error = %e, "skipping unreadable page");
                    continue;
                }
            };
            let page = u32::try_from(index).map_err(|e| extraction(e.to_string()))?;
            let metadata = Metadata::new(source.as_str())
                .with_page(page)
                .with_extra("total_pages", total_pages.as_str());
            out.push(SourceDocument { text, metadata });
        }
        Ok(out)
    }

    fn load_txt(&self, path: &Path) -> Result<Vec<SourceDocument>> {
        let text = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => String::from_utf8_lossy(&fs::read(path)?).to_string(),
        };
        Ok(vec![SourceDocument { text, metadata: Metadata::new(path.display().to_string()) }])
    }

    fn list_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| FileKind::of(p).is_some())
            .collect();
        files.sort();
        files
    }
}
