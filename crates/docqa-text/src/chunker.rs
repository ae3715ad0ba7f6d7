use docqa_core::config::ChunkingConfig;
use docqa_core::types::{Chunk, DocumentType, KeywordRules, Metadata, SourceDocument};
use tracing::debug;

use crate::clean::clean_text;

/// Source-path keywords, checked in order.
const SOURCE_RULES: KeywordRules = KeywordRules(&[
    (DocumentType::Hr, &["policy", "company", "hr"]),
    (DocumentType::It, &["incident", "sop"]),
    (DocumentType::Ops, &["alarm", "log"]),
]);

/// Derive a document type from a source path (case-insensitive substring match).
pub fn document_type_for_source(source: &str) -> DocumentType {
    SOURCE_RULES.classify(source)
}

/// Splits text into overlapping windows of whitespace-delimited words.
#[derive(Debug, Clone)]
pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::from_config(&ChunkingConfig::default())
    }
}

impl TextChunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size: chunk_size.max(1), chunk_overlap }
    }

    pub fn from_config(config: &ChunkingConfig) -> Self {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    /// Words advanced per window. Never zero, even when overlap >= size.
    pub fn step(&self) -> usize {
        self.chunk_size.saturating_sub(self.chunk_overlap).max(1)
    }

    /// Split already-cleaned `text` into chunks tagged from `metadata.source`.
    ///
    /// The walk stops at the first window that reaches the last word, so no
    /// trailing window lies entirely inside the previous window's overlap.
    pub fn chunk(&self, text: &str, metadata: &Metadata) -> Vec<Chunk> {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            return Vec::new();
        }
        let mut base = metadata.clone();
        base.document_type = document_type_for_source(&base.source);

        let step = self.step();
        let mut chunks = Vec::new();
        let mut start = 0;
        loop {
            let end = (start + self.chunk_size).min(words.len());
            chunks.push(Chunk::new(words[start..end].join(" "), base.clone()));
            if end >= words.len() {
                break;
            }
            start += step;
        }
        chunks
    }

    /// Clean and chunk one extracted document.
    pub fn chunk_document(&self, doc: &SourceDocument) -> Vec<Chunk> {
        self.chunk(&clean_text(&doc.text), &doc.metadata)
    }

    pub fn chunk_documents(&self, docs: &[SourceDocument]) -> Vec<Chunk> {
        let chunks: Vec<Chunk> = docs.iter().flat_map(|d| self.chunk_document(d)).collect();
        debug!(documents = docs.len(), chunks = chunks.len(), "chunked documents");
        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn source_keywords_follow_priority_order() {
        assert_eq!(document_type_for_source("Training_pdfs/Company_Leave.pdf"), DocumentType::Hr);
        assert_eq!(document_type_for_source("docs/HR_incident.pdf"), DocumentType::Hr);
        assert_eq!(document_type_for_source("docs/Incident_Report.pdf"), DocumentType::It);
        assert_eq!(document_type_for_source("docs/backup_SOP.pdf"), DocumentType::It);
        assert_eq!(document_type_for_source("alarm_logs/c101.pdf"), DocumentType::Ops);
        assert_eq!(document_type_for_source("intro_to_ai.pdf"), DocumentType::General);
    }

    #[test]
    fn windows_overlap_by_configured_words() {
        let chunker = TextChunker::new(4, 1);
        let chunks = chunker.chunk(&words(10), &Metadata::new("a.txt"));
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["w0 w1 w2 w3", "w3 w4 w5 w6", "w6 w7 w8 w9"]);
    }

    #[test]
    fn last_window_may_be_short() {
        let chunker = TextChunker::new(4, 1);
        let chunks = chunker.chunk(&words(8), &Metadata::new("a.txt"));
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2].text, "w6 w7");
    }

    #[test]
    fn degenerate_overlap_still_terminates() {
        let chunker = TextChunker::new(3, 5);
        assert_eq!(chunker.step(), 1);
        let chunks = chunker.chunk(&words(6), &Metadata::new("a.txt"));
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks.last().map(|c| c.text.as_str()), Some("w3 w4 w5"));
    }
}
