//! docqa-text
//!
//! Text extraction, cleaning and word-window chunking. See `loader` for how
//! documents are read from disk and `chunker` for how they are tagged and split.

pub mod chunker;
pub mod clean;
pub mod loader;

pub use chunker::{document_type_for_source, TextChunker};
pub use clean::{clean_text, normalize_whitespace};
pub use loader::{DocumentLoader, LoadFailure, LoadReport, LoadedCorpus};
