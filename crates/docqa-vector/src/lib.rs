//! In-memory vector store with metadata-filtered cosine search.

pub mod filter;
pub mod shared;
pub mod store;

pub use filter::MetadataFilter;
pub use shared::SharedStore;
pub use store::{AddReport, EmbeddedChunk, VectorStore};
