use crate::error::Result;

/// Maps text to a fixed-dimension, L2-normalized vector.
///
/// The same provider embeds chunks and queries, so cosine similarity reduces
/// to a dot product.
pub trait Embedder: Send + Sync {
    /// Stable identifier of the provider/model (e.g. `hash:xxh64:d384`).
    fn model_id(&self) -> &str;
    fn dim(&self) -> usize;
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}
