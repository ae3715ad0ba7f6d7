use docqa_core::traits::Embedder;

/// Stand-in used when the real provider failed to load: every text maps to
/// the zero vector, so every similarity score is 0.
pub struct ZeroEmbedder {
    dim: usize,
    id: String,
}

impl ZeroEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim, id: format!("zero:d{dim}") }
    }
}

impl Embedder for ZeroEmbedder {
    fn model_id(&self) -> &str {
        &self.id
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn embed(&self, _text: &str) -> docqa_core::Result<Vec<f32>> {
        Ok(vec![0.0; self.dim])
    }
}
