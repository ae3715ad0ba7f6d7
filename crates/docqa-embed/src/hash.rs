use std::hash::Hasher;

use docqa_core::traits::Embedder;
use twox_hash::XxHash64;

use crate::l2_normalize;

/// Deterministic bag-of-tokens embedding for tests and offline development.
///
/// Tokens are lower-cased alphanumeric runs hashed into `dim` buckets, so texts
/// sharing words score positively. Text without tokens maps to the first basis
/// vector to keep the output unit-norm.
pub struct HashEmbedder {
    dim: usize,
    id: String,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Self {
        let dim = dim.max(1);
        Self { dim, id: format!("hash:xxh64:d{dim}") }
    }
}

impl Embedder for HashEmbedder {
    fn model_id(&self) -> &str {
        &self.id
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn embed(&self, text: &str) -> docqa_core::Result<Vec<f32>> {
        let mut v = vec![0f32; self.dim];
        let tokens = text.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty());
        for token in tokens {
            let mut hasher = XxHash64::with_seed(0);
            hasher.write(token.to_lowercase().as_bytes());
            let h = hasher.finish();
            let idx = (h % self.dim as u64) as usize;
            let jitter = ((h >> 32) as u32) as f32 / u32::MAX as f32;
            v[idx] += 0.5 + 0.5 * jitter;
        }
        if v.iter().all(|x| *x == 0.0) {
            v[0] = 1.0;
            return Ok(v);
        }
        l2_normalize(&mut v);
        Ok(v)
    }
}
