//! Embedding providers and provider selection.
//!
//! [`load_embedder`] never fails: when the configured model cannot be loaded
//! it logs the cause and hands back a [`ZeroEmbedder`] flagged as degraded, so
//! the service can still start and report the degraded state.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use docqa_core::config::{resolve_with_base, EmbeddingConfig, EmbeddingProviderKind};
use docqa_core::traits::Embedder;
use tracing::{error, info, warn};

pub mod device;
pub mod hash;
pub mod pool;
pub mod sentence;
pub mod tokenize;
pub mod zero;

pub use hash::HashEmbedder;
pub use pool::masked_mean_l2;
pub use sentence::SentenceEmbedder;
pub use zero::ZeroEmbedder;

/// The selected provider plus whether it is the zero-vector fallback.
#[derive(Clone)]
pub struct LoadedEmbedder {
    pub embedder: Arc<dyn Embedder>,
    pub degraded: bool,
}

impl LoadedEmbedder {
    pub fn healthy(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder, degraded: false }
    }

    pub fn degraded(dim: usize) -> Self {
        Self { embedder: Arc::new(ZeroEmbedder::new(dim)), degraded: true }
    }
}

/// `APP_USE_FAKE_EMBEDDINGS=1|true` forces the hash embedder.
pub fn use_fake_embeddings() -> bool {
    std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

pub fn load_embedder(config: &EmbeddingConfig, base_dir: &Path) -> LoadedEmbedder {
    if config.provider == EmbeddingProviderKind::Hash || use_fake_embeddings() {
        info!(dim = config.dim, "using hash embedder");
        return LoadedEmbedder::healthy(Arc::new(HashEmbedder::new(config.dim)));
    }

    let model_dir = resolve_model_dir(config, base_dir);
    match SentenceEmbedder::load(&model_dir, &config.model, config.max_len) {
        Ok(model) => {
            if model.dim() != config.dim {
                warn!(configured = config.dim, actual = model.dim(), "embedding.dim differs from the model; using the model's");
            }
            LoadedEmbedder::healthy(Arc::new(model))
        }
        Err(e) => {
            error!(model = %config.model, dir = %model_dir.display(), error = %format!("{e:#}"), "failed to load embedding model; serving zero vectors");
            LoadedEmbedder::degraded(config.dim)
        }
    }
}

/// `APP_MODEL_DIR` / `MODEL_DIR` override `embedding.model_dir`.
pub fn resolve_model_dir(config: &EmbeddingConfig, base_dir: &Path) -> PathBuf {
    for var in ["APP_MODEL_DIR", "MODEL_DIR"] {
        if let Ok(dir) = std::env::var(var) {
            if !dir.is_empty() {
                return resolve_with_base(base_dir, dir);
            }
        }
    }
    resolve_with_base(base_dir, &config.model_dir)
}

/// Scale `v` to unit L2 norm in place; the zero vector is left unchanged.
pub fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}
