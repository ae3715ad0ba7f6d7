//! Local sentence-transformer embeddings (BERT family, e.g. all-MiniLM-L6-v2).
//!
//! Expects a model directory holding `config.json`, `tokenizer.json` and
//! either `model.safetensors` or `pytorch_model.bin`.

use anyhow::{anyhow, bail, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use docqa_core::error::Error;
use docqa_core::traits::Embedder;
use tokenizers::Tokenizer;
use tracing::{info, warn};

use crate::device::select_device;
use crate::pool::masked_mean_l2;
use crate::tokenize::encode_batch;

const SLOW_BATCH: Duration = Duration::from_millis(500);

pub struct SentenceEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    model_id: String,
    dim: usize,
    max_len: usize,
}

impl SentenceEmbedder {
    pub fn load(model_dir: &Path, model_id: &str, max_len: usize) -> Result<Self> {
        if !model_dir.is_dir() {
            bail!("model directory {} does not exist", model_dir.display());
        }
        let device = select_device();
        info!(model = model_id, dir = %model_dir.display(), "loading sentence embedder");

        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;

        let config_json = fs::read_to_string(model_dir.join("config.json"))?;
        let config: BertConfig = serde_json::from_str(&config_json)?;
        let raw: serde_json::Value = serde_json::from_str(&config_json)?;
        let dim = raw["hidden_size"]
            .as_u64()
            .and_then(|d| usize::try_from(d).ok())
            .ok_or_else(|| anyhow!("config.json has no usable hidden_size"))?;

        let vb = load_weights(model_dir, &device)?;
        let model = BertModel::load(vb, &config)?;
        info!(model = model_id, dim, "sentence embedder ready");
        Ok(Self { model, tokenizer, device, model_id: model_id.to_string(), dim, max_len: max_len.max(2) })
    }

    fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let start = Instant::now();
        let batch = encode_batch(&self.tokenizer, texts, self.max_len, &self.device)?;
        let hidden = self.model.forward(&batch.input_ids, &batch.token_type_ids, Some(&batch.attention_mask))?;
        let pooled = masked_mean_l2(&hidden, &batch.attention_mask)?;
        let rows = pooled.to_device(&Device::Cpu)?.to_dtype(DType::F32)?.to_vec2::<f32>()?;
        if start.elapsed() > SLOW_BATCH {
            warn!(texts = texts.len(), elapsed_ms = start.elapsed().as_millis(), "slow embedding batch");
        }
        Ok(rows)
    }
}

fn load_weights(model_dir: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    let safetensors = model_dir.join("model.safetensors");
    if safetensors.exists() {
        // SAFETY: the weights file is mapped read-only and must not change while the model is alive.
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[safetensors], DType::F32, device)? };
        return Ok(vb);
    }
    let pickle = model_dir.join("pytorch_model.bin");
    if pickle.exists() {
        let weights: HashMap<String, Tensor> = candle_core::pickle::read_all(&pickle)?.into_iter().collect();
        return Ok(VarBuilder::from_tensors(weights, DType::F32, device));
    }
    bail!("no model.safetensors or pytorch_model.bin in {}", model_dir.display())
}

impl Embedder for SentenceEmbedder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn embed(&self, text: &str) -> docqa_core::Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])?
            .pop()
            .ok_or_else(|| Error::Embedding("model returned no rows".to_string()))
    }

    fn embed_batch(&self, texts: &[String]) -> docqa_core::Result<Vec<Vec<f32>>> {
        self.embed_texts(texts).map_err(|e| Error::Embedding(format!("{e:#}")))
    }
}
