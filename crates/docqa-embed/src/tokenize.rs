use anyhow::{anyhow, Result};
use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;

/// Model inputs for a batch, padded to the longest row (at most `max_len`).
pub struct EncodedBatch {
    pub input_ids: Tensor,
    pub token_type_ids: Tensor,
    pub attention_mask: Tensor,
}

pub fn encode_batch(tokenizer: &Tokenizer, texts: &[String], max_len: usize, device: &Device) -> Result<EncodedBatch> {
    let pad_id = tokenizer.get_padding().map_or(0, |p| p.pad_id);
    let mut rows = Vec::with_capacity(texts.len());
    for text in texts {
        let enc = tokenizer.encode(text.as_str(), true).map_err(|e| anyhow!("Tokenization failed: {}", e))?;
        let mut ids = enc.get_ids().to_vec();
        let mut type_ids = enc.get_type_ids().to_vec();
        let mut mask = enc.get_attention_mask().to_vec();
        ids.truncate(max_len);
        type_ids.truncate(max_len);
        mask.truncate(max_len);
        rows.push((ids, type_ids, mask));
    }

    let seq_len = rows.iter().map(|(ids, _, _)| ids.len()).max().unwrap_or(0).max(1);
    let mut all_ids = Vec::with_capacity(rows.len() * seq_len);
    let mut all_types = Vec::with_capacity(rows.len() * seq_len);
    let mut all_mask = Vec::with_capacity(rows.len() * seq_len);
    for (mut ids, mut type_ids, mut mask) in rows {
        ids.resize(seq_len, pad_id);
        type_ids.resize(seq_len, 0);
        mask.resize(seq_len, 0);
        all_ids.extend(ids);
        all_types.extend(type_ids);
        all_mask.extend(mask);
    }

    let shape = (texts.len(), seq_len);
    Ok(EncodedBatch {
        input_ids: Tensor::from_vec(all_ids, shape, device)?,
        token_type_ids: Tensor::from_vec(all_types, shape, device)?,
        attention_mask: Tensor::from_vec(all_mask, shape, device)?,
    })
}
