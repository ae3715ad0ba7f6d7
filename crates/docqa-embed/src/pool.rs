use candle_core::{DType, Result, Tensor};

/// Mean of token states over the attention mask, L2-normalized per row.
///
/// `hidden` is `[batch, tokens, hidden]` and `attention_mask` is
/// `[batch, tokens]`; the result is `[batch, hidden]`.
pub fn masked_mean_l2(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    hidden.dims3()?;
    let mask = attention_mask.to_device(hidden.device())?.to_dtype(hidden.dtype())?;
    let mask_3d = mask.unsqueeze(2)?.broadcast_as(hidden.shape())?;
    let summed = (hidden * &mask_3d)?.sum(1)?;
    let lengths = mask.sum_keepdim(1)?;
    let mean = summed.broadcast_div(&lengths)?;

    let eps_val = match hidden.dtype() {
        DType::F16 | DType::BF16 => 1e-6f32,
        _ => 1e-12f32,
    };
    let eps = Tensor::new(&[eps_val], hidden.device())?.to_dtype(hidden.dtype())?;
    let norm = mean.sqr()?.sum_keepdim(1)?.sqrt()?.broadcast_add(&eps)?;
    mean.broadcast_div(&norm)
}
