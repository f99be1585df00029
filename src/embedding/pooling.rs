//! Embedding lookup with mask-aware mean pooling.
//!
//! Shared by the dual encoder (both towers) and the cross encoder. The arithmetic matches
//! the training graph exactly: PAD positions are zeroed by a 0/1 mask, the rest summed,
//! and the sum divided by `max(non_pad_count, 1)`.

use candle_core::{D, DType, Device, Module, Tensor};
use candle_nn::Embedding;

use super::error::EmbeddingError;
use super::sequence::IdSequence;

/// One embedding table plus the PAD id it masks out.
#[derive(Debug, Clone)]
pub struct MeanPoolEncoder {
    embedding: Embedding,
    pad_id: u32,
    dim: usize,
}

impl MeanPoolEncoder {
    /// Wraps a `(vocab_size, dim)` table.
    pub fn new(table: Tensor, pad_id: u32) -> Result<Self, EmbeddingError> {
        let (_, dim) = table.dims2()?;
        Ok(Self {
            embedding: Embedding::new(table, dim),
            pad_id,
            dim,
        })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn vocab_size(&self) -> usize {
        self.embedding.embeddings().dims()[0]
    }

    pub fn device(&self) -> &Device {
        self.embedding.embeddings().device()
    }

    /// Stacks sequences into a `(batch, len)` id tensor on this encoder's device.
    pub fn batch_ids(&self, batch: &[IdSequence]) -> Result<Tensor, EmbeddingError> {
        let len = batch.first().map(IdSequence::len).unwrap_or(0);
        if batch.iter().any(|s| s.len() != len) {
            return Err(EmbeddingError::InferenceFailed {
                reason: "sequences in a batch must share one length".to_string(),
            });
        }
        let flat: Vec<u32> = batch.iter().flat_map(|s| s.as_slice().iter().copied()).collect();
        Ok(Tensor::from_vec(flat, (batch.len(), len), self.device())?)
    }

    /// Pools a `(batch, len)` u32 id tensor into `(batch, dim)`.
    pub fn pool(&self, ids: &Tensor) -> Result<Tensor, EmbeddingError> {
        let embedded = self.embedding.forward(ids)?;
        let mask = ids
            .ne(self.pad_id)?
            .to_dtype(DType::F32)?
            .unsqueeze(D::Minus1)?;
        let summed = embedded.broadcast_mul(&mask)?.sum(1)?;
        let denom = mask.sum(1)?.maximum(1f32)?;
        Ok(summed.broadcast_div(&denom)?)
    }

    /// Pools a batch of sequences; returns `(batch, dim)`.
    pub fn pool_sequences(&self, batch: &[IdSequence]) -> Result<Tensor, EmbeddingError> {
        let ids = self.batch_ids(batch)?;
        self.pool(&ids)
    }
}

/// Divides each row by `‖row‖ + 1e-9`.
pub fn l2_normalize_rows(x: &Tensor) -> Result<Tensor, EmbeddingError> {
    let norm = x
        .sqr()?
        .sum_keepdim(D::Minus1)?
        .sqrt()?
        .affine(1.0, crate::constants::NORM_EPSILON)?;
    Ok(x.broadcast_div(&norm)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoder() -> MeanPoolEncoder {
        // id 0 = PAD (non-zero row on purpose so masking is observable)
        let table = Tensor::new(
            &[
                [9.0f32, 9.0],
                [1.0, 0.0],
                [0.0, 1.0],
                [2.0, 2.0],
            ],
            &Device::Cpu,
        )
        .unwrap();
        MeanPoolEncoder::new(table, 0).unwrap()
    }

    fn seq(ids: &[u32]) -> IdSequence {
        let vocab = {
            let map = [("<PAD>", 0u32), ("<UNK>", 1), ("a", 2), ("b", 3)]
                .iter()
                .map(|(t, i)| (t.to_string(), *i))
                .collect();
            crate::embedding::Vocabulary::new(crate::embedding::VocabRole::Retrieval, map)
                .unwrap()
        };
        // Rebuild through the encoder so the sequence type stays opaque.
        let text: Vec<&str> = ids
            .iter()
            .map(|id| match id {
                2 => "a",
                3 => "b",
                _ => "zzz",
            })
            .collect();
        crate::embedding::SequenceEncoder::new(4).encode(&text.join(" "), &vocab)
    }

    #[test]
    fn test_pool_ignores_padding() {
        let pooled = encoder()
            .pool_sequences(&[seq(&[2, 3])])
            .unwrap()
            .to_vec2::<f32>()
            .unwrap();
        assert_eq!(pooled, vec![vec![1.0, 1.5]]);
    }

    #[test]
    fn test_pool_all_pad_is_zero_not_nan() {
        let pooled = encoder()
            .pool_sequences(&[seq(&[])])
            .unwrap()
            .to_vec2::<f32>()
            .unwrap();
        assert_eq!(pooled, vec![vec![0.0, 0.0]]);
    }

    #[test]
    fn test_pool_batch_rows_independent() {
        let pooled = encoder()
            .pool_sequences(&[seq(&[2]), seq(&[1, 3])])
            .unwrap()
            .to_vec2::<f32>()
            .unwrap();
        assert_eq!(pooled[0], vec![0.0, 1.0]);
        assert_eq!(pooled[1], vec![1.5, 1.0]);
    }

    #[test]
    fn test_l2_normalize_rows() {
        let x = Tensor::new(&[[3.0f32, 4.0], [0.0, 0.0]], &Device::Cpu).unwrap();
        let rows = l2_normalize_rows(&x).unwrap().to_vec2::<f32>().unwrap();
        assert!((rows[0][0] - 0.6).abs() < 1e-6);
        assert!((rows[0][1] - 0.8).abs() < 1e-6);
        assert_eq!(rows[1], vec![0.0, 0.0]);
    }
}
