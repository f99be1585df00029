//! Cross encoder: pooled `[query][SEP][item]` embedding through a two-layer head.
//!
//! `emb -> mean pool -> Linear(dim, hidden) -> ReLU -> Linear(hidden, 4) -> softmax`.

use std::path::Path;

use candle_core::{Device, Module, Tensor};
use candle_nn::Linear;
use candle_nn::ops::softmax_last_dim;
use tracing::info;

use crate::constants::RELEVANCE_CLASSES;

use super::error::EmbeddingError;
use super::pooling::MeanPoolEncoder;
use super::sequence::IdSequence;
use super::vocab::Vocabulary;
use super::weights::WeightMap;

pub const CROSS_TABLE: &str = "emb.weight";
pub const HIDDEN_WEIGHT: &str = "mlp.0.weight";
pub const HIDDEN_BIAS: &str = "mlp.0.bias";
pub const OUTPUT_WEIGHT: &str = "mlp.2.weight";
pub const OUTPUT_BIAS: &str = "mlp.2.bias";

#[derive(Debug, Clone)]
pub struct CrossEncoder {
    pooler: MeanPoolEncoder,
    hidden: Linear,
    output: Linear,
    hidden_size: usize,
    fingerprint: Option<String>,
}

impl CrossEncoder {
    /// Builds the scorer, checking the table against `vocab` and the head against each other.
    pub fn from_weights(weights: &WeightMap, vocab: &Vocabulary) -> Result<Self, EmbeddingError> {
        let table = weights.matrix(CROSS_TABLE, Some(vocab.len()), None)?;
        let dim = table.dims2()?.1;

        let hidden_w = weights.matrix(HIDDEN_WEIGHT, None, Some(dim))?;
        let hidden_size = hidden_w.dims2()?.0;
        let hidden_b = weights.vector(HIDDEN_BIAS, hidden_size)?;
        let output_w = weights.matrix(OUTPUT_WEIGHT, Some(RELEVANCE_CLASSES), Some(hidden_size))?;
        let output_b = weights.vector(OUTPUT_BIAS, RELEVANCE_CLASSES)?;

        Ok(Self {
            pooler: MeanPoolEncoder::new(table, vocab.pad_id())?,
            hidden: Linear::new(hidden_w, Some(hidden_b)),
            output: Linear::new(output_w, Some(output_b)),
            hidden_size,
            fingerprint: weights.fingerprint().map(str::to_owned),
        })
    }

    pub fn load(path: &Path, vocab: &Vocabulary, device: &Device) -> Result<Self, EmbeddingError> {
        let weights = WeightMap::load(path, device)?;
        let encoder = Self::from_weights(&weights, vocab)?;
        info!(
            path = %path.display(),
            vocab_size = vocab.len(),
            dim = encoder.dim(),
            hidden = encoder.hidden_size,
            "Cross encoder loaded"
        );
        Ok(encoder)
    }

    pub fn dim(&self) -> usize {
        self.pooler.dim()
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    pub fn fingerprint(&self) -> Option<&str> {
        self.fingerprint.as_deref()
    }

    /// Raw head outputs, `(batch, 4)`.
    pub fn logits(&self, batch: &[IdSequence]) -> Result<Tensor, EmbeddingError> {
        let pooled = self.pooler.pool_sequences(batch)?;
        let hidden = self.hidden.forward(&pooled)?.relu()?;
        Ok(self.output.forward(&hidden)?)
    }

    /// Softmax over the relevance classes for every pair in `batch`.
    pub fn probabilities(
        &self,
        batch: &[IdSequence],
    ) -> Result<Vec<[f32; RELEVANCE_CLASSES]>, EmbeddingError> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }
        let probs = softmax_last_dim(&self.logits(batch)?)?.to_vec2::<f32>()?;
        probs
            .into_iter()
            .map(|row| {
                row.try_into().map_err(|row: Vec<f32>| EmbeddingError::InferenceFailed {
                    reason: format!("expected {RELEVANCE_CLASSES} classes, got {}", row.len()),
                })
            })
            .collect()
    }
}
