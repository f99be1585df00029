//! Dual (two-tower) retrieval encoder.
//!
//! Query and deal towers have independent embedding tables over the same retrieval
//! vocabulary; there is no projection after pooling.

use std::path::Path;

use candle_core::{Device, Tensor};
use tracing::info;

use super::error::EmbeddingError;
use super::pooling::MeanPoolEncoder;
use super::sequence::IdSequence;
use super::vocab::Vocabulary;
use super::weights::WeightMap;

pub const QUERY_TABLE: &str = "query_encoder.emb.weight";
pub const DEAL_TABLE: &str = "deal_encoder.emb.weight";

#[derive(Debug, Clone)]
pub struct DualEncoder {
    query: MeanPoolEncoder,
    deal: MeanPoolEncoder,
    fingerprint: Option<String>,
}

impl DualEncoder {
    pub fn new(query: MeanPoolEncoder, deal: MeanPoolEncoder) -> Result<Self, EmbeddingError> {
        if query.dim() != deal.dim() {
            return Err(EmbeddingError::ShapeMismatch {
                name: DEAL_TABLE.to_string(),
                expected: vec![deal.vocab_size(), query.dim()],
                actual: vec![deal.vocab_size(), deal.dim()],
            });
        }
        Ok(Self {
            query,
            deal,
            fingerprint: None,
        })
    }

    /// Builds both towers, requiring `vocab.len()` rows in each table.
    pub fn from_weights(weights: &WeightMap, vocab: &Vocabulary) -> Result<Self, EmbeddingError> {
        let query_table = weights.matrix(QUERY_TABLE, Some(vocab.len()), None)?;
        let dim = query_table.dims2()?.1;
        let deal_table = weights.matrix(DEAL_TABLE, Some(vocab.len()), Some(dim))?;

        let mut encoder = Self::new(
            MeanPoolEncoder::new(query_table, vocab.pad_id())?,
            MeanPoolEncoder::new(deal_table, vocab.pad_id())?,
        )?;
        encoder.fingerprint = weights.fingerprint().map(str::to_owned);
        Ok(encoder)
    }

    pub fn load(path: &Path, vocab: &Vocabulary, device: &Device) -> Result<Self, EmbeddingError> {
        let weights = WeightMap::load(path, device)?;
        let encoder = Self::from_weights(&weights, vocab)?;
        info!(
            path = %path.display(),
            vocab_size = vocab.len(),
            dim = encoder.dim(),
            "Dual encoder loaded"
        );
        Ok(encoder)
    }

    pub fn dim(&self) -> usize {
        self.query.dim()
    }

    pub fn fingerprint(&self) -> Option<&str> {
        self.fingerprint.as_deref()
    }

    pub fn device(&self) -> &Device {
        self.query.device()
    }

    /// Pooled, un-normalized query vectors, `(batch, dim)`.
    pub fn embed_queries(&self, batch: &[IdSequence]) -> Result<Tensor, EmbeddingError> {
        self.query.pool_sequences(batch)
    }

    /// Pooled, un-normalized deal vectors, `(batch, dim)`.
    pub fn embed_deals(&self, batch: &[IdSequence]) -> Result<Tensor, EmbeddingError> {
        self.deal.pool_sequences(batch)
    }
}
