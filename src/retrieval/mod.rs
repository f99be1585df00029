//! Dense retrieval: embed the query, cosine against every catalog vector, keep the top N.


use std::cmp::Ordering;

use tracing::debug;

use crate::catalog::{CatalogError, CatalogIndex};
use crate::embedding::{DualEncoder, SequenceEncoder, Vocabulary, l2_normalize_rows};

/// A retrieved catalog row and its cosine similarity to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetrievalHit {
    pub index: usize,
    pub similarity: f32,
}

/// Query-side retrieval over a fixed [`CatalogIndex`].
#[derive(Debug, Clone)]
pub struct Retriever {
    encoder: DualEncoder,
    vocab: Vocabulary,
    index: CatalogIndex,
    sequence: SequenceEncoder,
}

impl Retriever {
    pub fn new(encoder: DualEncoder, vocab: Vocabulary, index: CatalogIndex) -> Self {
        Self {
            encoder,
            vocab,
            index,
            sequence: SequenceEncoder::default(),
        }
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn encoder(&self) -> &DualEncoder {
        &self.encoder
    }

    pub fn index(&self) -> &CatalogIndex {
        &self.index
    }

    pub fn catalog_size(&self) -> usize {
        self.index.len()
    }

    /// Cosine similarity of the query against every catalog row, in catalog order.
    pub fn similarities(&self, query: &str) -> Result<Vec<f32>, CatalogError> {
        let ids = self.sequence.encode(query, &self.vocab);
        let pooled = self.encoder.embed_queries(&[ids])?;
        let unit = l2_normalize_rows(&pooled)?;
        self.index.similarities(&unit)
    }

    /// Returns `min(top_n, catalog_size)` hits by descending similarity.
    ///
    /// Equal similarities keep catalog order.
    pub fn retrieve(&self, query: &str, top_n: usize) -> Result<Vec<RetrievalHit>, CatalogError> {
        let sims = self.similarities(query)?;
        let hits = top_by_score(&sims, top_n)
            .into_iter()
            .map(|index| RetrievalHit {
                index,
                similarity: sims[index],
            })
            .collect::<Vec<_>>();

        debug!(
            query_len = query.len(),
            top_n,
            returned = hits.len(),
            top_similarity = hits.first().map(|h| h.similarity),
            "Retrieval complete"
        );

        Ok(hits)
    }
}

/// Positions of the `k` largest scores, descending, ties in original order.
pub(crate) fn top_by_score(scores: &[f32], k: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| descending_score(scores[a], scores[b]));
    order.truncate(k);
    order
}

/// Total descending order on scores. NaN ranks with negative infinity; `-0.0` ties with `0.0`.
pub(crate) fn descending_score(a: f32, b: f32) -> Ordering {
    rank_key(b).total_cmp(&rank_key(a))
}

fn rank_key(score: f32) -> f32 {
    if score.is_nan() {
        f32::NEG_INFINITY
    } else {
        score + 0.0
    }
}
