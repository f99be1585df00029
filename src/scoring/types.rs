use crate::constants::{MAX_RELEVANCE, RELEVANCE_CLASSES};

/// Probability-weighted relevance class, `Σ class × p(class)`, clamped to `[0, 3]`.
pub fn expected_relevance(probs: &[f32; RELEVANCE_CLASSES]) -> f32 {
    probs
        .iter()
        .enumerate()
        .map(|(class, p)| class as f32 * p)
        .sum::<f32>()
        .clamp(0.0, MAX_RELEVANCE)
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// A retrieval candidate that survived reranking.
pub struct RankedCandidate {
    /// Catalog row.
    pub index: usize,
    /// Cosine similarity from the retrieval stage.
    pub retrieval_similarity: f32,
    /// Expected relevance from the scorer, in `[0, 3]`.
    pub expected_relevance: f32,
}

impl std::fmt::Display for RankedCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "#{} (relevance: {:.4}, similarity: {:.4})",
            self.index, self.expected_relevance, self.retrieval_similarity
        )
    }
}
