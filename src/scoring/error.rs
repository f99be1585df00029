use thiserror::Error;

use crate::catalog::CatalogError;
use crate::embedding::EmbeddingError;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("scorer inference failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("retrieval failed: {0}")]
    Retrieval(#[from] CatalogError),

    #[error("scorer returned {actual} distributions for {expected} pairs")]
    BatchSizeMismatch { expected: usize, actual: usize },

    #[error("candidate {index} is not in the catalog")]
    UnknownCandidate { index: usize },

    #[error("reranker needs the rerank vocabulary, got the {role} vocabulary")]
    WrongVocabulary { role: &'static str },
}
