use std::path::PathBuf;
use thiserror::Error;

use crate::embedding::EmbeddingError;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed catalog row: {0}")]
    Csv(#[from] csv::Error),

    #[error("catalog contains no deals")]
    Empty,

    #[error(
        "catalog vectors have shape ({rows}, {dim}), expected ({expected_rows}, {expected_dim})"
    )]
    VectorShapeMismatch {
        rows: usize,
        dim: usize,
        expected_rows: usize,
        expected_dim: usize,
    },

    #[error("catalog vector {row} contains NaN or infinite values")]
    NonFiniteVector { row: usize },

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
}

impl From<candle_core::Error> for CatalogError {
    fn from(err: candle_core::Error) -> Self {
        CatalogError::Embedding(EmbeddingError::from(err))
    }
}
