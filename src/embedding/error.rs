use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("model artifact not found at path: {path}")]
    ModelNotFound { path: PathBuf },

    #[error("failed to load model weights: {reason}")]
    ModelLoadFailed { reason: String },

    #[error("embedding inference failed: {reason}")]
    InferenceFailed { reason: String },

    #[error("missing tensor '{name}' in weight file")]
    MissingTensor { name: String },

    #[error("tensor '{name}' has shape {actual:?}, expected {expected:?}")]
    ShapeMismatch {
        name: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("{vocab} vocabulary is missing reserved token {token}")]
    MissingReservedToken {
        vocab: &'static str,
        token: &'static str,
    },

    #[error("invalid {vocab} vocabulary: {reason}")]
    InvalidVocabulary { vocab: &'static str, reason: String },
}

impl From<candle_core::Error> for EmbeddingError {
    fn from(err: candle_core::Error) -> Self {
        EmbeddingError::InferenceFailed {
            reason: err.to_string(),
        }
    }
}

impl From<std::io::Error> for EmbeddingError {
    fn from(err: std::io::Error) -> Self {
        EmbeddingError::ModelLoadFailed {
            reason: err.to_string(),
        }
    }
}
