use thiserror::Error;

use crate::catalog::CatalogError;
use crate::constants::DimValidationError;
use crate::embedding::EmbeddingError;
use crate::scoring::ScoringError;

/// Load-time failures are fatal; there is no partially loaded bundle.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("catalog: {0}")]
    Catalog(#[from] CatalogError),

    #[error("model: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("scoring: {0}")]
    Scoring(#[from] ScoringError),

    #[error("catalog index has {vectors} vectors for {deals} deals")]
    CatalogSizeMismatch { vectors: usize, deals: usize },

    #[error("{what}: {source}")]
    Dimension {
        what: &'static str,
        #[source]
        source: DimValidationError,
    },
}
