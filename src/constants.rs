//! Cross-cutting, shared constants.
//!
//! The preprocessing values here are part of the numeric contract with the trained
//! artifacts. Changing any of them invalidates the shipped vocabularies and weights.
//!
//! # Dimension Invariants
//!
//! Embedding widths are not fixed at compile time; they are read from the weight files.
//! Use [`validate_embedding_dim`] at module boundaries to catch mismatches between the
//! catalog vectors, the dual encoder and the scoring head during load.

/// Token budget for the retrieval (dual encoder) sequence.
pub const MAX_LEN_DUAL: usize = 48;

/// Token budget for the paired (cross encoder) sequence.
pub const MAX_LEN_CROSS: usize = 96;

/// Share of the paired budget given to the query segment (floored).
pub const QUERY_SEGMENT_RATIO: f64 = 0.45;

/// Default retrieval candidate count.
pub const DEFAULT_TOP_N: usize = 50;

/// Default number of reranked deals returned.
pub const DEFAULT_TOP_K: usize = 5;

/// Number of ordinal relevance classes produced by the scoring head.
pub const RELEVANCE_CLASSES: usize = 4;

/// Highest relevance class value (`RELEVANCE_CLASSES - 1`).
pub const MAX_RELEVANCE: f32 = (RELEVANCE_CLASSES - 1) as f32;

/// Added to L2 norms before dividing.
pub const NORM_EPSILON: f64 = 1e-9;

/// Padding filler token.
pub const PAD_TOKEN: &str = "<PAD>";

/// Out-of-vocabulary fallback token.
pub const UNK_TOKEN: &str = "<UNK>";

/// Query/item boundary token (rerank vocabulary only).
pub const SEP_TOKEN: &str = "<SEP>";

/// Error returned when dimension validation fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DimValidationError {
    /// Embedding dimension cannot be zero.
    ZeroDimension,
    /// Runtime dimension does not match expected dimension.
    DimensionMismatch { expected: usize, actual: usize },
}

impl std::fmt::Display for DimValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroDimension => write!(f, "embedding dimension cannot be zero"),
            Self::DimensionMismatch { expected, actual } => {
                write!(
                    f,
                    "dimension mismatch: expected {}, got {}",
                    expected, actual
                )
            }
        }
    }
}

impl std::error::Error for DimValidationError {}

/// Validates that a runtime embedding dimension matches the expected dimension.
///
/// # Example
///
/// ```
/// use dealmatch::constants::validate_embedding_dim;
///
/// validate_embedding_dim(128, 128).unwrap();
/// assert!(validate_embedding_dim(64, 128).is_err());
/// assert!(validate_embedding_dim(0, 0).is_err());
/// ```
pub fn validate_embedding_dim(actual: usize, expected: usize) -> Result<(), DimValidationError> {
    if expected == 0 || actual == 0 {
        return Err(DimValidationError::ZeroDimension);
    }
    if actual != expected {
        return Err(DimValidationError::DimensionMismatch { expected, actual });
    }
    Ok(())
}
