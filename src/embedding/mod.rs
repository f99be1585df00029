//! Text -> ids -> pooled vectors.
//!
//! - [`tokenizer`], [`vocab`] and [`sequence`] turn text into fixed-length id sequences.
//! - [`pooling`] is the shared embedding + masked-mean primitive.
//! - [`dual`] (retrieval) and [`cross`] (rerank) are parameterized instances of it.

/// Cross encoder (pairwise relevance head).
pub mod cross;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
/// Dual (query / deal) retrieval encoder.
pub mod dual;
mod error;
/// Embedding lookup + masked mean pooling.
pub mod pooling;
/// Fixed-length single and paired encoders.
pub mod sequence;
/// Lowercase alphanumeric word tokenizer.
pub mod tokenizer;
/// Token <-> id vocabularies.
pub mod vocab;
/// Safetensors weight access.
pub mod weights;

pub use cross::CrossEncoder;
pub use device::select_device;
pub use dual::DualEncoder;
pub use error::EmbeddingError;
pub use pooling::{MeanPoolEncoder, l2_normalize_rows};
pub use sequence::{IdSequence, PairEncoder, SequenceEncoder};
pub use tokenizer::tokenize;
pub use vocab::{VocabRole, Vocabulary};
pub use weights::WeightMap;
