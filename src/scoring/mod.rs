//! Second-stage precision reranking.
//!
//! A [`RelevanceScorer`] turns each `(query, deal text)` pair into a distribution over
//! the four ordinal relevance classes; the [`Reranker`] reduces that to an expected
//! relevance and keeps the best `top_k` retrieval candidates.
//!
//! The reranker never adds candidates: its output is always a reordered subset of what
//! the [`Retriever`](crate::retrieval::Retriever) returned for the same `top_n`.

pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod reranker;
pub mod scorer;
pub mod types;


pub use error::ScoringError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockScorer;
pub use reranker::Reranker;
pub use scorer::RelevanceScorer;
pub use types::{RankedCandidate, expected_relevance};
