//! DealMatch library crate (used by the server binary and integration tests).
//!
//! # Pipeline
//!
//! A buyer message goes through three stages:
//! 1. [`CriteriaPolicy`] decides whether the message says enough to search at all.
//! 2. [`Retriever`] embeds it with the query tower and takes the `top_n` most similar
//!    catalog deals by cosine similarity.
//! 3. [`Reranker`] scores each `(message, deal text)` pair with the cross encoder and
//!    keeps the `top_k` with the highest expected relevance.
//!
//! [`ModelBundle`] owns every loaded artifact and exposes the whole flow as
//! [`ModelBundle::handle_query`].
//!
//! # Public API Surface
//!
//! ## Core Types
//! - [`Config`], [`ConfigError`] - Server configuration
//! - [`ModelBundle`], [`BundleHandle`], [`ArtifactSources`] - Loading and serving
//! - [`QueryOutcome`], [`RankedDeal`] - Query results
//!
//! ## Embedding & Scoring
//! - [`DualEncoder`], [`CrossEncoder`], [`Vocabulary`] - Model inference
//! - [`RelevanceScorer`], [`Reranker`] - Pairwise reranking
//!
//! ## Test/Mock Support
//! [`MockScorer`] and the [`fixtures`] module are available behind
//! `#[cfg(any(test, feature = "mock"))]`.

pub mod catalog;
pub mod config;
pub mod constants;
pub mod criteria;
pub mod embedding;
#[cfg(any(test, feature = "mock"))]
pub mod fixtures;
pub mod gateway;
pub mod pipeline;
pub mod retrieval;
pub mod scoring;

pub use catalog::{Catalog, CatalogEntry, CatalogError, CatalogIndex, Deal};
pub use config::{Config, ConfigError};
pub use constants::{
    DEFAULT_TOP_K, DEFAULT_TOP_N, DimValidationError, MAX_LEN_CROSS, MAX_LEN_DUAL,
    validate_embedding_dim,
};
pub use criteria::{CriteriaPolicy, MissingCriterion};
pub use embedding::{CrossEncoder, DualEncoder, EmbeddingError, VocabRole, Vocabulary};
pub use pipeline::{
    ArtifactSources, BundleHandle, BundleInfo, ModelBundle, PipelineError, QueryOutcome,
    RankedDeal,
};
pub use retrieval::{RetrievalHit, Retriever};
#[cfg(any(test, feature = "mock"))]
pub use scoring::MockScorer;
pub use scoring::{RankedCandidate, RelevanceScorer, Reranker, ScoringError};
