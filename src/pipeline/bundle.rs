use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, CatalogIndex, Deal};
use crate::constants::validate_embedding_dim;
use crate::criteria::{CriteriaPolicy, MissingCriterion};
use crate::embedding::{CrossEncoder, DualEncoder, VocabRole, Vocabulary, select_device};
use crate::retrieval::{RetrievalHit, Retriever};
use crate::scoring::{RankedCandidate, RelevanceScorer, Reranker};

use super::error::PipelineError;

pub const CATALOG_FILE: &str = "properties.csv";
pub const DUAL_VOCAB_FILE: &str = "dual_vocab_v1.json";
pub const CROSS_VOCAB_FILE: &str = "cross_vocab_v1.json";
pub const DEAL_VECTORS_FILE: &str = "deal_vecs_v1.npy";
pub const DUAL_WEIGHTS_FILE: &str = "dual_encoder_v1.safetensors";
pub const CROSS_WEIGHTS_FILE: &str = "cross_encoder_best.safetensors";

/// Locations of every artifact the bundle is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSources {
    pub catalog: PathBuf,
    pub dual_vocab: PathBuf,
    /// Optional on disk: derived from `dual_vocab` when absent.
    pub cross_vocab: PathBuf,
    /// Optional on disk: computed with the deal tower when absent.
    pub deal_vectors: PathBuf,
    pub dual_weights: PathBuf,
    pub cross_weights: PathBuf,
}

impl ArtifactSources {
    /// Standard file names inside a data directory and a checkpoint directory.
    pub fn from_dirs(data_dir: &Path, checkpoint_dir: &Path) -> Self {
        Self {
            catalog: data_dir.join(CATALOG_FILE),
            dual_vocab: checkpoint_dir.join(DUAL_VOCAB_FILE),
            cross_vocab: checkpoint_dir.join(CROSS_VOCAB_FILE),
            deal_vectors: checkpoint_dir.join(DEAL_VECTORS_FILE),
            dual_weights: checkpoint_dir.join(DUAL_WEIGHTS_FILE),
            cross_weights: checkpoint_dir.join(CROSS_WEIGHTS_FILE),
        }
    }
}

/// Where the catalog vectors came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorSource {
    Precomputed,
    DealTower,
}

/// Load metadata reported by the serving layer.
#[derive(Debug, Clone)]
pub struct BundleInfo {
    pub loaded_at: DateTime<Utc>,
    pub dual_fingerprint: Option<String>,
    pub cross_fingerprint: Option<String>,
    pub vector_source: VectorSource,
}

/// A catalog deal selected by the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedDeal {
    pub deal: Deal,
    pub retrieval_sim: f32,
    pub rerank_score: f32,
}

/// Result of [`ModelBundle::handle_query`].
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// Too few search criteria; retrieval was skipped.
    Clarification { missing: Vec<MissingCriterion> },
    /// Best deals, highest expected relevance first.
    Ranked { deals: Vec<RankedDeal> },
}

impl QueryOutcome {
    pub fn needs_clarification(&self) -> bool {
        matches!(self, QueryOutcome::Clarification { .. })
    }

    /// The chat reply shown alongside the outcome.
    pub fn reply(&self) -> String {
        match self {
            QueryOutcome::Clarification { missing } => {
                let labels: Vec<&str> = missing.iter().map(MissingCriterion::label).collect();
                format!(
                    "To find the best deals, I need a bit more detail. Can you share: {}? \
                     Example: “3 bed in AZ under 350k, entry under 20k, payment under 2500”.",
                    labels.join(", ")
                )
            }
            QueryOutcome::Ranked { .. } => {
                "Here are the top deals I found based on your message.".to_string()
            }
        }
    }
}

/// Every loaded artifact, immutable after construction and shared read-only by requests.
///
/// Reloading means building a new bundle and swapping it in through
/// [`BundleHandle`](super::BundleHandle).
#[derive(Debug)]
pub struct ModelBundle<S = CrossEncoder> {
    catalog: Catalog,
    retriever: Retriever,
    reranker: Reranker<S>,
    criteria: CriteriaPolicy,
    info: BundleInfo,
}

impl ModelBundle<CrossEncoder> {
    /// Loads and validates every artifact. Any failure aborts the load.
    pub fn initialize(sources: &ArtifactSources) -> Result<Self, PipelineError> {
        let started = Instant::now();
        let device = select_device()?;

        let catalog = Catalog::load(&sources.catalog)?;

        let dual_vocab = Vocabulary::from_file(VocabRole::Retrieval, &sources.dual_vocab)?;
        let cross_vocab = if sources.cross_vocab.exists() {
            Vocabulary::from_file(VocabRole::Rerank, &sources.cross_vocab)?
        } else {
            warn!(
                path = %sources.cross_vocab.display(),
                "Rerank vocabulary not found, deriving it from the retrieval vocabulary"
            );
            dual_vocab.with_separator()?
        };

        let dual = DualEncoder::load(&sources.dual_weights, &dual_vocab, &device)?;
        let cross = CrossEncoder::load(&sources.cross_weights, &cross_vocab, &device)?;

        let (index, vector_source) = if sources.deal_vectors.exists() {
            let index =
                CatalogIndex::load_npy(&sources.deal_vectors, &device, catalog.len(), dual.dim())?;
            (index, VectorSource::Precomputed)
        } else {
            warn!(
                path = %sources.deal_vectors.display(),
                "Catalog vectors not found, embedding deal texts with the deal tower"
            );
            let index = CatalogIndex::build(&catalog, &dual, &dual_vocab)?;
            (index, VectorSource::DealTower)
        };

        let info = BundleInfo {
            loaded_at: Utc::now(),
            dual_fingerprint: dual.fingerprint().map(str::to_owned),
            cross_fingerprint: cross.fingerprint().map(str::to_owned),
            vector_source,
        };

        let bundle = Self::from_parts(
            catalog,
            Retriever::new(dual, dual_vocab, index),
            Reranker::new(cross, cross_vocab)?,
        )?
        .with_info(info);

        info!(
            deals = bundle.catalog.len(),
            dual_vocab_size = bundle.retriever.vocab().len(),
            cross_vocab_size = bundle.reranker.vocab().len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Models loaded successfully"
        );

        Ok(bundle)
    }
}

impl<S: RelevanceScorer> ModelBundle<S> {
    /// Assembles a bundle from already-loaded parts.
    ///
    /// The index needs one row per deal, as wide as the dual encoder's output.
    pub fn from_parts(
        catalog: Catalog,
        retriever: Retriever,
        reranker: Reranker<S>,
    ) -> Result<Self, PipelineError> {
        if retriever.catalog_size() != catalog.len() {
            return Err(PipelineError::CatalogSizeMismatch {
                vectors: retriever.catalog_size(),
                deals: catalog.len(),
            });
        }
        validate_embedding_dim(retriever.index().dim(), retriever.encoder().dim()).map_err(
            |source| PipelineError::Dimension {
                what: "catalog vectors vs dual encoder",
                source,
            },
        )?;

        Ok(Self {
            catalog,
            retriever,
            reranker,
            criteria: CriteriaPolicy::default(),
            info: BundleInfo {
                loaded_at: Utc::now(),
                dual_fingerprint: None,
                cross_fingerprint: None,
                vector_source: VectorSource::Precomputed,
            },
        })
    }

    pub fn with_criteria(mut self, criteria: CriteriaPolicy) -> Self {
        self.criteria = criteria;
        self
    }

    fn with_info(mut self, info: BundleInfo) -> Self {
        self.info = info;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    pub fn reranker(&self) -> &Reranker<S> {
        &self.reranker
    }

    pub fn criteria(&self) -> &CriteriaPolicy {
        &self.criteria
    }

    pub fn info(&self) -> &BundleInfo {
        &self.info
    }

    pub fn retrieve(&self, query: &str, top_n: usize) -> Result<Vec<RetrievalHit>, PipelineError> {
        Ok(self.retriever.retrieve(query, top_n)?)
    }

    pub fn rerank(
        &self,
        query: &str,
        top_n: usize,
        top_k: usize,
    ) -> Result<Vec<RankedCandidate>, PipelineError> {
        Ok(self
            .reranker
            .rerank(&self.retriever, &self.catalog, query, top_n, top_k)?)
    }

    /// Criteria gate, then retrieval, then reranking.
    pub fn handle_query(
        &self,
        query: &str,
        top_n: usize,
        top_k: usize,
    ) -> Result<QueryOutcome, PipelineError> {
        if let Some(missing) = self.criteria.clarification_needed(query) {
            debug!(missing = missing.len(), "Query under-specified, asking for clarification");
            return Ok(QueryOutcome::Clarification { missing });
        }

        let deals = self
            .rerank(query, top_n, top_k)?
            .into_iter()
            .filter_map(|candidate| {
                self.catalog.get(candidate.index).map(|entry| RankedDeal {
                    deal: entry.deal().clone(),
                    retrieval_sim: candidate.retrieval_similarity,
                    rerank_score: candidate.expected_relevance,
                })
            })
            .collect();

        Ok(QueryOutcome::Ranked { deals })
    }
}
