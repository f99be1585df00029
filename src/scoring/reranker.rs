use tracing::debug;

use crate::catalog::Catalog;
use crate::embedding::{IdSequence, PairEncoder, VocabRole, Vocabulary};
use crate::retrieval::{Retriever, descending_score};

use super::error::ScoringError;
use super::scorer::RelevanceScorer;
use super::types::{RankedCandidate, expected_relevance};

/// Second stage: pairwise scoring of retrieval candidates.
pub struct Reranker<S> {
    scorer: S,
    vocab: Vocabulary,
    pairs: PairEncoder,
}

impl<S> std::fmt::Debug for Reranker<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reranker")
            .field("vocab_size", &self.vocab.len())
            .field("max_len", &self.pairs.max_len())
            .finish()
    }
}

impl<S: RelevanceScorer> Reranker<S> {
    /// `vocab` must be the rerank vocabulary the scorer was trained with; pairs need its `<SEP>`.
    pub fn new(scorer: S, vocab: Vocabulary) -> Result<Self, ScoringError> {
        if vocab.role() != VocabRole::Rerank {
            return Err(ScoringError::WrongVocabulary {
                role: vocab.role().name(),
            });
        }
        Ok(Self {
            scorer,
            vocab,
            pairs: PairEncoder::default(),
        })
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn scorer(&self) -> &S {
        &self.scorer
    }

    /// Retrieves `top_n` candidates and keeps the `top_k` with the highest expected relevance.
    ///
    /// Output is a reordered subset of the retrieval candidates; equal scores keep
    /// retrieval order.
    pub fn rerank(
        &self,
        retriever: &Retriever,
        catalog: &Catalog,
        query: &str,
        top_n: usize,
        top_k: usize,
    ) -> Result<Vec<RankedCandidate>, ScoringError> {
        let hits = retriever.retrieve(query, top_n)?;
        if hits.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let batch = hits
            .iter()
            .map(|hit| {
                let entry = catalog
                    .get(hit.index)
                    .ok_or(ScoringError::UnknownCandidate { index: hit.index })?;
                Ok(self.pairs.encode(query, entry.text(), &self.vocab))
            })
            .collect::<Result<Vec<IdSequence>, ScoringError>>()?;

        let probs = self.scorer.class_probabilities(&batch)?;
        if probs.len() != hits.len() {
            return Err(ScoringError::BatchSizeMismatch {
                expected: hits.len(),
                actual: probs.len(),
            });
        }

        let mut ranked: Vec<RankedCandidate> = hits
            .iter()
            .zip(probs.iter())
            .map(|(hit, p)| RankedCandidate {
                index: hit.index,
                retrieval_similarity: hit.similarity,
                expected_relevance: expected_relevance(p),
            })
            .collect();

        ranked.sort_by(|a, b| descending_score(a.expected_relevance, b.expected_relevance));
        ranked.truncate(top_k);

        debug!(
            candidates = hits.len(),
            top_k,
            top_score = ranked.first().map(|c| c.expected_relevance),
            "Reranking complete"
        );

        Ok(ranked)
    }
}
