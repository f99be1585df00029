//! Deterministic scorer for tests (feature `mock`).

use std::sync::Arc;

use parking_lot::Mutex;

use crate::constants::RELEVANCE_CLASSES;
use crate::embedding::IdSequence;

use super::error::ScoringError;
use super::scorer::RelevanceScorer;

type ScoreFn = dyn Fn(&[u32]) -> [f32; RELEVANCE_CLASSES] + Send + Sync;

/// Scores each pair with a caller-supplied function of its ids and records every batch.
#[derive(Clone)]
pub struct MockScorer {
    score_fn: Arc<ScoreFn>,
    batches: Arc<Mutex<Vec<Vec<IdSequence>>>>,
}

impl std::fmt::Debug for MockScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockScorer")
            .field("calls", &self.batches.lock().len())
            .finish()
    }
}

impl MockScorer {
    pub fn from_fn<F>(score_fn: F) -> Self
    where
        F: Fn(&[u32]) -> [f32; RELEVANCE_CLASSES] + Send + Sync + 'static,
    {
        Self {
            score_fn: Arc::new(score_fn),
            batches: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every pair gets the same distribution.
    pub fn constant(probs: [f32; RELEVANCE_CLASSES]) -> Self {
        Self::from_fn(move |_| probs)
    }

    /// All probability mass on class 3 when `token_id` appears in the pair, class 0 otherwise.
    pub fn keyed_on(token_id: u32) -> Self {
        Self::from_fn(move |ids| {
            if ids.contains(&token_id) {
                [0.0, 0.0, 0.0, 1.0]
            } else {
                [1.0, 0.0, 0.0, 0.0]
            }
        })
    }

    /// Batches seen so far, oldest first.
    pub fn batches(&self) -> Vec<Vec<IdSequence>> {
        self.batches.lock().clone()
    }
}

impl RelevanceScorer for MockScorer {
    fn class_probabilities(
        &self,
        batch: &[IdSequence],
    ) -> Result<Vec<[f32; RELEVANCE_CLASSES]>, ScoringError> {
        self.batches.lock().push(batch.to_vec());
        Ok(batch.iter().map(|s| (self.score_fn)(s.as_slice())).collect())
    }
}
