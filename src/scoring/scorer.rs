use crate::constants::RELEVANCE_CLASSES;
use crate::embedding::{CrossEncoder, IdSequence};

use super::error::ScoringError;

/// Maps paired `[query][SEP][item]` sequences to relevance-class distributions.
///
/// Implementations must return exactly one distribution per input, in input order.
pub trait RelevanceScorer: Send + Sync {
    fn class_probabilities(
        &self,
        batch: &[IdSequence],
    ) -> Result<Vec<[f32; RELEVANCE_CLASSES]>, ScoringError>;
}

impl RelevanceScorer for CrossEncoder {
    fn class_probabilities(
        &self,
        batch: &[IdSequence],
    ) -> Result<Vec<[f32; RELEVANCE_CLASSES]>, ScoringError> {
        Ok(self.probabilities(batch)?)
    }
}

impl<S: RelevanceScorer + ?Sized> RelevanceScorer for std::sync::Arc<S> {
    fn class_probabilities(
        &self,
        batch: &[IdSequence],
    ) -> Result<Vec<[f32; RELEVANCE_CLASSES]>, ScoringError> {
        (**self).class_probabilities(batch)
    }
}
