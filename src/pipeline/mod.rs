//! Loaded model bundle and the per-request entry point.
//!
//! [`ModelBundle::initialize`] loads every artifact once; [`ModelBundle::handle_query`]
//! runs the criteria gate, retrieval and reranking for one buyer message. A
//! [`BundleHandle`] lets the server replace the bundle atomically on reload.

mod bundle;
mod error;


use std::sync::Arc;

use parking_lot::RwLock;

pub use bundle::{
    ArtifactSources, BundleInfo, CATALOG_FILE, CROSS_VOCAB_FILE, CROSS_WEIGHTS_FILE,
    DEAL_VECTORS_FILE, DUAL_VOCAB_FILE, DUAL_WEIGHTS_FILE, ModelBundle, QueryOutcome, RankedDeal,
    VectorSource,
};
pub use error::PipelineError;

use crate::embedding::CrossEncoder;

/// Shared, swappable reference to the current bundle.
///
/// Requests clone the inner `Arc` and keep scoring against it even if a reload
/// swaps in a new bundle halfway through.
#[derive(Debug)]
pub struct BundleHandle<S = CrossEncoder> {
    current: RwLock<Arc<ModelBundle<S>>>,
}

impl<S> BundleHandle<S> {
    pub fn new(bundle: ModelBundle<S>) -> Self {
        Self {
            current: RwLock::new(Arc::new(bundle)),
        }
    }

    pub fn current(&self) -> Arc<ModelBundle<S>> {
        Arc::clone(&self.current.read())
    }

    /// Installs `bundle` and returns the one it replaced.
    pub fn swap(&self, bundle: ModelBundle<S>) -> Arc<ModelBundle<S>> {
        std::mem::replace(&mut *self.current.write(), Arc::new(bundle))
    }
}
