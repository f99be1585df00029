use std::sync::Arc;

use crate::embedding::CrossEncoder;
use crate::pipeline::BundleHandle;

/// Router state: the swappable model bundle.
pub struct GatewayState<S = CrossEncoder> {
    pub bundle: Arc<BundleHandle<S>>,
}

impl<S> GatewayState<S> {
    pub fn new(bundle: Arc<BundleHandle<S>>) -> Self {
        Self { bundle }
    }
}

impl<S> Clone for GatewayState<S> {
    fn clone(&self) -> Self {
        Self {
            bundle: Arc::clone(&self.bundle),
        }
    }
}
