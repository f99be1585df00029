//! HTTP gateway (Axum) over the model bundle.
//!
//! This module is primarily used by the `dealmatch` server binary.

pub mod error;
pub mod handler;
pub mod payload;
pub mod state;

#[cfg(test)]
mod handler_tests;

use axum::{
    Json, Router,
    extract::State,
    http::HeaderValue,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

pub use error::GatewayError;
pub use handler::chat_handler;
pub use state::GatewayState;

use crate::config::Config;
use crate::pipeline::{CROSS_WEIGHTS_FILE, DEAL_VECTORS_FILE, DUAL_WEIGHTS_FILE, VectorSource};
use crate::scoring::RelevanceScorer;
use payload::{CheckpointNames, Fingerprints, VersionResponse};

pub const API_VERSION: &str = "1.0";

pub fn create_router_with_state<S>(state: GatewayState<S>, cors: CorsLayer) -> Router
where
    S: RelevanceScorer + 'static,
{
    Router::new()
        .route("/health", get(health_handler))
        .route("/version", get(version_handler::<S>))
        .route("/chat", post(chat_handler::<S>))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Any method and header; origins from the configuration. Unparseable origins are skipped.
pub fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if config.allows_any_origin() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    Json(HealthResponse { status: "ok" }).into_response()
}

#[tracing::instrument(skip(state))]
pub async fn version_handler<S>(State(state): State<GatewayState<S>>) -> Response
where
    S: RelevanceScorer + 'static,
{
    let bundle = state.bundle.current();
    let info = bundle.info();

    Json(VersionResponse {
        api_version: API_VERSION,
        dual_vocab_size: bundle.retriever().vocab().len(),
        cross_vocab_size: bundle.reranker().vocab().len(),
        num_deals: bundle.catalog().len(),
        checkpoints: CheckpointNames {
            dual_encoder: DUAL_WEIGHTS_FILE,
            cross_encoder: CROSS_WEIGHTS_FILE,
            deal_vectors: DEAL_VECTORS_FILE,
        },
        fingerprints: Fingerprints {
            dual_encoder: info.dual_fingerprint.clone(),
            cross_encoder: info.cross_fingerprint.clone(),
        },
        vector_source: match info.vector_source {
            VectorSource::Precomputed => "precomputed",
            VectorSource::DealTower => "deal_tower",
        },
        loaded_at: info.loaded_at.to_rfc3339(),
    })
    .into_response()
}
