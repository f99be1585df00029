use std::time::Instant;

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use tracing::{info, instrument};

use crate::gateway::error::GatewayError;
use crate::gateway::payload::{ChatRequest, ChatResponse};
use crate::gateway::state::GatewayState;
use crate::scoring::RelevanceScorer;

/// `POST /chat`: criteria gate, retrieval and reranking for one buyer message.
///
/// Scoring is CPU-bound and runs on the blocking pool against the bundle that was
/// current when the request arrived.
#[instrument(skip(state, body))]
pub async fn chat_handler<S>(
    State(state): State<GatewayState<S>>,
    Json(body): Json<serde_json::Value>,
) -> Result<Response, GatewayError>
where
    S: RelevanceScorer + 'static,
{
    let started = Instant::now();

    let request: ChatRequest = serde_json::from_value(body)
        .map_err(|e| GatewayError::InvalidRequest(format!("Invalid request schema: {}", e)))?;
    request.validate()?;

    let bundle = state.bundle.current();
    let ChatRequest {
        message,
        top_k,
        top_n,
    } = request;

    let outcome = tokio::task::spawn_blocking(move || bundle.handle_query(&message, top_n, top_k))
        .await
        .map_err(|e| GatewayError::InternalError(format!("scoring task failed: {}", e)))??;

    let response = ChatResponse::from(outcome);

    info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        clarify = response.needs_clarification,
        top_n,
        top_k,
        returned = response.deals.len(),
        "Chat request served"
    );

    Ok(Json(response).into_response())
}
