//! `/chat` and `/version` wire types.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_TOP_K, DEFAULT_TOP_N};
use crate::pipeline::{QueryOutcome, RankedDeal};

use super::error::GatewayError;

pub const MESSAGE_CHARS: RangeInclusive<usize> = 1..=2000;
pub const TOP_K_RANGE: RangeInclusive<usize> = 1..=20;
pub const TOP_N_RANGE: RangeInclusive<usize> = 10..=500;

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

impl ChatRequest {
    /// Range checks; the message length is counted in characters.
    pub fn validate(&self) -> Result<(), GatewayError> {
        let chars = self.message.chars().count();
        if !MESSAGE_CHARS.contains(&chars) {
            return Err(GatewayError::InvalidRequest(format!(
                "message must be {}-{} characters, got {chars}",
                MESSAGE_CHARS.start(),
                MESSAGE_CHARS.end()
            )));
        }
        check_range("top_k", self.top_k, &TOP_K_RANGE)?;
        check_range("top_n", self.top_n, &TOP_N_RANGE)?;
        Ok(())
    }
}

fn check_range(
    field: &str,
    value: usize,
    range: &RangeInclusive<usize>,
) -> Result<(), GatewayError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(GatewayError::InvalidRequest(format!(
            "{field} must be between {} and {}, got {value}",
            range.start(),
            range.end()
        )))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealPayload {
    pub property_id: i64,
    pub deal_type: String,
    pub city: String,
    pub state: String,
    pub beds: f64,
    pub baths: f64,
    pub sqft: f64,
    pub purchase_price: f64,
    pub arv: f64,
    pub entry_fee: f64,
    pub estimated_monthly_payment: f64,
    pub rerank_score: f32,
    pub retrieval_sim: f32,
}

impl From<RankedDeal> for DealPayload {
    fn from(ranked: RankedDeal) -> Self {
        let deal = ranked.deal;
        Self {
            property_id: deal.property_id,
            deal_type: deal.deal_type,
            city: deal.city,
            state: deal.state,
            beds: deal.beds,
            baths: deal.baths,
            sqft: deal.sqft,
            purchase_price: deal.purchase_price,
            arv: deal.arv,
            entry_fee: deal.entry_fee,
            estimated_monthly_payment: deal.estimated_monthly_payment,
            rerank_score: ranked.rerank_score,
            retrieval_sim: ranked.retrieval_sim,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    pub deals: Vec<DealPayload>,
    pub needs_clarification: bool,
    pub missing_fields: Option<Vec<String>>,
}

impl From<QueryOutcome> for ChatResponse {
    fn from(outcome: QueryOutcome) -> Self {
        let reply = outcome.reply();
        match outcome {
            QueryOutcome::Clarification { missing } => Self {
                reply,
                deals: Vec::new(),
                needs_clarification: true,
                missing_fields: Some(missing.iter().map(|m| m.label().to_string()).collect()),
            },
            QueryOutcome::Ranked { deals } => Self {
                reply,
                deals: deals.into_iter().map(DealPayload::from).collect(),
                needs_clarification: false,
                missing_fields: None,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CheckpointNames {
    pub dual_encoder: &'static str,
    pub cross_encoder: &'static str,
    pub deal_vectors: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Fingerprints {
    pub dual_encoder: Option<String>,
    pub cross_encoder: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub api_version: &'static str,
    pub dual_vocab_size: usize,
    pub cross_vocab_size: usize,
    pub num_deals: usize,
    pub checkpoints: CheckpointNames,
    pub fingerprints: Fingerprints,
    pub vector_source: &'static str,
    pub loaded_at: String,
}
