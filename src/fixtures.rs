//! Small deterministic artifacts for tests (feature `mock`).
//!
//! Three deals, one per state. Both towers map `az`/`phoenix`, `tx`/`dallas` and
//! `fl`/`tampa` onto the three unit axes, so retrieval for a state name is exact.

use std::collections::HashMap;
use std::path::Path;

use candle_core::{Device, Tensor};

use crate::catalog::{Catalog, CatalogIndex};
use crate::embedding::cross::{CROSS_TABLE, HIDDEN_BIAS, HIDDEN_WEIGHT, OUTPUT_BIAS, OUTPUT_WEIGHT};
use crate::embedding::dual::{DEAL_TABLE, QUERY_TABLE};
use crate::embedding::{CrossEncoder, DualEncoder, VocabRole, Vocabulary, WeightMap};
use crate::pipeline::ArtifactSources;
use crate::retrieval::Retriever;

pub const SAMPLE_CSV: &str = "\
property_id,deal_type,property_type,city,state,beds,baths,sqft,purchase_price,arv,entry_fee,estimated_monthly_payment,condition,occupancy
1,Subject-To,SFR,Phoenix,AZ,3,2.0,1500,250000,320000,15000,1850.5,Turnkey,Vacant
2,Seller Finance,Duplex,Dallas,TX,4,3.0,2100,310000,400000,25000,2400.0,Light Rehab,Tenant
3,Wholesale,SFR,Tampa,FL,2,1.0,900,120000,180000,5000,950.0,Full Rehab,Vacant
";

pub const PHOENIX: usize = 0;
pub const DALLAS: usize = 1;
pub const TAMPA: usize = 2;

pub const DIM: usize = 3;

const RETRIEVAL_TOKENS: [&str; 10] = [
    "<PAD>", "<UNK>", "az", "tx", "fl", "phoenix", "dallas", "tampa", "bed", "under",
];

const RERANK_TOKENS: [&str; 11] = [
    "<PAD>", "<UNK>", "<SEP>", "az", "tx", "fl", "phoenix", "dallas", "tampa", "bed", "under",
];

fn token_map(tokens: &[&str]) -> HashMap<String, u32> {
    tokens
        .iter()
        .enumerate()
        .map(|(id, token)| (token.to_string(), id as u32))
        .collect()
}

/// Unit axis for state and city tokens, zero otherwise.
fn axis(token: &str) -> [f32; DIM] {
    match token {
        "az" | "phoenix" => [1.0, 0.0, 0.0],
        "tx" | "dallas" => [0.0, 1.0, 0.0],
        "fl" | "tampa" => [0.0, 0.0, 1.0],
        _ => [0.0; DIM],
    }
}

fn table(tokens: &[&str]) -> Tensor {
    let data: Vec<f32> = tokens.iter().flat_map(|t| axis(t)).collect();
    Tensor::from_vec(data, (tokens.len(), DIM), &Device::Cpu).expect("fixture table")
}

pub fn sample_catalog() -> Catalog {
    Catalog::from_reader(SAMPLE_CSV.as_bytes()).expect("fixture catalog")
}

pub fn retrieval_vocab() -> Vocabulary {
    Vocabulary::new(VocabRole::Retrieval, token_map(&RETRIEVAL_TOKENS)).expect("fixture vocab")
}

pub fn rerank_vocab() -> Vocabulary {
    Vocabulary::new(VocabRole::Rerank, token_map(&RERANK_TOKENS)).expect("fixture vocab")
}

/// Rerank id of `token`.
pub fn rerank_id(token: &str) -> u32 {
    rerank_vocab().lookup(token)
}

pub fn dual_tensors() -> HashMap<String, Tensor> {
    let mut tensors = HashMap::new();
    tensors.insert(QUERY_TABLE.to_string(), table(&RETRIEVAL_TOKENS));
    tensors.insert(DEAL_TABLE.to_string(), table(&RETRIEVAL_TOKENS));
    tensors
}

/// Identity hidden layer; only the class-3 logit responds to the pooled features.
pub fn cross_tensors() -> HashMap<String, Tensor> {
    let device = Device::Cpu;
    let t = |data: Vec<f32>, shape: &[usize]| {
        Tensor::from_vec(data, shape, &device).expect("fixture tensor")
    };

    let mut output = vec![0.0f32; 4 * DIM];
    output[3 * DIM..].fill(4.0);

    let mut tensors = HashMap::new();
    tensors.insert(CROSS_TABLE.to_string(), table(&RERANK_TOKENS));
    tensors.insert(
        HIDDEN_WEIGHT.to_string(),
        t(vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0], &[DIM, DIM]),
    );
    tensors.insert(HIDDEN_BIAS.to_string(), t(vec![0.0; DIM], &[DIM]));
    tensors.insert(OUTPUT_WEIGHT.to_string(), t(output, &[4, DIM]));
    tensors.insert(OUTPUT_BIAS.to_string(), t(vec![0.0; 4], &[4]));
    tensors
}

pub fn dual_encoder() -> DualEncoder {
    DualEncoder::from_weights(&WeightMap::from_tensors(dual_tensors()), &retrieval_vocab())
        .expect("fixture dual encoder")
}

pub fn cross_encoder() -> CrossEncoder {
    CrossEncoder::from_weights(&WeightMap::from_tensors(cross_tensors()), &rerank_vocab())
        .expect("fixture cross encoder")
}

/// One row per sample deal, on its state's axis.
pub fn deal_vectors() -> Tensor {
    let data: Vec<f32> = (0..DIM * DIM)
        .map(|i| if i / DIM == i % DIM { 1.0 } else { 0.0 })
        .collect();
    Tensor::from_vec(data, (DIM, DIM), &Device::Cpu).expect("fixture vectors")
}

pub fn sample_retriever() -> Retriever {
    let catalog = sample_catalog();
    let index = CatalogIndex::from_matrix(deal_vectors(), catalog.len(), DIM)
        .expect("fixture index");
    Retriever::new(dual_encoder(), retrieval_vocab(), index)
}

/// Writes the full artifact set under `dir` and returns where each file went.
pub fn write_artifacts(dir: &Path) -> anyhow::Result<ArtifactSources> {
    let data_dir = dir.join("data");
    let checkpoint_dir = dir.join("checkpoints");
    std::fs::create_dir_all(&data_dir)?;
    std::fs::create_dir_all(&checkpoint_dir)?;

    let sources = ArtifactSources::from_dirs(&data_dir, &checkpoint_dir);
    std::fs::write(&sources.catalog, SAMPLE_CSV)?;
    std::fs::write(
        &sources.dual_vocab,
        serde_json::to_string(&token_map(&RETRIEVAL_TOKENS))?,
    )?;
    std::fs::write(
        &sources.cross_vocab,
        serde_json::to_string(&token_map(&RERANK_TOKENS))?,
    )?;
    candle_core::safetensors::save(&dual_tensors(), &sources.dual_weights)?;
    candle_core::safetensors::save(&cross_tensors(), &sources.cross_weights)?;
    deal_vectors().write_npy(&sources.deal_vectors)?;

    Ok(sources)
}
