//! In-memory catalog vector matrix.

use std::path::Path;

use candle_core::{DType, Device, Tensor};
use tracing::{debug, info};

use crate::constants::MAX_LEN_DUAL;
use crate::embedding::{DualEncoder, IdSequence, SequenceEncoder, Vocabulary, l2_normalize_rows};

use super::Catalog;
use super::error::CatalogError;

const BUILD_CHUNK: usize = 256;

/// L2-normalized `(num_deals, dim)` matrix, row `i` belonging to catalog entry `i`.
#[derive(Debug, Clone)]
pub struct CatalogIndex {
    vectors: Tensor,
}

impl CatalogIndex {
    /// Normalizes `matrix` row-wise and checks it against the catalog size and model width.
    pub fn from_matrix(
        matrix: Tensor,
        expected_rows: usize,
        expected_dim: usize,
    ) -> Result<Self, CatalogError> {
        let (rows, dim) = matrix.dims2()?;
        if rows != expected_rows || dim != expected_dim {
            return Err(CatalogError::VectorShapeMismatch {
                rows,
                dim,
                expected_rows,
                expected_dim,
            });
        }
        let matrix = matrix.to_dtype(DType::F32)?;
        if let Some(row) = first_non_finite_row(&matrix)? {
            return Err(CatalogError::NonFiniteVector { row });
        }
        let vectors = l2_normalize_rows(&matrix)?;
        Ok(Self { vectors })
    }

    /// Reads precomputed vectors from a `.npy` file.
    pub fn load_npy(
        path: &Path,
        device: &Device,
        expected_rows: usize,
        expected_dim: usize,
    ) -> Result<Self, CatalogError> {
        if !path.exists() {
            return Err(CatalogError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let matrix = Tensor::read_npy(path)?.to_device(device)?;
        let index = Self::from_matrix(matrix, expected_rows, expected_dim)?;
        info!(
            path = %path.display(),
            rows = expected_rows,
            dim = expected_dim,
            "Catalog vectors loaded"
        );
        Ok(index)
    }

    /// Embeds every deal text with the deal tower.
    pub fn build(
        catalog: &Catalog,
        encoder: &DualEncoder,
        vocab: &Vocabulary,
    ) -> Result<Self, CatalogError> {
        let sequence = SequenceEncoder::new(MAX_LEN_DUAL);
        let ids: Vec<IdSequence> = catalog
            .iter()
            .map(|entry| sequence.encode(entry.text(), vocab))
            .collect();

        let chunks = ids
            .chunks(BUILD_CHUNK)
            .map(|chunk| encoder.embed_deals(chunk))
            .collect::<Result<Vec<_>, _>>()?;
        let matrix = Tensor::cat(&chunks, 0)?;

        debug!(rows = catalog.len(), "Built catalog vectors from deal texts");
        Self::from_matrix(matrix, catalog.len(), encoder.dim())
    }

    pub fn len(&self) -> usize {
        self.vectors.dims()[0]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dim(&self) -> usize {
        self.vectors.dims()[1]
    }

    /// Dot product of every row with a unit query of shape `(1, dim)`; equals cosine.
    pub fn similarities(&self, query: &Tensor) -> Result<Vec<f32>, CatalogError> {
        let scores = self
            .vectors
            .matmul(&query.t()?.contiguous()?)?
            .squeeze(1)?
            .to_vec1::<f32>()?;
        Ok(scores)
    }
}

fn first_non_finite_row(matrix: &Tensor) -> Result<Option<usize>, CatalogError> {
    let rows = matrix.to_vec2::<f32>()?;
    Ok(rows
        .iter()
        .position(|row| row.iter().any(|v| !v.is_finite())))
}
