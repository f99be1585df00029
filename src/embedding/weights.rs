//! Named-tensor access over safetensors weight files.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use candle_core::{DType, Device, Tensor};
use memmap2::Mmap;
use tracing::debug;

use super::error::EmbeddingError;

/// Tensors of one weight file, keyed by their training state-dict names.
#[derive(Debug)]
pub struct WeightMap {
    tensors: HashMap<String, Tensor>,
    fingerprint: Option<String>,
}

impl WeightMap {
    pub fn from_tensors(tensors: HashMap<String, Tensor>) -> Self {
        Self {
            tensors,
            fingerprint: None,
        }
    }

    /// Memory-maps a `.safetensors` file and loads every tensor onto `device`.
    pub fn load(path: &Path, device: &Device) -> Result<Self, EmbeddingError> {
        if !path.exists() {
            return Err(EmbeddingError::ModelNotFound {
                path: path.to_path_buf(),
            });
        }

        let file = File::open(path)?;
        // SAFETY: the mapping is read-only and dropped before this function returns;
        // tensors are copied out by `load_buffer`.
        let mmap = unsafe { Mmap::map(&file)? };
        let fingerprint = blake3::hash(&mmap).to_hex().to_string();

        let tensors = candle_core::safetensors::load_buffer(&mmap, device).map_err(|e| {
            EmbeddingError::ModelLoadFailed {
                reason: format!("{}: {}", path.display(), e),
            }
        })?;

        debug!(
            path = %path.display(),
            tensors = tensors.len(),
            fingerprint = %fingerprint,
            "Loaded weight file"
        );

        Ok(Self {
            tensors,
            fingerprint: Some(fingerprint),
        })
    }

    /// blake3 hex digest of the file contents (absent for in-memory maps).
    pub fn fingerprint(&self) -> Option<&str> {
        self.fingerprint.as_deref()
    }

    /// Returns `name` as `F32` after checking its rank.
    fn take(&self, name: &str, rank: usize) -> Result<Tensor, EmbeddingError> {
        let tensor = self
            .tensors
            .get(name)
            .ok_or_else(|| EmbeddingError::MissingTensor {
                name: name.to_string(),
            })?;
        if tensor.rank() != rank {
            return Err(EmbeddingError::ShapeMismatch {
                name: name.to_string(),
                expected: vec![0; rank],
                actual: tensor.dims().to_vec(),
            });
        }
        Ok(tensor.to_dtype(DType::F32)?)
    }

    /// A `(rows, cols)` matrix; pass `None` to accept any size along a dimension.
    pub fn matrix(
        &self,
        name: &str,
        rows: Option<usize>,
        cols: Option<usize>,
    ) -> Result<Tensor, EmbeddingError> {
        let tensor = self.take(name, 2)?;
        let (r, c) = tensor.dims2()?;
        if rows.is_some_and(|rows| rows != r) || cols.is_some_and(|cols| cols != c) {
            return Err(EmbeddingError::ShapeMismatch {
                name: name.to_string(),
                expected: vec![rows.unwrap_or(r), cols.unwrap_or(c)],
                actual: vec![r, c],
            });
        }
        Ok(tensor)
    }

    pub fn vector(&self, name: &str, len: usize) -> Result<Tensor, EmbeddingError> {
        let tensor = self.take(name, 1)?;
        let actual = tensor.dims1()?;
        if actual != len {
            return Err(EmbeddingError::ShapeMismatch {
                name: name.to_string(),
                expected: vec![len],
                actual: vec![actual],
            });
        }
        Ok(tensor)
    }
}
