//! Token <-> id vocabularies.
//!
//! Two independent vocabularies exist: the retrieval one (needs `<PAD>` and `<UNK>`)
//! and the rerank one (additionally needs `<SEP>`). Both are read-only after load.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::constants::{PAD_TOKEN, SEP_TOKEN, UNK_TOKEN};

use super::error::EmbeddingError;

/// Which pipeline stage a vocabulary belongs to; decides the reserved tokens it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VocabRole {
    Retrieval,
    Rerank,
}

impl VocabRole {
    pub fn name(&self) -> &'static str {
        match self {
            VocabRole::Retrieval => "retrieval",
            VocabRole::Rerank => "rerank",
        }
    }
}

/// Dense token -> id mapping with resolved reserved ids.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    role: VocabRole,
    token_to_id: HashMap<String, u32>,
    pad_id: u32,
    unk_id: u32,
    sep_id: Option<u32>,
}

impl Vocabulary {
    /// Builds a vocabulary, checking density and the reserved entries for `role`.
    pub fn new(role: VocabRole, token_to_id: HashMap<String, u32>) -> Result<Self, EmbeddingError> {
        let size = token_to_id.len();
        let mut seen = vec![false; size];
        for (token, &id) in &token_to_id {
            let slot = seen.get_mut(id as usize).ok_or_else(|| EmbeddingError::InvalidVocabulary {
                vocab: role.name(),
                reason: format!("id {id} for token {token:?} is outside 0..{size}"),
            })?;
            if *slot {
                return Err(EmbeddingError::InvalidVocabulary {
                    vocab: role.name(),
                    reason: format!("id {id} is assigned to more than one token"),
                });
            }
            *slot = true;
        }

        let reserved = |token: &'static str| {
            token_to_id
                .get(token)
                .copied()
                .ok_or(EmbeddingError::MissingReservedToken {
                    vocab: role.name(),
                    token,
                })
        };

        let pad_id = reserved(PAD_TOKEN)?;
        let unk_id = reserved(UNK_TOKEN)?;
        let sep_id = match role {
            VocabRole::Retrieval => token_to_id.get(SEP_TOKEN).copied(),
            VocabRole::Rerank => Some(reserved(SEP_TOKEN)?),
        };

        Ok(Self {
            role,
            token_to_id,
            pad_id,
            unk_id,
            sep_id,
        })
    }

    /// Parses a JSON object of `token -> id`.
    pub fn from_json(role: VocabRole, json: &str) -> Result<Self, EmbeddingError> {
        let token_to_id: HashMap<String, u32> =
            serde_json::from_str(json).map_err(|e| EmbeddingError::InvalidVocabulary {
                vocab: role.name(),
                reason: e.to_string(),
            })?;
        Self::new(role, token_to_id)
    }

    pub fn from_file(role: VocabRole, path: &Path) -> Result<Self, EmbeddingError> {
        if !path.exists() {
            return Err(EmbeddingError::ModelNotFound {
                path: path.to_path_buf(),
            });
        }
        let json = std::fs::read_to_string(path)?;
        let vocab = Self::from_json(role, &json)?;
        debug!(
            role = role.name(),
            size = vocab.len(),
            path = %path.display(),
            "Loaded vocabulary"
        );
        Ok(vocab)
    }

    /// Derives a rerank vocabulary from this one, appending `<SEP>` if it is absent.
    pub fn with_separator(&self) -> Result<Self, EmbeddingError> {
        let mut token_to_id = self.token_to_id.clone();
        if !token_to_id.contains_key(SEP_TOKEN) {
            let next = token_to_id.len() as u32;
            token_to_id.insert(SEP_TOKEN.to_string(), next);
        }
        Self::new(VocabRole::Rerank, token_to_id)
    }

    /// Returns the id of `token`, or the `<UNK>` id when it is not in the vocabulary.
    pub fn lookup(&self, token: &str) -> u32 {
        self.token_to_id.get(token).copied().unwrap_or(self.unk_id)
    }

    pub fn len(&self) -> usize {
        self.token_to_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.token_to_id.is_empty()
    }

    pub fn role(&self) -> VocabRole {
        self.role
    }

    pub fn pad_id(&self) -> u32 {
        self.pad_id
    }

    pub fn unk_id(&self) -> u32 {
        self.unk_id
    }

    /// `<SEP>` id; always present for [`VocabRole::Rerank`].
    pub fn sep_id(&self) -> Option<u32> {
        self.sep_id
    }
}
