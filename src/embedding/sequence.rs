//! Fixed-length id sequences for embedding lookup.
//!
//! Every sequence produced here has exactly the configured length, is right-padded with
//! `<PAD>` and has every id clamped into `0..vocab_size`.

use crate::constants::{MAX_LEN_CROSS, MAX_LEN_DUAL, QUERY_SEGMENT_RATIO};

use super::tokenizer::tokenize;
use super::vocab::Vocabulary;

/// An encoded, padded id sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdSequence(Vec<u32>);

impl IdSequence {
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of positions holding something other than `pad_id`.
    pub fn content_len(&self, pad_id: u32) -> usize {
        self.0.iter().filter(|&&id| id != pad_id).count()
    }
}

fn lookup_all(text: &str, vocab: &Vocabulary) -> Vec<u32> {
    tokenize(text).iter().map(|t| vocab.lookup(t)).collect()
}

fn pad_and_clamp(mut ids: Vec<u32>, max_len: usize, vocab: &Vocabulary) -> IdSequence {
    ids.truncate(max_len);
    ids.resize(max_len, vocab.pad_id());
    let upper = vocab.len().saturating_sub(1) as u32;
    for id in &mut ids {
        *id = (*id).min(upper);
    }
    IdSequence(ids)
}

/// Single-text encoder used on the retrieval side.
#[derive(Debug, Clone, Copy)]
pub struct SequenceEncoder {
    max_len: usize,
}

impl Default for SequenceEncoder {
    fn default() -> Self {
        Self {
            max_len: MAX_LEN_DUAL,
        }
    }
}

impl SequenceEncoder {
    pub fn new(max_len: usize) -> Self {
        Self { max_len }
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Tokenizes, maps through `vocab`, keeps the first `max_len` ids and right-pads.
    pub fn encode(&self, text: &str, vocab: &Vocabulary) -> IdSequence {
        pad_and_clamp(lookup_all(text, vocab), self.max_len, vocab)
    }
}

/// Paired `[query][SEP][item]` encoder used on the rerank side.
///
/// The query segment gets `floor(0.45 * max_len)` slots, the item segment the rest minus
/// one slot for the separator. Each side is truncated independently.
#[derive(Debug, Clone, Copy)]
pub struct PairEncoder {
    max_len: usize,
    query_ratio: f64,
}

impl Default for PairEncoder {
    fn default() -> Self {
        Self {
            max_len: MAX_LEN_CROSS,
            query_ratio: QUERY_SEGMENT_RATIO,
        }
    }
}

impl PairEncoder {
    pub fn new(max_len: usize) -> Self {
        Self {
            max_len,
            ..Default::default()
        }
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Returns `(query_budget, item_budget)`.
    pub fn segment_budgets(&self) -> (usize, usize) {
        let query = (self.max_len as f64 * self.query_ratio).floor() as usize;
        let item = self.max_len.saturating_sub(query).saturating_sub(1);
        (query, item)
    }

    /// Encodes a (query, item) pair. `vocab` must be a rerank vocabulary.
    pub fn encode(&self, query: &str, item: &str, vocab: &Vocabulary) -> IdSequence {
        let (query_budget, item_budget) = self.segment_budgets();

        let mut query_ids = lookup_all(query, vocab);
        query_ids.truncate(query_budget);
        let mut item_ids = lookup_all(item, vocab);
        item_ids.truncate(item_budget);

        let sep = vocab.sep_id().unwrap_or(vocab.unk_id());
        let mut ids = Vec::with_capacity(self.max_len);
        ids.extend(query_ids);
        ids.push(sep);
        ids.extend(item_ids);

        pad_and_clamp(ids, self.max_len, vocab)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::vocab::VocabRole;
    use std::collections::HashMap;

    fn rerank_vocab() -> Vocabulary {
        let mut map: HashMap<String, u32> = HashMap::new();
        for (i, token) in ["<PAD>", "<UNK>", "<SEP>", "q", "d", "az", "bed"]
            .iter()
            .enumerate()
        {
            map.insert(token.to_string(), i as u32);
        }
        Vocabulary::new(VocabRole::Rerank, map).unwrap()
    }

    fn assert_no_holes(seq: &IdSequence, pad: u32) {
        let first_pad = seq.as_slice().iter().position(|&id| id == pad);
        if let Some(pos) = first_pad {
            assert!(seq.as_slice()[pos..].iter().all(|&id| id == pad));
        }
    }

    #[test]
    fn test_encode_pads_to_length() {
        let vocab = rerank_vocab();
        let seq = SequenceEncoder::default().encode("3 bed in AZ", &vocab);

        assert_eq!(seq.len(), MAX_LEN_DUAL);
        assert_eq!(&seq.as_slice()[..4], &[1, 6, 1, 5]);
        assert_eq!(seq.content_len(0), 4);
        assert_no_holes(&seq, 0);
    }

    #[test]
    fn test_encode_truncates_tail() {
        let vocab = rerank_vocab();
        let text = vec!["az"; 60].join(" ") + " bed";
        let seq = SequenceEncoder::default().encode(&text, &vocab);

        assert_eq!(seq.len(), MAX_LEN_DUAL);
        assert!(seq.as_slice().iter().all(|&id| id == 5));
    }

    #[test]
    fn test_encode_empty_is_all_pad() {
        let vocab = rerank_vocab();
        let seq = SequenceEncoder::new(8).encode("", &vocab);
        assert_eq!(seq.as_slice(), &[0; 8]);
    }

    #[test]
    fn test_encode_is_deterministic() {
        let vocab = rerank_vocab();
        let encoder = SequenceEncoder::default();
        let text = "Wholesale SFR in Phoenix AZ. 3 bed 2.0 bath";
        assert_eq!(encoder.encode(text, &vocab), encoder.encode(text, &vocab));
    }

    #[test]
    fn test_ids_within_vocab() {
        let vocab = rerank_vocab();
        for text in ["", "az", "?!", "unknown words only", "bed bed bed 42"] {
            let seq = SequenceEncoder::default().encode(text, &vocab);
            assert!(seq.as_slice().iter().all(|&id| (id as usize) < vocab.len()));
        }
    }

    #[test]
    fn test_pair_segment_budgets() {
        assert_eq!(PairEncoder::default().segment_budgets(), (43, 52));
        assert_eq!(PairEncoder::new(10).segment_budgets(), (4, 5));
    }

    #[test]
    fn test_pair_truncates_each_side() {
        let vocab = rerank_vocab();
        let query = vec!["q"; 60].join(" ");
        let item = vec!["d"; 80].join(" ");
        let seq = PairEncoder::default().encode(&query, &item, &vocab);
        let ids = seq.as_slice();

        assert_eq!(ids.len(), MAX_LEN_CROSS);
        assert!(ids[..43].iter().all(|&id| id == 3));
        assert_eq!(ids[43], 2);
        assert!(ids[44..].iter().all(|&id| id == 4));
        assert_eq!(ids[44..].len(), 52);
    }

    #[test]
    fn test_pair_short_inputs_pad_right() {
        let vocab = rerank_vocab();
        let seq = PairEncoder::default().encode("3 bed az", "az", &vocab);
        let ids = seq.as_slice();

        assert_eq!(&ids[..5], &[1, 6, 5, 2, 5]);
        assert_eq!(seq.content_len(0), 5);
        assert_no_holes(&seq, 0);
    }

    #[test]
    fn test_pair_empty_query_starts_with_sep() {
        let vocab = rerank_vocab();
        let seq = PairEncoder::default().encode("", "bed", &vocab);
        assert_eq!(&seq.as_slice()[..3], &[2, 6, 0]);
    }
}
