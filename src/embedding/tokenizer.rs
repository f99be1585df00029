//! Word tokenizer shared by both vocabularies.
//!
//! Lowercases the input and keeps every maximal run of ASCII letters or digits.
//! Everything else is a separator and is dropped. No stemming, no stopwords.

use std::sync::LazyLock;

use regex::Regex;

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[a-z0-9]+").expect("static word pattern is valid"));

/// Splits `text` into lowercase ASCII alphanumeric runs.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    WORD.find_iter(&lowered)
        .map(|m| m.as_str().to_owned())
        .collect()
}
