//! Deterministic tokenization and query normalization.
//!
//! Tokenization is intentionally dumb: lowercase ASCII case-fold, then split
//! on anything that isn't an ASCII letter. No stemming, no stopwords, no
//! Unicode normalization — recall is traded for predictability and speed.

use std::collections::BTreeSet;

/// Lowercases `text` and extracts maximal runs of ASCII letters as tokens,
/// in occurrence order.
///
/// Non-ASCII letters (e.g. Arabic text) are not letters as far as this
/// tokenizer is concerned — they fall through as separators, same as digits
/// and punctuation.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_ascii_lowercase();
    let mut tokens = Vec::new();
    let mut current = String::new();

    for byte in lower.bytes() {
        if byte.is_ascii_lowercase() {
            current.push(byte as char);
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}

/// Cache key for a query: tokenize, drop duplicates, sort ascending, join
/// with single spaces. Two queries that differ only in word order or
/// repetition normalize to the same key.
pub fn normalize_query(query: &str) -> String {
    let distinct: BTreeSet<String> = tokenize(query).into_iter().collect();
    distinct.into_iter().collect::<Vec<_>>().join(" ")
}
