//! Okapi BM25 scoring.
//!
//! ```text
//! BM25(q, d) = sum over query terms of IDF(term) * (tf * (k1 + 1)) / (tf + k1 * (1 - b + b * |d| / avgdl))
//! ```
//!
//! Where `tf` is the term's frequency in `d`, `|d|` is `d`'s length in
//! tokens, `avgdl` is the corpus average document length, and `IDF` is the
//! standard BM25 variant that stays non-negative for every `df` in
//! `[1, N]`:
//!
//! ```text
//! IDF(term) = ln((N - df + 0.5) / (df + 0.5) + 1)
//! ```
//!
//! `k1` and `b` are fixed at the values below rather than exposed as
//! runtime configuration — this crate has exactly one caller (the query
//! engine) and no tuning story.

use crate::index::CorpusStats;

/// Term frequency saturation parameter.
pub const K1: f32 = 1.2;
/// Length normalization parameter.
pub const B: f32 = 0.75;

/// BM25 parameters, defaulting to the fixed [`K1`]/[`B`] above.
#[derive(Debug, Clone, Copy)]
pub struct Bm25Params {
    pub k1: f32,
    pub b: f32,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: K1, b: B }
    }
}

/// Inverse document frequency for a term with document frequency `df` in a
/// corpus of `total_docs` documents. Monotonically non-negative for every
/// `df` in `[1, total_docs]`, and strictly decreasing as `df` grows.
pub fn idf(total_docs: usize, df: u32) -> f32 {
    let n = total_docs as f32;
    let df = df as f32;
    ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
}

/// Scores a single term's contribution to a document. Callers sum this
/// across query terms to get the document's full BM25 score.
///
/// Must not be called against an empty corpus (`stats.total_docs == 0`);
/// callers short-circuit before reaching the scorer in that case.
pub fn score(term_freq: u32, doc_length: u32, df: u32, stats: &CorpusStats, params: Bm25Params) -> f32 {
    debug_assert!(stats.total_docs > 0, "score() called against an empty corpus");
    debug_assert!(stats.avg_doc_length > 0.0, "score() called with zero average document length");

    let idf = idf(stats.total_docs, df);
    let tf = term_freq as f32;
    let dl = doc_length as f32;

    let numerator = tf * (params.k1 + 1.0);
    let denominator = tf + params.k1 * (1.0 - params.b + params.b * dl / stats.avg_doc_length);

    idf * (numerator / denominator)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(total_docs: usize, avg_doc_length: f32) -> CorpusStats {
        CorpusStats { total_docs, avg_doc_length }
    }

    #[test]
    fn idf_is_non_negative_across_the_valid_df_range() {
        let n = 1000;
        for df in 1..=n {
            assert!(idf(n as usize, df) >= 0.0, "idf negative at df={df}");
        }
    }

    #[test]
    fn idf_decreases_as_df_increases() {
        let n = 100;
        let idf_rare = idf(n, 1);
        let idf_common = idf(n, 50);
        assert!(idf_rare > idf_common);
    }

    #[test]
    fn score_increases_with_term_frequency_at_fixed_length() {
        let s = stats(100, 10.0);
        let params = Bm25Params::default();
        let low = score(1, 10, 5, &s, params);
        let high = score(4, 10, 5, &s, params);
        assert!(high > low);
    }

    #[test]
    fn score_decreases_as_document_frequency_increases_with_tf_and_length_fixed() {
        let s = stats(1000, 10.0);
        let params = Bm25Params::default();
        let rare = score(2, 10, 1, &s, params);
        let common = score(2, 10, 500, &s, params);
        assert!(rare > common);
    }

    #[test]
    fn longer_documents_are_penalized_at_equal_term_frequency() {
        let s = stats(100, 10.0);
        let params = Bm25Params::default();
        let short_doc = score(2, 5, 10, &s, params);
        let long_doc = score(2, 50, 10, &s, params);
        assert!(short_doc > long_doc);
    }
}
