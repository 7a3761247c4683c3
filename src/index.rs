//! Inverted-index construction and corpus-wide statistics.
//!
//! The builder walks the loaded corpus exactly once, in collection → book →
//! hadith order, assigning dense doc-ids as it goes. Posting lists are
//! append-only, so they come out sorted by doc-id ascending for free — no
//! separate sort step is needed.

use std::collections::HashMap;

use crate::corpus::LoadedCorpus;
use crate::tokenizer::tokenize;

/// `(doc-id, term-frequency)` — one entry in a term's posting list.
#[derive(Debug, Clone, Copy)]
pub struct Posting {
    pub doc_id: u32,
    pub term_freq: u32,
}

/// Term → posting list. Within a list, doc-ids are strictly ascending and
/// never repeat.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    postings: HashMap<String, Vec<Posting>>,
}

impl InvertedIndex {
    pub fn postings(&self, term: &str) -> Option<&[Posting]> {
        self.postings.get(term).map(Vec::as_slice)
    }

    pub fn vocabulary_size(&self) -> usize {
        self.postings.len()
    }

    fn append(&mut self, term: String, doc_id: u32, term_freq: u32) {
        self.postings.entry(term).or_default().push(Posting { doc_id, term_freq });
    }
}

/// Doc-id → location of the source hadith plus its tokenized length.
/// `collection_idx`/`book_idx` index into [`crate::corpus::LoadedCorpus`];
/// the doc-id itself never leaves this crate's internals.
#[derive(Debug, Clone, Copy)]
pub struct DocMeta {
    pub collection_idx: u32,
    pub book_idx: u32,
    pub hadith_idx: u32,
    pub doc_length: u32,
}

/// Corpus-wide aggregates needed by the BM25 scorer.
#[derive(Debug, Clone, Copy, Default)]
pub struct CorpusStats {
    pub total_docs: usize,
    pub avg_doc_length: f32,
}

pub struct BuiltIndex {
    pub postings: InvertedIndex,
    pub metadata: Vec<DocMeta>,
    pub stats: CorpusStats,
}

/// Builds the inverted index, metadata table, and corpus statistics from a
/// loaded corpus in a single pass.
pub fn build(corpus: &LoadedCorpus) -> BuiltIndex {
    let mut postings = InvertedIndex::default();
    let mut metadata = Vec::new();
    let mut total_length: u64 = 0;

    for (collection_idx, collection) in corpus.collections.iter().enumerate() {
        for (book_idx, book) in collection.books.iter().enumerate() {
            for (hadith_idx, hadith) in book.hadiths.iter().enumerate() {
                let tokens = tokenize(&hadith.searchable_text);
                let doc_length = tokens.len() as u32;
                let doc_id = metadata.len() as u32;

                let mut term_counts: HashMap<String, u32> = HashMap::new();
                for tok in tokens {
                    *term_counts.entry(tok).or_insert(0) += 1;
                }
                for (term, count) in term_counts {
                    postings.append(term, doc_id, count);
                }

                metadata.push(DocMeta {
                    collection_idx: collection_idx as u32,
                    book_idx: book_idx as u32,
                    hadith_idx: hadith_idx as u32,
                    doc_length,
                });
                total_length += u64::from(doc_length);
            }
        }
    }

    let total_docs = metadata.len();
    let avg_doc_length = if total_docs > 0 {
        total_length as f32 / total_docs as f32
    } else {
        0.0
    };

    tracing::info!(
        total_docs,
        vocabulary = postings.vocabulary_size(),
        avg_doc_length,
        "built inverted index"
    );

    BuiltIndex { postings, metadata, stats: CorpusStats { total_docs, avg_doc_length } }
}
