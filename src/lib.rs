//! Full-text BM25 retrieval over a hadith corpus.
//!
//! [`SearchEngine`] is the entry point: construct it with an
//! [`EngineConfig`] pointing at a directory containing `collections.json`
//! and `search-index.json`, then call [`SearchEngine::search`],
//! [`SearchEngine::search_advanced`], or
//! [`SearchEngine::get_by_reference`]. The heavier index build is deferred
//! to the first query unless [`EngineConfig::eager`] is set.

pub mod bm25;
pub mod cache;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod highlight;
pub mod index;
pub mod tokenizer;

pub use error::RetrieveError;

/// Commonly used types, re-exported for `use hadith_retrieve::prelude::*;`.
pub mod prelude {
    pub use crate::corpus::NumberOrString;
    pub use crate::engine::{EngineConfig, SearchEngine, SearchResult, DEFAULT_LIMIT};
    pub use crate::error::RetrieveError;
    pub use crate::highlight::HighlightSpan;
}
