//! Query engine and lifecycle controller.
//!
//! [`SearchEngine`] is the single value the rest of this crate's design
//! notes call for: its construction-time [`EngineConfig`] carries the data
//! directory and eager/lazy choice, and every other component (tokenizer,
//! index, scorer, caches, highlighter) is reached through its methods. The
//! corpus and index are built at most once, guarded by a [`OnceLock`] with
//! a mutex-serialized build path — the fast path after `Ready` touches no
//! lock at all.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use serde::Serialize;

use crate::bm25::{self, Bm25Params};
use crate::cache::{ResultCache, CAPACITY};
use crate::corpus::{self, LoadedCorpus, NumberOrString};
use crate::error::RetrieveError;
use crate::highlight::{self, HighlightSpan};
use crate::index::{self, CorpusStats, InvertedIndex};
use crate::tokenizer::{normalize_query, tokenize};

/// Default number of results when a caller doesn't specify a limit.
pub const DEFAULT_LIMIT: usize = 50;

// Thresholds from the reference implementation's early-termination
// heuristic. This crate doesn't reproduce the heuristic's internal branch
// (see `rank_to_limit` below) — only its observable effect, which a
// heap-bounded top-k selection reproduces exactly without the arbitrary
// score threshold. See DESIGN.md for why that's a safe simplification.
const EARLY_TERMINATION_FANOUT: usize = 3;
const EARLY_TERMINATION_POOL: usize = 2;
const COMMON_TERM_DF_THRESHOLD: usize = 100;
const COMMON_TERM_POSTING_CAP: usize = 1000;

/// Construction-time configuration for a [`SearchEngine`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub data_dir: PathBuf,
    /// Build the index eagerly at construction instead of on first query.
    pub eager: bool,
}

impl EngineConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into(), eager: false }
    }

    pub fn eager(mut self) -> Self {
        self.eager = true;
        self
    }
}

/// A single ranked (or reference-looked-up) hadith, ready to hand to a
/// caller or serialize directly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub collection_id: String,
    pub collection_name: String,
    pub hadith_number: Option<NumberOrString>,
    pub book_no: i64,
    pub book_name: String,
    pub narrator_en: String,
    pub body_en: String,
    pub body_ar: String,
    pub book_reference: Option<NumberOrString>,
    /// `None` for reference lookups, which have no query to score against.
    pub score: Option<f32>,
    /// `Some` only for [`SearchEngine::search_advanced`] results.
    pub highlights: Option<Vec<HighlightSpan>>,
}

struct IndexState {
    corpus: LoadedCorpus,
    postings: InvertedIndex,
    metadata: Vec<index::DocMeta>,
    stats: CorpusStats,
}

/// The full retrieval engine: corpus, inverted index, scorer, and result
/// caches behind one construction-time configuration.
///
/// `Created -> Initializing -> Ready`: the collections
/// manifest is loaded at construction; the heavier index build is deferred
/// to the first call to `search`/`search_advanced`/`get_by_reference`
/// unless `config.eager` is set. A failed build leaves the engine in
/// `Created` so the next call retries — this relies on [`OnceLock`] only
/// ever being committed on success.
pub struct SearchEngine {
    data_dir: PathBuf,
    collections_manifest: HashMap<String, String>,
    state: OnceLock<IndexState>,
    init_lock: Mutex<()>,
    basic_cache: ResultCache,
    advanced_cache: ResultCache,
    #[cfg(feature = "test-util")]
    build_count: std::sync::atomic::AtomicUsize,
}

impl SearchEngine {
    /// Loads the collections manifest (cheap) and, if `config.eager`,
    /// immediately builds the full index. Lazy construction never fails on
    /// a missing or malformed `search-index.json` until the first query
    /// forces the build.
    pub fn new(config: EngineConfig) -> Result<Self, RetrieveError> {
        let collections_manifest = corpus::load_collections(&config.data_dir)?;
        let engine = Self {
            data_dir: config.data_dir,
            collections_manifest,
            state: OnceLock::new(),
            init_lock: Mutex::new(()),
            basic_cache: ResultCache::new(CAPACITY),
            advanced_cache: ResultCache::new(CAPACITY),
            #[cfg(feature = "test-util")]
            build_count: std::sync::atomic::AtomicUsize::new(0),
        };
        if config.eager {
            engine.ensure_ready()?;
        }
        Ok(engine)
    }

    /// Builds the index on first call, serialized by `init_lock` so two
    /// concurrent first-callers never both build it. After success, every
    /// later call takes the lock-free `OnceLock::get` fast path.
    fn ensure_ready(&self) -> Result<&IndexState, RetrieveError> {
        if let Some(state) = self.state.get() {
            return Ok(state);
        }

        let _guard = self.init_lock.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(state) = self.state.get() {
            return Ok(state);
        }

        tracing::info!(data_dir = %self.data_dir.display(), "building search index");
        let corpus = corpus::load_search_index(&self.data_dir)?;
        let built = index::build(&corpus);
        let state = IndexState {
            corpus,
            postings: built.postings,
            metadata: built.metadata,
            stats: built.stats,
        };

        #[cfg(feature = "test-util")]
        self.build_count.fetch_add(1, std::sync::atomic::Ordering::SeqCst);

        // We hold init_lock, so no other thread can race this `set`.
        let _ = self.state.set(state);
        Ok(self.state.get().expect("just set"))
    }

    /// Number of times the index build path has actually run. Only present
    /// under the `test-util` feature; used by integration tests to verify
    /// the `OnceLock` + `init_lock` pairing really serializes concurrent
    /// first-callers into a single build, rather than just happening to
    /// produce consistent results from multiple racing builds.
    #[cfg(feature = "test-util")]
    pub fn build_count(&self) -> usize {
        self.build_count.load(std::sync::atomic::Ordering::SeqCst)
    }

    /// Ranked search without highlights. See [`Self::search_advanced`] for
    /// the highlighted variant.
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, RetrieveError> {
        self.search_impl(query, limit, false)
    }

    /// Same ranking as [`Self::search`], with up to 10 merged highlight
    /// spans attached to each result's English body.
    pub fn search_advanced(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, RetrieveError> {
        self.search_impl(query, limit, true)
    }

    fn search_impl(&self, query: &str, limit: usize, advanced: bool) -> Result<Vec<SearchResult>, RetrieveError> {
        let limit = limit.max(1);
        let query_words = tokenize(query);
        if query_words.is_empty() {
            return Ok(Vec::new());
        }

        let cache = if advanced { &self.advanced_cache } else { &self.basic_cache };
        let cache_key = (normalize_query(query), limit);
        if let Some(hit) = cache.get(&cache_key) {
            return Ok(hit);
        }

        let state = self.ensure_ready()?;
        if state.stats.total_docs == 0 {
            return Ok(Vec::new());
        }

        let ranked = rank(&query_words, limit, state);
        let results = self.materialize(&ranked, state, advanced, &query_words);

        cache.put(cache_key, results.clone());
        Ok(results)
    }

    /// Exact `(collection_id, book_id, reference)` lookup; ensures the
    /// index is initialized so the underlying corpus is available, then
    /// walks the book's hadith array linearly. Unknown collection/book or
    /// no matching reference all yield `Ok(None)`, not an error.
    pub fn get_by_reference(
        &self,
        collection_id: &str,
        book_id: &str,
        reference: &str,
    ) -> Result<Option<SearchResult>, RetrieveError> {
        let state = self.ensure_ready()?;

        let Some(collection_idx) = state.corpus.collection_index(collection_id) else {
            return Ok(None);
        };
        let collection = &state.corpus.collections[collection_idx];
        let Some(book_idx) = collection.book_index(book_id) else {
            return Ok(None);
        };
        let book = &collection.books[book_idx];

        let Some(hadith_idx) = book
            .hadiths
            .iter()
            .position(|h| h.book_reference.as_ref().map(|r| r.as_comparable_string() == reference).unwrap_or(false))
        else {
            return Ok(None);
        };

        let hadith = &book.hadiths[hadith_idx];
        let collection_name = self
            .collections_manifest
            .get(collection_id)
            .cloned()
            .unwrap_or_else(|| collection_id.to_string());

        Ok(Some(SearchResult {
            collection_id: collection.id.clone(),
            collection_name,
            hadith_number: hadith.hadith_number.clone(),
            book_no: book.id.parse().unwrap_or(0),
            book_name: book.book_name.clone(),
            narrator_en: hadith.english_narrated.clone(),
            body_en: hadith.english_text.clone(),
            body_ar: hadith.arabic_text.clone(),
            book_reference: hadith.book_reference.clone(),
            score: None,
            highlights: None,
        }))
    }

    fn materialize(
        &self,
        ranked: &[(u32, f32)],
        state: &IndexState,
        advanced: bool,
        query_words: &[String],
    ) -> Vec<SearchResult> {
        ranked
            .iter()
            .map(|&(doc_id, score)| {
                let meta = &state.metadata[doc_id as usize];
                let collection = &state.corpus.collections[meta.collection_idx as usize];
                let book = &collection.books[meta.book_idx as usize];
                let hadith = &book.hadiths[meta.hadith_idx as usize];

                let collection_name = self
                    .collections_manifest
                    .get(&collection.id)
                    .cloned()
                    .unwrap_or_else(|| collection.id.clone());

                let highlights = advanced.then(|| highlight::highlight(&hadith.english_text, query_words));

                SearchResult {
                    collection_id: collection.id.clone(),
                    collection_name,
                    hadith_number: hadith.hadith_number.clone(),
                    book_no: book.id.parse().unwrap_or(0),
                    book_name: book.book_name.clone(),
                    narrator_en: hadith.english_narrated.clone(),
                    body_en: hadith.english_text.clone(),
                    body_ar: hadith.arabic_text.clone(),
                    book_reference: hadith.book_reference.clone(),
                    score: Some(score),
                    highlights,
                }
            })
            .collect()
    }
}

/// A scored document pending top-k selection. Ordered by score ascending,
/// then by doc-id *descending*, so that `BinaryHeap<Reverse<Candidate>>`
/// pops the weakest candidate first: lowest score, and among ties the
/// higher doc-id — which is exactly the one the final (score desc, doc-id
/// asc) ranking would have placed last.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Candidate {
    doc_id: u32,
    score: f32,
}

impl Eq for Candidate {}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.doc_id.cmp(&self.doc_id))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Scores every candidate document for `query_words` against `state`'s
/// index, then reduces to the top `limit` by (score desc, doc-id asc).
///
/// Terms with a document frequency at or above
/// [`COMMON_TERM_DF_THRESHOLD`] only contribute their first
/// [`COMMON_TERM_POSTING_CAP`] postings (in doc-id order) — mirroring the
/// reference implementation's handling of very common words, which caps
/// work per term rather than skipping the term outright.
fn rank(query_words: &[String], limit: usize, state: &IndexState) -> Vec<(u32, f32)> {
    let params = Bm25Params::default();
    let mut scores: HashMap<u32, f32> = HashMap::new();

    for term in query_words {
        let Some(postings) = state.postings.postings(term) else { continue };
        let df = postings.len() as u32;
        let slice = if postings.len() >= COMMON_TERM_DF_THRESHOLD {
            &postings[..postings.len().min(COMMON_TERM_POSTING_CAP)]
        } else {
            postings
        };

        for posting in slice {
            let doc_length = state.metadata[posting.doc_id as usize].doc_length;
            let contribution = bm25::score(posting.term_freq, doc_length, df, &state.stats, params);
            *scores.entry(posting.doc_id).or_insert(0.0) += contribution;
        }
    }

    rank_to_limit(scores, limit)
}

/// Reduces a `doc_id -> score` map to its top `limit` entries ordered by
/// (score desc, doc-id asc).
///
/// When there are more than `EARLY_TERMINATION_FANOUT * limit` candidates,
/// a bounded `BinaryHeap` first narrows the field to
/// `EARLY_TERMINATION_POOL * limit` before the final sort. Because the
/// true top `limit` is always a subset of the top `EARLY_TERMINATION_POOL
/// * limit`, this produces identical output to sorting the full candidate
/// set — it only skips comparisons the final truncation would have
/// discarded anyway.
fn rank_to_limit(scores: HashMap<u32, f32>, limit: usize) -> Vec<(u32, f32)> {
    let pool_target = EARLY_TERMINATION_POOL * limit;

    let candidates: Vec<Candidate> = if scores.len() > EARLY_TERMINATION_FANOUT * limit && pool_target > 0 {
        let mut heap: BinaryHeap<std::cmp::Reverse<Candidate>> = BinaryHeap::with_capacity(pool_target + 1);
        for (doc_id, score) in scores {
            let candidate = Candidate { doc_id, score };
            if heap.len() < pool_target {
                heap.push(std::cmp::Reverse(candidate));
            } else if let Some(std::cmp::Reverse(weakest)) = heap.peek() {
                if candidate > *weakest {
                    heap.pop();
                    heap.push(std::cmp::Reverse(candidate));
                }
            }
        }
        heap.into_iter().map(|std::cmp::Reverse(c)| c).collect()
    } else {
        scores.into_iter().map(|(doc_id, score)| Candidate { doc_id, score }).collect()
    };

    let mut candidates = candidates;
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.doc_id.cmp(&b.doc_id)));
    candidates.truncate(limit);
    candidates.into_iter().map(|c| (c.doc_id, c.score)).collect()
}
