//! Corpus loading: reads `collections.json` and `search-index.json` into
//! in-memory, order-preserving structures.
//!
//! The nested representation (collection → book → hadith array) is kept
//! as-is rather than flattened at load time; [`crate::index`] assigns dense
//! doc-ids over it in a single stable traversal, and materialization reads
//! back through the same nested structure by index. A missing file is not
//! an error — it degenerates to an empty manifest or empty corpus. A file
//! that exists but fails to parse is fatal.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RetrieveError;

/// A hadith's numeric identifiers are stored as either a JSON number or a
/// JSON string in the source corpus; this keeps both representations and
/// compares by string form rather than requiring the caller to guess which
/// shape a given field took.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum NumberOrString {
    Int(i64),
    Str(String),
}

impl NumberOrString {
    pub fn as_comparable_string(&self) -> String {
        match self {
            NumberOrString::Int(n) => n.to_string(),
            NumberOrString::Str(s) => s.clone(),
        }
    }
}

impl fmt::Display for NumberOrString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_comparable_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RawCollectionEntry {
    id: String,
    name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawCollectionsFile {
    #[serde(default)]
    collections: Vec<RawCollectionEntry>,
}

/// A hadith as stored in `search-index.json`, after typed deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawHadith {
    #[serde(rename = "hadithNumber", default)]
    pub hadith_number: Option<NumberOrString>,
    #[serde(rename = "englishNarrated", default)]
    pub english_narrated: String,
    #[serde(rename = "englishText", default)]
    pub english_text: String,
    #[serde(rename = "arabicText", default)]
    pub arabic_text: String,
    #[serde(rename = "bookReference", default)]
    pub book_reference: Option<NumberOrString>,
    #[serde(rename = "searchableText", default)]
    pub searchable_text: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawBook {
    #[serde(rename = "bookName", default)]
    book_name: String,
    #[serde(default)]
    hadiths: Vec<RawHadith>,
}

/// A book within a collection, in the order it was encountered while
/// loading `search-index.json`.
pub struct BookRecord {
    pub id: String,
    pub book_name: String,
    pub hadiths: Vec<RawHadith>,
}

/// A collection, with its books in load order and an id → index lookup for
/// O(1) reference resolution.
pub struct CollectionRecord {
    pub id: String,
    pub books: Vec<BookRecord>,
    pub(crate) book_lookup: HashMap<String, usize>,
}

impl CollectionRecord {
    pub fn book_index(&self, book_id: &str) -> Option<usize> {
        self.book_lookup.get(book_id).copied()
    }
}

/// The full nested corpus loaded from `search-index.json`.
#[derive(Default)]
pub struct LoadedCorpus {
    pub collections: Vec<CollectionRecord>,
    pub(crate) collection_lookup: HashMap<String, usize>,
}

impl LoadedCorpus {
    pub fn collection_index(&self, collection_id: &str) -> Option<usize> {
        self.collection_lookup.get(collection_id).copied()
    }
}

/// Loads `collections.json` into an id → display-name map. A missing file
/// yields an empty map, not an error.
pub fn load_collections(data_dir: &Path) -> Result<HashMap<String, String>, RetrieveError> {
    let path = data_dir.join("collections.json");
    if !path.is_file() {
        tracing::warn!(path = %path.display(), "collections.json not found; using empty manifest");
        return Ok(HashMap::new());
    }

    let bytes = fs::read(&path)?;
    let parsed: RawCollectionsFile = serde_json::from_slice(&bytes)
        .map_err(|source| RetrieveError::MalformedIndex { path: path.clone(), source })?;

    tracing::debug!(count = parsed.collections.len(), "loaded collections manifest");
    Ok(parsed.collections.into_iter().map(|c| (c.id, c.name)).collect())
}

/// Loads `search-index.json` into the nested [`LoadedCorpus`]. A missing
/// file yields an empty corpus, not an error.
pub fn load_search_index(data_dir: &Path) -> Result<LoadedCorpus, RetrieveError> {
    let path = data_dir.join("search-index.json");
    if !path.is_file() {
        tracing::warn!(path = %path.display(), "search-index.json not found; using empty corpus");
        return Ok(LoadedCorpus::default());
    }

    let bytes = fs::read(&path)?;
    let root: Value = serde_json::from_slice(&bytes)
        .map_err(|source| RetrieveError::MalformedIndex { path: path.clone(), source })?;

    let mut collections = Vec::new();
    let mut collection_lookup = HashMap::new();

    if let Some(collections_obj) = root.get("collections").and_then(Value::as_object) {
        for (collection_id, collection_value) in collections_obj {
            let mut books = Vec::new();
            let mut book_lookup = HashMap::new();

            if let Some(books_obj) = collection_value.get("books").and_then(Value::as_object) {
                for (book_id, book_value) in books_obj {
                    let raw_book: RawBook = serde_json::from_value(book_value.clone())
                        .map_err(|source| RetrieveError::MalformedIndex { path: path.clone(), source })?;
                    book_lookup.insert(book_id.clone(), books.len());
                    books.push(BookRecord {
                        id: book_id.clone(),
                        book_name: raw_book.book_name,
                        hadiths: raw_book.hadiths,
                    });
                }
            }

            collection_lookup.insert(collection_id.clone(), collections.len());
            collections.push(CollectionRecord { id: collection_id.clone(), books, book_lookup });
        }
    }

    tracing::debug!(collections = collections.len(), "loaded search index document");
    Ok(LoadedCorpus { collections, collection_lookup })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, contents: &str) {
        let mut f = fs::File::create(dir.join(name)).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
    }

    #[test]
    fn missing_files_yield_empty_structures() {
        let dir = tempfile::tempdir().unwrap();
        let collections = load_collections(dir.path()).unwrap();
        assert!(collections.is_empty());
        let corpus = load_search_index(dir.path()).unwrap();
        assert!(corpus.collections.is_empty());
    }

    #[test]
    fn malformed_json_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "collections.json", "{ not json");
        let err = load_collections(dir.path()).unwrap_err();
        assert!(matches!(err, RetrieveError::MalformedIndex { .. }));
    }

    #[test]
    fn loads_nested_structure_in_file_order() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "search-index.json",
            r#"{
                "collections": {
                    "bukhari": {
                        "books": {
                            "1": {
                                "bookName": "Book One",
                                "hadiths": [
                                    {"hadithNumber": 1, "bookReference": 7, "englishText": "a", "searchableText": "a"}
                                ]
                            }
                        }
                    }
                }
            }"#,
        );
        let corpus = load_search_index(dir.path()).unwrap();
        assert_eq!(corpus.collections.len(), 1);
        assert_eq!(corpus.collections[0].id, "bukhari");
        assert_eq!(corpus.collections[0].books[0].id, "1");
        assert_eq!(corpus.collections[0].books[0].hadiths.len(), 1);
        assert_eq!(corpus.collection_index("bukhari"), Some(0));
        assert_eq!(corpus.collections[0].book_index("1"), Some(0));
    }
}
