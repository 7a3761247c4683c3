//! Error types for hadith-retrieve.

use std::fmt;
use std::path::PathBuf;

/// Errors that can occur while the engine is initializing.
///
/// Initialization is the only phase that can fail: a missing corpus file is
/// treated as an empty corpus rather than an error, so the only fatal
/// conditions are I/O failures and malformed JSON in a file that *does*
/// exist. `search`, `search_advanced`, and `get_by_reference` never return
/// this variant for user-input conditions (empty query, unknown
/// collection/book, empty corpus) — those are represented as empty results,
/// not errors.
#[derive(Debug)]
pub enum RetrieveError {
    /// Reading a corpus file from disk failed.
    Io(std::io::Error),
    /// A corpus file exists but is not valid JSON, or its shape doesn't
    /// match the expected structure.
    MalformedIndex {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for RetrieveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetrieveError::Io(e) => write!(f, "failed to read corpus file: {e}"),
            RetrieveError::MalformedIndex { path, source } => {
                write!(f, "malformed JSON in {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for RetrieveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RetrieveError::Io(e) => Some(e),
            RetrieveError::MalformedIndex { source, .. } => Some(source),
        }
    }
}

impl From<std::io::Error> for RetrieveError {
    fn from(e: std::io::Error) -> Self {
        RetrieveError::Io(e)
    }
}
