//! Match highlighting over the English body of a search result.
//!
//! Byte offsets, not char offsets: since the tokenizer restricts
//! `highlight_words` to runs of ASCII letters, every extend/slice boundary
//! this module computes lands on a byte that is either the start of the
//! string, the end of the string, or immediately adjacent to a non-letter
//! byte. A UTF-8 continuation byte (0x80-0xBF) and a multi-byte sequence's
//! lead byte are never `is_ascii_alphabetic`, so the boundary-extension
//! loop below never stops mid-character — every `start`/`end` it produces
//! is a valid `str` slice point.

use std::collections::HashSet;

/// A merged, non-overlapping match span into a result's English body.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct HighlightSpan {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

const MAX_HIGHLIGHT_WORDS: usize = 5;
const MAX_OCCURRENCES_PER_WORD: usize = 3;
const MAX_SPANS: usize = 10;

/// Finds up to [`MAX_SPANS`] non-overlapping highlight spans in `body` for
/// the first [`MAX_HIGHLIGHT_WORDS`] distinct tokens of `query_words`.
pub fn highlight(body: &str, query_words: &[String]) -> Vec<HighlightSpan> {
    let mut seen = HashSet::new();
    let mut highlight_words: Vec<&str> = Vec::new();
    for word in query_words {
        if word.is_empty() {
            continue;
        }
        if seen.insert(word.as_str()) {
            highlight_words.push(word.as_str());
            if highlight_words.len() == MAX_HIGHLIGHT_WORDS {
                break;
            }
        }
    }
    if highlight_words.is_empty() {
        return Vec::new();
    }

    let body_lower = body.to_ascii_lowercase();
    let bytes = body_lower.as_bytes();

    let mut raw_spans: Vec<(usize, usize)> = Vec::new();
    for word in &highlight_words {
        let mut search_from = 0usize;
        let mut occurrences = 0usize;
        while occurrences < MAX_OCCURRENCES_PER_WORD {
            let Some(rel_pos) = body_lower[search_from..].find(word) else { break };
            let pos = search_from + rel_pos;

            let mut start = pos;
            while start > 0 && bytes[start - 1].is_ascii_alphabetic() {
                start -= 1;
            }
            let mut end = pos + word.len();
            while end < bytes.len() && bytes[end].is_ascii_alphabetic() {
                end += 1;
            }

            raw_spans.push((start, end));
            search_from = pos + 1;
            occurrences += 1;
        }
    }

    raw_spans.sort_by_key(|&(start, _)| start);

    let mut merged: Vec<(usize, usize)> = Vec::new();
    for (start, end) in raw_spans {
        match merged.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }
    merged.truncate(MAX_SPANS);

    merged
        .into_iter()
        .map(|(start, end)| HighlightSpan { start, end, text: body[start..end].to_string() })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn extends_to_word_boundaries() {
        let spans = highlight("The prophet said: prophethood is a trust.", &words("prophet"));
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text, "prophet");
        assert_eq!(spans[1].text, "prophethood");
        for w in spans.windows(2) {
            assert!(w[0].end <= w[1].start);
        }
    }

    #[test]
    fn spans_never_overlap_and_text_matches_slice() {
        let body = "mercy upon mercy, mercy everywhere";
        let spans = highlight(body, &words("mercy"));
        for w in spans.windows(2) {
            assert!(w[0].end <= w[1].start);
        }
        for span in &spans {
            assert_eq!(span.text, &body[span.start..span.end]);
        }
    }

    #[test]
    fn caps_at_five_words_three_occurrences_ten_spans() {
        let body = "one two three four five six seven";
        let spans = highlight(body, &words("one one one one two three four five six"));
        assert!(spans.len() <= MAX_SPANS);
    }

    #[test]
    fn empty_query_yields_no_spans() {
        assert!(highlight("any body text", &[]).is_empty());
    }

    #[test]
    fn non_ascii_body_text_is_not_corrupted() {
        // "mercy" appears right before a multi-byte Arabic run; boundary
        // extension must stop cleanly at the ASCII/non-ASCII edge.
        let body = "mercy \u{0631}\u{062d}\u{0645}\u{0629} follows";
        let spans = highlight(body, &words("mercy"));
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "mercy");
    }
}
