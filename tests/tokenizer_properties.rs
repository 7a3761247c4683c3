//! Property tests for tokenization and query normalization.

use hadith_retrieve::tokenizer::{normalize_query, tokenize};
use proptest::prelude::*;

proptest! {
    #[test]
    fn tokens_are_never_empty_and_always_lowercase_ascii(input in ".{0,200}") {
        for token in tokenize(&input) {
            prop_assert!(!token.is_empty());
            prop_assert!(token.chars().all(|c| c.is_ascii_lowercase()));
        }
    }

    #[test]
    fn normalize_query_is_idempotent(input in ".{0,200}") {
        let once = normalize_query(&input);
        let twice = normalize_query(&once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn normalize_query_ignores_word_order(a in "[a-z ]{0,50}") {
        let reversed: String = a.split_whitespace().rev().collect::<Vec<_>>().join(" ");
        prop_assert_eq!(normalize_query(&a), normalize_query(&reversed));
    }
}
