//! Headline tokenization and word-frequency counting.
//!
//! Normalization is ASCII-only: after lowercasing, anything outside `a-z`
//! and whitespace is dropped, accented letters included.

use std::collections::BTreeMap;

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;

/// Words must appear at least this many times to be reported.
pub const MIN_REPEATS: usize = 2;

static NON_ALPHA: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z\s]").unwrap());

/// Lowercase `text`, strip non `[a-z]` characters and split on whitespace.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    NON_ALPHA
        .replace_all(&lowered, "")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Count tokens over all `titles` and keep those seen `min_count` times or more.
pub fn repeated_words<'a, I>(titles: I, min_count: usize) -> BTreeMap<String, usize>
where
    I: IntoIterator<Item = &'a str>,
{
    titles
        .into_iter()
        .flat_map(tokenize)
        .counts()
        .into_iter()
        .filter(|(_, count)| *count >= min_count)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_strips_digits_and_punctuation() {
        assert_eq!(tokenize("Crisis, 2024!"), vec!["crisis"]);
    }

    #[test]
    fn test_tokenize_drops_accented_letters() {
        assert_eq!(tokenize("La Política   ESPAÑOLA"), vec!["la", "poltica", "espaola"]);
        assert!(tokenize("¿¡ 123 !?").is_empty());
    }

    #[test]
    fn test_tokenize_is_idempotent() {
        for text in ["The Old Man's sea", "  a\tb\nc ", "", "Trump-Xi 'situationship'"] {
            let once = tokenize(text);
            assert_eq!(tokenize(&once.join(" ")), once);
        }
    }

    #[test]
    fn test_repeated_words_example() {
        let counts = repeated_words(["the old man", "the sea and the old"], MIN_REPEATS);
        let expected: BTreeMap<String, usize> =
            [("old".to_string(), 2), ("the".to_string(), 3)].into_iter().collect();
        assert_eq!(counts, expected);
    }

    #[test]
    fn test_repeated_words_never_reports_singletons() {
        let counts = repeated_words(["Europe decides", "Europe waits", "Nobody else"], MIN_REPEATS);
        assert_eq!(counts.get("europe"), Some(&2));
        assert!(counts.values().all(|c| *c >= MIN_REPEATS));
        assert_eq!(counts.len(), 1);
    }

    #[test]
    fn test_repeated_words_empty_input() {
        assert!(repeated_words(std::iter::empty(), MIN_REPEATS).is_empty());
    }
}
