//! Fuzzy alignment of candidate labels with text tokens

mod label_match;
mod matcher;

pub use label_match::{LabelMatch, MatchWindow};
pub use matcher::LabelMatcher;

use serde::{Deserialize, Serialize};

/// Score given to a label token matched exactly but out of label order
pub const OUT_OF_ORDER_MATCH_FACTOR: f64 = 0.7;

/// Confidence of a label match, ordered `None < Partial < Full < Exact`
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchType {
    /// No processable token matched
    #[default]
    None,
    /// Some tokens of the label or the text remain unmatched
    Partial,
    /// All matchable tokens and all label tokens matched
    Full,
    /// The matched text equals the label
    Exact,
}

impl MatchType {
    /// `true` for [`MatchType::Full`] and [`MatchType::Exact`]
    pub fn is_full(self) -> bool {
        self >= MatchType::Full
    }
}

/// Number of characters two tokens share, as the longer of their common
/// prefix and common suffix. Equal tokens share their whole length.
pub fn compare_tokens(a: &str, b: &str) -> usize {
    if a == b {
        return a.chars().count();
    }
    let prefix = a.chars().zip(b.chars()).take_while(|(x, y)| x == y).count();
    let suffix = a
        .chars()
        .rev()
        .zip(b.chars().rev())
        .take_while(|(x, y)| x == y)
        .count();
    prefix.max(suffix)
}

/// Form used when comparing tokens: periods removed, lower case unless
/// `case_sensitive`
pub fn normalize_token(text: &str, case_sensitive: bool) -> String {
    let stripped = text.chars().filter(|c| *c != '.');
    if case_sensitive {
        stripped.collect()
    } else {
        stripped.flat_map(char::to_lowercase).collect()
    }
}

/// Similarity of two normalised tokens if it reaches `min_factor`
///
/// Tokens whose length difference alone rules out `min_factor` are rejected
/// without comparing characters.
pub fn token_similarity(a: &str, b: &str, min_factor: f64) -> Option<f64> {
    let (len_a, len_b) = (a.chars().count(), b.chars().count());
    let max_len = len_a.max(len_b);
    if max_len == 0 {
        return None;
    }
    // at most the shorter token can match
    let min_len = len_a.min(len_b);
    if (min_len as f64 / max_len as f64) < min_factor {
        return None;
    }
    let factor = compare_tokens(a, b) as f64 / max_len as f64;
    (factor >= min_factor).then_some(factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_type_order() {
        assert!(MatchType::Exact > MatchType::Full);
        assert!(MatchType::Full > MatchType::Partial);
        assert!(MatchType::Partial > MatchType::None);
        assert!(MatchType::Exact.is_full());
        assert!(!MatchType::Partial.is_full());
    }

    #[test]
    fn test_compare_tokens() {
        assert_eq!(compare_tokens("paris", "paris"), 5);
        assert_eq!(compare_tokens("obama", "obamas"), 5);
        assert_eq!(compare_tokens("walked", "talked"), 5);
        assert_eq!(compare_tokens("abc", "xyz"), 0);
        assert_eq!(compare_tokens("", ""), 0);
        assert_eq!(compare_tokens("zürich", "zurich"), 4);
    }

    #[test]
    fn test_normalize_token() {
        assert_eq!(normalize_token("U.S.", false), "us");
        assert_eq!(normalize_token("U.S.", true), "US");
    }

    #[test]
    fn test_token_similarity() {
        assert_eq!(token_similarity("paris", "paris", 0.7), Some(1.0));
        assert!(token_similarity("obama", "obamas", 0.7).is_some());
        // length difference alone exceeds the tolerance
        assert_eq!(token_similarity("new", "newyork", 0.7), None);
        assert_eq!(token_similarity("paris", "london", 0.7), None);
        assert_eq!(token_similarity("", "", 0.7), None);
    }

    #[test]
    fn test_token_similarity_accepts_exact_threshold() {
        assert_eq!(token_similarity("washington", "washingto", 0.9), Some(0.9));
        assert_eq!(token_similarity("kristiani", "kristiania", 0.9), Some(0.9));
        assert_eq!(token_similarity("paris", "pari", 0.8), Some(0.8));
        assert_eq!(token_similarity("london", "londo", 0.8), Some(5.0 / 6.0));
        assert_eq!(token_similarity("paris", "par", 0.8), None);
    }
}
