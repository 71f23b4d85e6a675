use super::MatchType;
use crate::entity::Literal;
use crate::error::{LinkError, Result};
use serde::Serialize;

/// Token-level outcome of aligning one label with the text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchWindow {
    /// First matched token (section token index)
    pub start: usize,
    /// Number of tokens from the first to the last matched token
    pub span: usize,
    /// Matched tokens that are matchable
    pub processable_match_count: usize,
    /// All matched tokens
    pub match_count: usize,
    /// Average similarity of the matched tokens
    pub token_match_score: f64,
    /// Matchable tokens within the span
    pub window_matchable_count: usize,
    /// Every label token was matched
    pub labels_covered: bool,
    /// The covered text equals the label
    pub exact: bool,
}

/// Result of matching one candidate label against the text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelMatch {
    label: Literal,
    label_token_count: usize,
    #[serde(rename = "match")]
    match_type: MatchType,
    start: usize,
    span: usize,
    match_count: usize,
    processable_match_count: usize,
    token_match_score: f64,
    text_score: f64,
    label_score: f64,
    match_score: f64,
}

impl LabelMatch {
    /// Create a label match, checking the window invariants
    ///
    /// A span shorter than the match count is widened to the match count.
    pub fn new(label: Literal, label_token_count: usize, window: MatchWindow) -> Result<Self> {
        let invalid = |reason: String| Err(LinkError::InvalidLabelMatch { reason });
        if window.span == 0 {
            return invalid(format!("empty span for label '{}'", label.text));
        }
        if label_token_count == 0 {
            return invalid(format!("label '{}' has no tokens", label.text));
        }
        if !(0.0..=1.0).contains(&window.token_match_score) {
            return invalid(format!(
                "token match score {} outside [0, 1]",
                window.token_match_score
            ));
        }
        if window.processable_match_count > window.match_count {
            return invalid(format!(
                "processable match count {} exceeds match count {}",
                window.processable_match_count, window.match_count
            ));
        }
        if window.span < window.processable_match_count {
            return invalid(format!(
                "span {} shorter than processable match count {}",
                window.span, window.processable_match_count
            ));
        }

        let mut span = window.span;
        if span < window.match_count {
            log::warn!(
                "widening span {} of label '{}' to its match count {}",
                span,
                label.text,
                window.match_count
            );
            span = window.match_count;
        }

        let match_type = if window.processable_match_count == 0 {
            MatchType::None
        } else if window.exact {
            MatchType::Exact
        } else if window.processable_match_count >= window.window_matchable_count
            && window.labels_covered
        {
            MatchType::Full
        } else {
            MatchType::Partial
        };

        let weighted = window.match_count as f64 * window.token_match_score;
        let text_score = weighted / span as f64;
        let label_score = weighted / label_token_count as f64;
        Ok(Self {
            label,
            label_token_count,
            match_type,
            start: window.start,
            span,
            match_count: window.match_count,
            processable_match_count: window.processable_match_count,
            token_match_score: window.token_match_score,
            text_score,
            label_score,
            match_score: text_score * label_score,
        })
    }

    /// The matched label
    pub fn label(&self) -> &Literal {
        &self.label
    }

    /// Number of tokens of the label
    pub fn label_token_count(&self) -> usize {
        self.label_token_count
    }

    /// Match confidence
    pub fn match_type(&self) -> MatchType {
        self.match_type
    }

    /// First matched token (section token index)
    pub fn start(&self) -> usize {
        self.start
    }

    /// Number of tokens covered
    pub fn span(&self) -> usize {
        self.span
    }

    /// Last covered token (section token index, inclusive)
    pub fn end(&self) -> usize {
        self.start + self.span - 1
    }

    /// Number of matched tokens
    pub fn match_count(&self) -> usize {
        self.match_count
    }

    /// Number of matched matchable tokens
    pub fn processable_match_count(&self) -> usize {
        self.processable_match_count
    }

    /// Average similarity of the matched tokens
    pub fn token_match_score(&self) -> f64 {
        self.token_match_score
    }

    /// Matched share of the covered text
    pub fn text_score(&self) -> f64 {
        self.text_score
    }

    /// Matched share of the label
    pub fn label_score(&self) -> f64 {
        self.label_score
    }

    /// `text_score * label_score`
    pub fn match_score(&self) -> f64 {
        self.match_score
    }

    /// Best first: match type, then match score, then match count
    pub fn best_first(a: &LabelMatch, b: &LabelMatch) -> std::cmp::Ordering {
        b.match_type
            .cmp(&a.match_type)
            .then_with(|| b.match_score.total_cmp(&a.match_score))
            .then_with(|| b.match_count.cmp(&a.match_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(span: usize, processable: usize, count: usize) -> MatchWindow {
        MatchWindow {
            start: 0,
            span,
            processable_match_count: processable,
            match_count: count,
            token_match_score: 1.0,
            window_matchable_count: processable,
            labels_covered: true,
            exact: false,
        }
    }

    fn label() -> Literal {
        Literal::new("Barack Obama", Some("en"))
    }

    #[test]
    fn test_invariant_violations_fail() {
        assert!(LabelMatch::new(label(), 2, window(2, 3, 2)).is_err());
        assert!(LabelMatch::new(label(), 2, window(1, 2, 2)).is_err());
        assert!(LabelMatch::new(label(), 2, window(0, 0, 0)).is_err());
        assert!(LabelMatch::new(label(), 0, window(2, 2, 2)).is_err());
        let mut bad_score = window(2, 2, 2);
        bad_score.token_match_score = 1.2;
        assert!(matches!(
            LabelMatch::new(label(), 2, bad_score),
            Err(LinkError::InvalidLabelMatch { .. })
        ));
    }

    #[test]
    fn test_span_widened_to_match_count() {
        let m = LabelMatch::new(label(), 3, window(2, 1, 3)).unwrap();
        assert_eq!(m.span(), 3);
        assert_eq!(m.end(), 2);
    }

    #[test]
    fn test_full_and_exact() {
        let m = LabelMatch::new(label(), 2, window(2, 2, 2)).unwrap();
        assert_eq!(m.match_type(), MatchType::Full);
        assert_eq!(m.text_score(), 1.0);
        assert_eq!(m.match_score(), 1.0);

        let mut exact = window(2, 2, 2);
        exact.exact = true;
        let m = LabelMatch::new(label(), 2, exact).unwrap();
        assert_eq!(m.match_type(), MatchType::Exact);
    }

    #[test]
    fn test_partial_scores() {
        // one of two label tokens matched by a single text token
        let mut partial = window(1, 1, 1);
        partial.labels_covered = false;
        let m = LabelMatch::new(Literal::plain("Paris France"), 2, partial).unwrap();
        assert_eq!(m.match_type(), MatchType::Partial);
        assert_eq!(m.text_score(), 1.0);
        assert_eq!(m.label_score(), 0.5);
        assert_eq!(m.match_score(), 0.5);
    }

    #[test]
    fn test_no_processable_match_is_none() {
        let m = LabelMatch::new(label(), 2, window(1, 0, 1)).unwrap();
        assert_eq!(m.match_type(), MatchType::None);
    }

    #[test]
    fn test_best_first_ordering() {
        let full = LabelMatch::new(label(), 2, window(2, 2, 2)).unwrap();
        let mut partial = window(1, 1, 1);
        partial.labels_covered = false;
        let partial = LabelMatch::new(label(), 2, partial).unwrap();
        let mut matches = vec![partial.clone(), full.clone()];
        matches.sort_by(LabelMatch::best_first);
        assert_eq!(matches, vec![full, partial]);
    }
}
