use super::{
    normalize_token, token_similarity, LabelMatch, MatchWindow, OUT_OF_ORDER_MATCH_FACTOR,
};
use crate::config::LinkerConfig;
use crate::entity::{Entity, Literal};
use crate::error::Result;
use crate::lang::same_language;
use crate::section::TokenData;
use crate::state::ProcessingState;
use crate::tokenizer::LabelTokenizer;
use smallvec::SmallVec;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

/// Aligns candidate labels with the search window of the current token
///
/// One matcher serves one document; languages without a tokenizer are
/// reported once.
pub struct LabelMatcher<'c> {
    config: &'c LinkerConfig,
    tokenizer: &'c dyn LabelTokenizer,
    untokenized: RefCell<HashSet<Option<String>>>,
}

/// Label tokens after normalisation
struct LabelTokens {
    tokens: Vec<String>,
    positions: HashMap<String, SmallVec<[usize; 2]>>,
}

impl LabelTokens {
    fn new(tokens: Vec<String>) -> Self {
        let mut positions: HashMap<String, SmallVec<[usize; 2]>> = HashMap::new();
        for (i, token) in tokens.iter().enumerate() {
            positions.entry(token.clone()).or_default().push(i);
        }
        Self { tokens, positions }
    }

    fn len(&self) -> usize {
        self.tokens.len()
    }

    /// First unmatched position holding exactly `text`
    fn unmatched_position(&self, text: &str, matched: &[bool]) -> Option<usize> {
        self.positions
            .get(text)?
            .iter()
            .copied()
            .find(|&p| !matched[p])
    }
}

/// Running totals of one alignment
#[derive(Default)]
struct Alignment {
    matched_labels: Vec<bool>,
    match_count: usize,
    processable_match_count: usize,
    factor_sum: f64,
    first_token: usize,
    last_token: usize,
}

impl Alignment {
    fn record(&mut self, token: &TokenData, label_position: usize, factor: f64) {
        self.matched_labels[label_position] = true;
        self.match_count += 1;
        if token.is_matchable {
            self.processable_match_count += 1;
        }
        self.factor_sum += factor;
        self.first_token = self.first_token.min(token.index);
        self.last_token = self.last_token.max(token.index);
    }
}

impl<'c> LabelMatcher<'c> {
    /// Create a matcher
    pub fn new(config: &'c LinkerConfig, tokenizer: &'c dyn LabelTokenizer) -> Self {
        Self {
            config,
            tokenizer,
            untokenized: RefCell::new(HashSet::new()),
        }
    }

    /// Best label matches of `entity`, searching the language buckets in order
    ///
    /// A bucket is only consulted when every higher priority bucket produced
    /// no match. Matches are returned best first.
    pub fn match_entity(
        &self,
        state: &ProcessingState<'_>,
        window: &[usize],
        entity: &Entity,
        languages: &[Option<String>],
    ) -> Result<Vec<LabelMatch>> {
        for language in languages {
            let mut matches = Vec::new();
            for label in entity
                .text(&self.config.name_field)
                .filter(|l| same_language(l.language(), language.as_deref()))
            {
                if let Some(label_match) = self.match_label(state, window, label)? {
                    log::trace!(
                        "{} label '{}': {:?} text={:.3} label={:.3}",
                        entity.id(),
                        label.text,
                        label_match.match_type(),
                        label_match.text_score(),
                        label_match.label_score()
                    );
                    matches.push(label_match);
                }
            }
            if !matches.is_empty() {
                matches.sort_by(LabelMatch::best_first);
                return Ok(matches);
            }
        }
        Ok(Vec::new())
    }

    fn label_tokens(&self, label: &Literal) -> LabelTokens {
        let raw = match self.tokenizer.tokenize(&label.text, label.language()) {
            Some(tokens) => tokens,
            None => {
                let language = label.language.clone();
                if self.untokenized.borrow_mut().insert(language) {
                    log::warn!(
                        "no label tokenizer for language {:?}; matching labels as a single token",
                        label.language()
                    );
                }
                vec![label.text.clone()]
            }
        };
        let tokens = raw
            .iter()
            .filter(|t| t.chars().any(char::is_alphanumeric))
            .map(|t| normalize_token(t, self.config.case_sensitive))
            .filter(|t| !t.is_empty())
            .collect();
        LabelTokens::new(tokens)
    }

    /// Align `label` with the tokens around the current token
    ///
    /// `window` holds the section token indices of the search window in text
    /// order. Returns `None` unless the label matches at least one matchable
    /// token and clears the configured score minimums.
    pub fn match_label(
        &self,
        state: &ProcessingState<'_>,
        window: &[usize],
        label: &Literal,
    ) -> Result<Option<LabelMatch>> {
        let Some(current) = state.token_index() else {
            return Ok(None);
        };
        let tokens = state.tokens();
        let label_tokens = self.label_tokens(label);
        if label_tokens.tokens.is_empty() {
            return Ok(None);
        }

        let mut alignment = Alignment {
            matched_labels: vec![false; label_tokens.len()],
            first_token: current,
            last_token: current,
            ..Default::default()
        };
        let first_label = self.scan_forward(tokens, current, window, &label_tokens, &mut alignment);
        if let Some(first_label) = first_label {
            self.scan_backward(
                tokens,
                current,
                state.consumed_index(),
                first_label,
                &label_tokens,
                &mut alignment,
            );
        }
        if alignment.processable_match_count == 0 {
            return Ok(None);
        }

        let (first, last) = (alignment.first_token, alignment.last_token);
        let chunk_covered = match self.chunk_coverage(state, current, first, last) {
            Some(coverage) if coverage < self.config.min_chunk_match_score => return Ok(None),
            Some(coverage) => coverage >= 1.0,
            None => true,
        };

        let window_matchable_count = tokens[first..=last]
            .iter()
            .filter(|t| t.is_matchable)
            .count();
        let labels_covered = alignment.matched_labels.iter().all(|m| *m);
        let full = alignment.processable_match_count >= window_matchable_count && labels_covered;
        let exact = full && chunk_covered && {
            let covered = state
                .document()
                .span_text(tokens[first].start, tokens[last].end);
            if self.config.case_sensitive {
                covered == label.text
            } else {
                covered.to_lowercase() == label.text.to_lowercase()
            }
        };

        let label_match = LabelMatch::new(
            label.clone(),
            label_tokens.len(),
            MatchWindow {
                start: first,
                span: last - first + 1,
                processable_match_count: alignment.processable_match_count,
                match_count: alignment.match_count,
                token_match_score: alignment.factor_sum / alignment.match_count as f64,
                window_matchable_count,
                labels_covered,
                exact,
            },
        )?;
        let accepted = label_match.label_score() >= self.config.min_label_score
            && label_match.text_score() >= self.config.min_text_score
            && label_match.match_score() >= self.config.min_match_score;
        Ok(accepted.then_some(label_match))
    }

    fn token_text(&self, token: &TokenData) -> String {
        normalize_token(
            token.search_text(self.config.lemma_matching),
            self.config.case_sensitive,
        )
    }

    /// Forward scan from the current token; returns the lowest label position
    /// matched in label order
    fn scan_forward(
        &self,
        tokens: &[TokenData],
        current: usize,
        window: &[usize],
        label: &LabelTokens,
        alignment: &mut Alignment,
    ) -> Option<usize> {
        let mut first_label: Option<usize> = None;
        let mut next_label = 0;
        let mut not_found = 0;
        for token in &tokens[current..] {
            if !token.has_alpha_numeric {
                continue;
            }
            let text = self.token_text(token);
            let ordered = (next_label..label.len())
                .filter(|&p| !alignment.matched_labels[p])
                .find_map(|p| {
                    token_similarity(&text, &label.tokens[p], self.config.min_token_match_factor)
                        .map(|factor| (p, factor))
                });
            if let Some((position, factor)) = ordered {
                alignment.record(token, position, factor);
                first_label = Some(first_label.map_or(position, |f| f.min(position)));
                next_label = position + 1;
                not_found = 0;
            } else if let Some(position) = label.unmatched_position(&text, &alignment.matched_labels)
            {
                alignment.record(token, position, OUT_OF_ORDER_MATCH_FACTOR);
                not_found = 0;
            } else {
                if token.is_matchable || !window.contains(&token.index) {
                    break;
                }
                not_found += 1;
                if not_found > self.config.max_not_found {
                    break;
                }
            }
        }
        first_label
    }

    /// Backward scan for label tokens before `first_label`, stopping at the
    /// consumed index
    fn scan_backward(
        &self,
        tokens: &[TokenData],
        current: usize,
        consumed: isize,
        first_label: usize,
        label: &LabelTokens,
        alignment: &mut Alignment,
    ) {
        let mut upper = first_label;
        let mut not_found = 0;
        for token in tokens[..current].iter().rev() {
            if upper == 0 || token.index as isize <= consumed {
                break;
            }
            if !token.has_alpha_numeric {
                continue;
            }
            let text = self.token_text(token);
            let found = (0..upper)
                .rev()
                .filter(|&p| !alignment.matched_labels[p])
                .find_map(|p| {
                    token_similarity(&text, &label.tokens[p], self.config.min_token_match_factor)
                        .map(|factor| (p, factor))
                });
            match found {
                Some((position, factor)) => {
                    alignment.record(token, position, factor);
                    upper = position;
                    not_found = 0;
                }
                None => {
                    if token.is_matchable {
                        break;
                    }
                    not_found += 1;
                    if not_found > self.config.max_not_found {
                        break;
                    }
                }
            }
        }
    }

    /// Share of the current token's chunk matchable tokens inside `first..=last`
    fn chunk_coverage(
        &self,
        state: &ProcessingState<'_>,
        current: usize,
        first: usize,
        last: usize,
    ) -> Option<f64> {
        if state.config().ignore_chunks {
            return None;
        }
        let section = state.section()?;
        let index = section.tokens()[current].in_chunk?;
        let chunk = section.chunks().get(index)?;
        let (Some(lo), Some(hi)) = (chunk.matchable_start, chunk.matchable_end) else {
            return None;
        };
        let covered = (lo.max(first)..=hi.min(last))
            .filter(|&i| section.tokens()[i].is_matchable)
            .count();
        Some(covered as f64 / section.chunk_matchable_count(index) as f64)
    }
}

impl std::fmt::Debug for LabelMatcher<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelMatcher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TextProcessingConfig;
    use crate::matching::MatchType;
    use crate::text::{Annotated, AnalysedText, LexicalCategory, PhraseTag, PosTag, TextBuilder};
    use crate::tokenizer::{SimpleLabelTokenizer, TokenizerTable};

    fn nnp() -> Option<PosTag> {
        Some(PosTag::new("NNP").with_category(LexicalCategory::Noun))
    }

    fn tag(tag: &str, category: LexicalCategory) -> Option<PosTag> {
        Some(PosTag::new(tag).with_category(category))
    }

    fn obama() -> AnalysedText {
        TextBuilder::new()
            .language("en")
            .token("Barack", nnp())
            .token("Obama", nnp())
            .token("visited", tag("VBD", LexicalCategory::Verb))
            .token("Paris", nnp())
            .token(".", tag(".", LexicalCategory::Punctuation))
            .build()
    }

    /// Advance `state` to the token with `text`
    fn seek(state: &mut ProcessingState<'_>, text: &str) {
        while state.next() {
            if state.token().unwrap().text == text {
                return;
            }
        }
        panic!("token {text} not found");
    }

    fn match_label(
        text: &AnalysedText,
        at: &str,
        window: &[usize],
        label: &str,
        config: &LinkerConfig,
    ) -> Option<LabelMatch> {
        let processing = TextProcessingConfig::default();
        let mut state = ProcessingState::new(text, &processing, false);
        seek(&mut state, at);
        let tokenizer = SimpleLabelTokenizer;
        let matcher = LabelMatcher::new(config, &tokenizer);
        matcher
            .match_label(&state, window, &Literal::new(label, Some("en")))
            .unwrap()
    }

    #[test]
    fn test_exact_two_token_match() {
        let text = obama();
        let config = LinkerConfig::default();
        let m = match_label(&text, "Barack", &[0, 1], "Barack Obama", &config).unwrap();
        assert_eq!(m.match_type(), MatchType::Exact);
        assert_eq!((m.start(), m.end()), (0, 1));
        assert_eq!(m.match_score(), 1.0);
    }

    #[test]
    fn test_case_insensitive_full_vs_exact() {
        let text = obama();
        let config = LinkerConfig::default();
        let m = match_label(&text, "Barack", &[0, 1], "barack obama", &config).unwrap();
        assert_eq!(m.match_type(), MatchType::Exact);

        // case-sensitive comparison still aligns the tokens fuzzily
        let config = LinkerConfig {
            case_sensitive: true,
            ..Default::default()
        };
        let m = match_label(&text, "Barack", &[0, 1], "barack obama", &config).unwrap();
        assert_eq!(m.match_type(), MatchType::Full);
    }

    #[test]
    fn test_fuzzy_match_is_full() {
        let text = obama();
        let config = LinkerConfig::default();
        let m = match_label(&text, "Barack", &[0, 1], "Barack Obamas", &config).unwrap();
        assert_eq!(m.match_type(), MatchType::Full);
        assert!(m.token_match_score() < 1.0);
    }

    #[test]
    fn test_unrelated_label_does_not_match() {
        let text = obama();
        let config = LinkerConfig::default();
        assert!(match_label(&text, "Barack", &[0, 1], "Paris", &config).is_none());
    }

    #[test]
    fn test_label_with_uncovered_token_is_partial() {
        let text = obama();
        let config = LinkerConfig {
            min_label_score: 0.4,
            min_match_score: 0.3,
            ..Default::default()
        };
        let m = match_label(&text, "Paris", &[3], "Paris, France", &config).unwrap();
        assert_eq!(m.match_type(), MatchType::Partial);
        assert_eq!(m.label_score(), 0.5);
        assert!(m.match_score() < 1.0);

        // default minimum label score rejects it
        assert!(match_label(&text, "Paris", &[3], "Paris, France", &LinkerConfig::default()).is_none());
    }

    #[test]
    fn test_swapped_name_order_matches_out_of_order() {
        let text = obama();
        let config = LinkerConfig::default();
        let m = match_label(&text, "Barack", &[0, 1], "Obama, Barack", &config).unwrap();
        assert_eq!(m.match_count(), 2);
        assert_eq!((m.start(), m.end()), (0, 1));
        assert_eq!(m.match_type(), MatchType::Full);
        assert!((m.token_match_score() - 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_backward_scan_before_current_token() {
        let text = obama();
        let config = LinkerConfig::default();
        let m = match_label(&text, "Obama", &[0, 1], "Barack Obama", &config).unwrap();
        assert_eq!(m.match_count(), 2);
        assert_eq!(m.start(), 0);
        assert_eq!(m.match_type(), MatchType::Exact);
    }

    #[test]
    fn test_chunk_coverage_rejects_partial_phrase() {
        let text = TextBuilder::new()
            .language("en")
            .token("Bank", nnp())
            .token("of", tag("IN", LexicalCategory::Adposition))
            .token("America", nnp())
            .token("Corporation", nnp())
            .chunk(
                0,
                3,
                Some(Annotated::unknown(PhraseTag::new("NP", Some(LexicalCategory::Noun)))),
            )
            .build();
        let config = LinkerConfig::default();
        // "America" alone covers one of three matchable chunk tokens
        assert!(match_label(&text, "America", &[2, 3], "America", &config).is_none());

        let m = match_label(&text, "Bank", &[0, 2, 3], "Bank of America", &config).unwrap();
        assert_eq!(m.match_count(), 3);
        assert_eq!(m.processable_match_count(), 2);
        // "Corporation" stays uncovered, so the match cannot be exact
        assert_eq!(m.match_type(), MatchType::Full);
    }

    #[test]
    fn test_language_buckets() {
        let text = obama();
        let config = LinkerConfig::default();
        let processing = TextProcessingConfig::default();
        let mut state = ProcessingState::new(&text, &processing, false);
        seek(&mut state, "Paris");
        let tokenizer = TokenizerTable::with_defaults();
        let matcher = LabelMatcher::new(&config, &tokenizer);
        let entity = Entity::new("urn:paris")
            .with_text(&config.name_field, Literal::new("Parigi", Some("it")))
            .with_text(&config.name_field, Literal::plain("Paris"));

        let languages = crate::lang::language_buckets(Some("en"), None);
        let matches = matcher.match_entity(&state, &[3], &entity, &languages).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].label().text, "Paris");

        let only_english = vec![Some("en".to_string())];
        assert!(matcher
            .match_entity(&state, &[3], &entity, &only_english)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_missing_tokenizer_matches_whole_label() {
        let text = obama();
        let config = LinkerConfig::default();
        let processing = TextProcessingConfig::default();
        let mut state = ProcessingState::new(&text, &processing, false);
        seek(&mut state, "Paris");
        let tokenizer = TokenizerTable::new();
        let matcher = LabelMatcher::new(&config, &tokenizer);
        let m = matcher
            .match_label(&state, &[3], &Literal::new("Paris", Some("en")))
            .unwrap()
            .unwrap();
        assert_eq!(m.match_type(), MatchType::Exact);
        assert!(matcher
            .match_label(&state, &[3], &Literal::new("Paris France", Some("en")))
            .unwrap()
            .is_none());
    }
}
