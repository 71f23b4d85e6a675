use crate::config::TextProcessingConfig;
use crate::text::Token;

/// Classification of a single token within its section
#[derive(Debug, Clone, PartialEq)]
pub struct TokenData {
    /// Position within the section's token list
    pub index: usize,
    /// Start byte offset in the document
    pub start: usize,
    /// End byte offset in the document (exclusive)
    pub end: usize,
    /// Surface form
    pub text: String,
    /// Lemma from the best morphological annotation, if any
    pub lemma: Option<String>,
    /// The token triggers a vocabulary lookup
    pub is_linkable: bool,
    /// The token may be used as matching context
    pub is_matchable: bool,
    /// The token contains at least one letter or digit
    pub has_alpha_numeric: bool,
    /// The token starts with an upper case letter (never set for unicase languages)
    pub upper_case: bool,
    /// The token opens a sentence or sub-sentence
    pub is_sub_sentence_start: bool,
    /// Index of the enclosing processable chunk in the section's chunk list
    pub in_chunk: Option<usize>,
}

/// Outcome of the POS rules for one token
#[derive(Debug, Default, Clone, Copy)]
struct PosDecision {
    linkable: Option<bool>,
    matchable: Option<bool>,
}

impl TokenData {
    /// Classify `token`
    ///
    /// `in_chunk` and `is_sub_sentence_start` are decided by the section,
    /// which sees neighbouring spans.
    pub(crate) fn classify(
        index: usize,
        token: &Token,
        text: &str,
        is_sub_sentence_start: bool,
        in_chunk: Option<usize>,
        unicase: bool,
        config: &TextProcessingConfig,
    ) -> Self {
        let has_alpha_numeric = text.chars().any(char::is_alphanumeric);
        let upper_case = !unicase && text.chars().next().is_some_and(char::is_uppercase);
        let lemma = token
            .morpho
            .iter()
            .find_map(|m| m.value.lemma.clone())
            .filter(|l| !l.is_empty());

        let mut data = TokenData {
            index,
            start: token.start,
            end: token.end,
            text: text.to_string(),
            lemma,
            is_linkable: false,
            is_matchable: false,
            has_alpha_numeric,
            upper_case,
            is_sub_sentence_start,
            in_chunk,
        };
        if !has_alpha_numeric {
            return data;
        }

        let pos = Self::pos_decision(token, config);
        data.is_linkable = pos.linkable == Some(true);
        data.is_matchable = data.is_linkable || pos.matchable == Some(true);

        if !data.is_linkable && upper_case && !is_sub_sentence_start {
            if config.link_upper_case_tokens {
                data.is_linkable = true;
                data.is_matchable = true;
            } else if config.match_upper_case_tokens {
                data.is_matchable = true;
            }
        }

        if pos.linkable.is_none()
            && !data.is_linkable
            && text.chars().count() >= config.min_search_token_length
        {
            if config.link_only_upper_case_tokens_with_missing_pos && !unicase {
                data.is_linkable = upper_case;
                data.is_matchable = true;
            } else {
                data.is_linkable = true;
                data.is_matchable = true;
            }
        }
        data
    }

    fn pos_decision(token: &Token, config: &TextProcessingConfig) -> PosDecision {
        let mut decision = PosDecision::default();
        for annotation in &token.pos {
            let tag = &annotation.value;
            if annotation.reaches(config.min_pos_annotation_probability) {
                if config.is_linked(tag) {
                    decision.linkable = Some(true);
                    decision.matchable = Some(true);
                } else if config.is_matched(tag) {
                    decision.matchable = Some(true);
                }
            }
            if annotation.reaches(config.min_exclude_pos_annotation_probability) {
                if decision.linkable.is_none() && !config.is_linked(tag) {
                    decision.linkable = Some(false);
                }
                if decision.matchable.is_none() && !config.is_matched(tag) {
                    decision.matchable = Some(false);
                }
            }
        }
        decision
    }

    /// `true` if `token`'s POS opens a sub-sentence for the following token
    pub(crate) fn opens_sub_sentence(token: &Token, config: &TextProcessingConfig) -> bool {
        token.pos.iter().any(|a| {
            a.reaches(config.min_pos_annotation_probability) && config.starts_sub_sentence(&a.value)
        })
    }

    /// Text used for searching and matching
    pub fn search_text(&self, lemma_matching: bool) -> &str {
        match (&self.lemma, lemma_matching) {
            (Some(lemma), true) => lemma,
            _ => &self.text,
        }
    }
}
