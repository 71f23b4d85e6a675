//! Thresholds and category sets for token and chunk classification

use super::{check_probability, check_range};
use crate::error::ConfigError;
use crate::text::{LexicalCategory, PhraseTag, Pos, PosTag};
use serde::{Deserialize, Serialize};

/// Language-processing configuration used by section classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextProcessingConfig {
    /// Lexical categories of tokens that trigger a lookup
    pub linked_lexical_categories: Vec<LexicalCategory>,
    /// Fine grained POS types of tokens that trigger a lookup
    pub linked_pos: Vec<Pos>,
    /// Raw tagger tags of tokens that trigger a lookup
    pub linked_pos_tags: Vec<String>,
    /// Lexical categories of tokens usable as matching context
    pub matched_lexical_categories: Vec<LexicalCategory>,
    /// Fine grained POS types of tokens usable as matching context
    pub matched_pos: Vec<Pos>,
    /// Raw tagger tags of tokens usable as matching context
    pub matched_pos_tags: Vec<String>,
    /// Minimum probability for a POS annotation to include a token
    pub min_pos_annotation_probability: f64,
    /// Minimum probability for a POS annotation to exclude a token
    pub min_exclude_pos_annotation_probability: f64,
    /// Phrase categories of chunks that are processed
    pub processed_phrase_categories: Vec<LexicalCategory>,
    /// Raw chunker tags of chunks that are processed
    pub processed_phrase_tags: Vec<String>,
    /// Minimum probability for a phrase annotation to include a chunk
    pub min_phrase_annotation_probability: f64,
    /// Minimum probability for a phrase annotation to exclude a chunk
    pub min_exclude_phrase_annotation_probability: f64,
    /// Upper case tokens outside sub-sentence starts trigger lookups
    pub link_upper_case_tokens: bool,
    /// Upper case tokens outside sub-sentence starts are matching context
    pub match_upper_case_tokens: bool,
    /// Tokens without usable POS need upper case to be linkable
    pub link_only_upper_case_tokens_with_missing_pos: bool,
    /// Promote adjacent matchable tokens in a chunk to linkable
    pub link_multi_matchable_tokens_in_chunk: bool,
    /// Do not read chunks at all
    pub ignore_chunks: bool,
    /// Minimum length (chars) of a token without usable POS to be searched
    pub min_search_token_length: usize,
    /// POS types after which the next token starts a sub-sentence
    pub sub_sentence_start_pos: Vec<Pos>,
}

impl Default for TextProcessingConfig {
    fn default() -> Self {
        Self {
            linked_lexical_categories: vec![LexicalCategory::Noun, LexicalCategory::Residual],
            linked_pos: Vec::new(),
            linked_pos_tags: Vec::new(),
            matched_lexical_categories: vec![
                LexicalCategory::Noun,
                LexicalCategory::Residual,
                LexicalCategory::Adjective,
                LexicalCategory::Quantifier,
            ],
            matched_pos: Vec::new(),
            matched_pos_tags: Vec::new(),
            min_pos_annotation_probability: 0.75,
            min_exclude_pos_annotation_probability: 0.5,
            processed_phrase_categories: vec![LexicalCategory::Noun],
            processed_phrase_tags: Vec::new(),
            min_phrase_annotation_probability: 0.75,
            min_exclude_phrase_annotation_probability: 0.5,
            link_upper_case_tokens: false,
            match_upper_case_tokens: true,
            link_only_upper_case_tokens_with_missing_pos: false,
            link_multi_matchable_tokens_in_chunk: true,
            ignore_chunks: false,
            min_search_token_length: 3,
            sub_sentence_start_pos: vec![
                Pos::Quote,
                Pos::OpenQuote,
                Pos::OpenBracket,
                Pos::Colon,
                Pos::SemiColon,
                Pos::Dash,
            ],
        }
    }
}

impl TextProcessingConfig {
    /// `true` if the tag selects tokens that trigger a lookup
    pub fn is_linked(&self, tag: &PosTag) -> bool {
        tag.categories
            .iter()
            .any(|c| self.linked_lexical_categories.contains(c))
            || tag.pos.iter().any(|p| self.linked_pos.contains(p))
            || self.linked_pos_tags.contains(&tag.tag)
    }

    /// `true` if the tag selects tokens usable as matching context
    pub fn is_matched(&self, tag: &PosTag) -> bool {
        self.is_linked(tag)
            || tag
                .categories
                .iter()
                .any(|c| self.matched_lexical_categories.contains(c))
            || tag.pos.iter().any(|p| self.matched_pos.contains(p))
            || self.matched_pos_tags.contains(&tag.tag)
    }

    /// `true` if the phrase tag selects chunks to process
    pub fn is_processed_phrase(&self, tag: &PhraseTag) -> bool {
        tag.category
            .is_some_and(|c| self.processed_phrase_categories.contains(&c))
            || self.processed_phrase_tags.contains(&tag.tag)
    }

    /// `true` if a token with this tag opens a sub-sentence for the next token
    pub fn starts_sub_sentence(&self, tag: &PosTag) -> bool {
        tag.pos.iter().any(|p| self.sub_sentence_start_pos.contains(p))
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_probability(
            "min_pos_annotation_probability",
            self.min_pos_annotation_probability,
        )?;
        check_probability(
            "min_exclude_pos_annotation_probability",
            self.min_exclude_pos_annotation_probability,
        )?;
        check_probability(
            "min_phrase_annotation_probability",
            self.min_phrase_annotation_probability,
        )?;
        check_probability(
            "min_exclude_phrase_annotation_probability",
            self.min_exclude_phrase_annotation_probability,
        )?;
        check_range(
            "min_exclude_pos_annotation_probability",
            self.min_exclude_pos_annotation_probability <= self.min_pos_annotation_probability,
            "must not exceed min_pos_annotation_probability",
        )?;
        check_range(
            "min_exclude_phrase_annotation_probability",
            self.min_exclude_phrase_annotation_probability
                <= self.min_phrase_annotation_probability,
            "must not exceed min_phrase_annotation_probability",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_links_nouns() {
        let config = TextProcessingConfig::default();
        let nnp = PosTag::new("NNP")
            .with_category(LexicalCategory::Noun)
            .with_pos(Pos::ProperNoun);
        let jj = PosTag::new("JJ").with_category(LexicalCategory::Adjective);
        let vbd = PosTag::new("VBD").with_category(LexicalCategory::Verb);

        assert!(config.is_linked(&nnp));
        assert!(config.is_matched(&nnp));
        assert!(!config.is_linked(&jj));
        assert!(config.is_matched(&jj));
        assert!(!config.is_matched(&vbd));
    }

    #[test]
    fn test_raw_tags_are_honoured() {
        let config = TextProcessingConfig {
            linked_pos_tags: vec!["FM".to_string()],
            ..Default::default()
        };
        assert!(config.is_linked(&PosTag::new("FM")));
    }

    #[test]
    fn test_sub_sentence_start() {
        let config = TextProcessingConfig::default();
        let quote = PosTag::new("``").with_pos(Pos::OpenQuote);
        assert!(config.starts_sub_sentence(&quote));
        assert!(!config.starts_sub_sentence(&PosTag::new("NN")));
    }

    #[test]
    fn test_validate_rejects_inverted_thresholds() {
        let config = TextProcessingConfig {
            min_pos_annotation_probability: 0.4,
            min_exclude_pos_annotation_probability: 0.6,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(TextProcessingConfig::default().validate().is_ok());
    }
}
