//! Linker configuration: vocabulary fields, search window, thresholds

use super::{check_probability, check_range};
use crate::entity::{vocab, Iri};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lower bound of the lookup limit requested from the backend
pub const MIN_LOOKUP_LIMIT: usize = 10;

/// How redirects of suggested entities are processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectMode {
    /// Redirects are not looked at
    #[default]
    Ignore,
    /// Values of the redirect targets are merged into the suggestion
    AddValues,
    /// The redirect target replaces the suggested entity
    Follow,
}

/// Linker configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkerConfig {
    /// Property holding entity labels
    pub name_field: Iri,
    /// Property holding entity types
    pub type_field: Iri,
    /// Property holding redirect targets
    pub redirect_field: Iri,
    /// Language of labels also searched in addition to the document language
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_language: Option<String>,
    /// Maximum number of tokens in a search window
    pub max_search_tokens: usize,
    /// Maximum distance (in tokens) of window tokens from the current token
    pub max_search_distance: usize,
    /// Maximum number of suggestions kept per occurrence
    pub max_suggestions: usize,
    /// Keep suggestions beyond `max_suggestions` that tie with the last kept
    pub include_suggestions_with_similar_score: bool,
    /// Suggestions matching fewer tokens than the best are dropped below this count
    pub min_found_tokens: usize,
    /// Minimum character similarity for two tokens to match
    pub min_token_match_factor: f64,
    /// Consecutive non-matching matchable tokens tolerated inside a label match
    pub max_not_found: usize,
    /// Minimum share of label tokens that must be matched
    pub min_label_score: f64,
    /// Minimum share of the matched text span that must be matched
    pub min_text_score: f64,
    /// Minimum product of label and text score
    pub min_match_score: f64,
    /// Minimum share of a processable chunk's matchable tokens covered by a match
    pub min_chunk_match_score: f64,
    /// Compare tokens and labels case-sensitively
    pub case_sensitive: bool,
    /// Match labels against token lemmas when available
    pub lemma_matching: bool,
    /// Redirect processing mode
    pub redirect_mode: RedirectMode,
    /// Maps entity types onto the types reported for linked entities
    pub type_mappings: BTreeMap<Iri, Iri>,
    /// Type reported when no suggestion carries a type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_type: Option<Iri>,
    /// If non-empty, only candidates with one of these types are considered
    pub allowed_types: Vec<Iri>,
    /// Candidates with one of these types are never suggested
    pub denied_types: Vec<Iri>,
    /// Separate equal scores by entity ranking
    pub rank_equal_scores_by_entity_ranking: bool,
    /// Upper bound of the score adjustment applied by ranking
    pub max_rank_adjustment: f64,
    /// Overrides the computed lookup limit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookup_limit: Option<usize>,
}

impl Default for LinkerConfig {
    fn default() -> Self {
        Self {
            name_field: Iri::new(vocab::RDFS_LABEL),
            type_field: Iri::new(vocab::RDF_TYPE),
            redirect_field: Iri::new(vocab::RDFS_SEE_ALSO),
            default_language: None,
            max_search_tokens: 3,
            max_search_distance: 3,
            max_suggestions: 3,
            include_suggestions_with_similar_score: true,
            min_found_tokens: 2,
            min_token_match_factor: 0.7,
            max_not_found: 1,
            min_label_score: 0.75,
            min_text_score: 0.4,
            min_match_score: 0.3,
            min_chunk_match_score: 0.51,
            case_sensitive: false,
            lemma_matching: false,
            redirect_mode: RedirectMode::Ignore,
            type_mappings: BTreeMap::new(),
            default_type: None,
            allowed_types: Vec::new(),
            denied_types: Vec::new(),
            rank_equal_scores_by_entity_ranking: true,
            max_rank_adjustment: 0.1,
            lookup_limit: None,
        }
    }
}

impl LinkerConfig {
    /// Preset accepting only labels that are matched completely
    pub fn strict() -> Self {
        Self {
            min_token_match_factor: 0.9,
            max_not_found: 0,
            min_label_score: 1.0,
            min_text_score: 0.75,
            min_match_score: 0.75,
            include_suggestions_with_similar_score: false,
            ..Default::default()
        }
    }

    /// Preset tolerating loose matches, e.g. for noisy text
    pub fn lenient() -> Self {
        Self {
            max_search_tokens: 5,
            min_token_match_factor: 0.6,
            max_not_found: 2,
            min_label_score: 0.5,
            min_text_score: 0.3,
            min_match_score: 0.2,
            min_chunk_match_score: 0.4,
            ..Default::default()
        }
    }

    /// Number of candidates requested per lookup
    ///
    /// `max(10, 5 * max_suggestions)` unless overridden, capped by the
    /// backend's own limit.
    pub fn effective_lookup_limit(&self, backend_limit: Option<usize>) -> usize {
        let limit = self
            .lookup_limit
            .unwrap_or_else(|| MIN_LOOKUP_LIMIT.max(self.max_suggestions * 5));
        match backend_limit {
            Some(backend) => limit.min(backend),
            None => limit,
        }
    }

    /// Properties requested from the backend for every candidate
    pub fn selected_fields(&self) -> Vec<Iri> {
        let mut fields = vec![self.name_field.clone(), self.type_field.clone()];
        if self.redirect_mode != RedirectMode::Ignore {
            fields.push(self.redirect_field.clone());
        }
        fields
    }

    /// Maps `entity_type` through `type_mappings`; unmapped types are kept
    pub fn map_type<'a>(&'a self, entity_type: &'a Iri) -> &'a Iri {
        self.type_mappings.get(entity_type).unwrap_or(entity_type)
    }

    /// `true` if candidates with these types may be suggested
    pub fn accepts_types<'a>(&self, types: impl IntoIterator<Item = &'a Iri>) -> bool {
        if self.allowed_types.is_empty() && self.denied_types.is_empty() {
            return true;
        }
        let types: Vec<&Iri> = types.into_iter().collect();
        if types.iter().any(|t| self.denied_types.contains(t)) {
            return false;
        }
        self.allowed_types.is_empty() || types.iter().any(|t| self.allowed_types.contains(t))
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range(
            "max_search_tokens",
            self.max_search_tokens >= 1,
            "must be at least 1",
        )?;
        check_range(
            "max_suggestions",
            self.max_suggestions >= 1,
            "must be at least 1",
        )?;
        check_range(
            "min_found_tokens",
            self.min_found_tokens >= 1,
            "must be at least 1",
        )?;
        check_range(
            "lookup_limit",
            self.lookup_limit != Some(0),
            "must be at least 1",
        )?;
        check_probability("min_token_match_factor", self.min_token_match_factor)?;
        check_probability("min_label_score", self.min_label_score)?;
        check_probability("min_text_score", self.min_text_score)?;
        check_probability("min_match_score", self.min_match_score)?;
        check_probability("min_chunk_match_score", self.min_chunk_match_score)?;
        check_probability("max_rank_adjustment", self.max_rank_adjustment)?;
        check_range(
            "min_token_match_factor",
            self.min_token_match_factor > 0.0,
            "must be greater than 0",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_limit() {
        let config = LinkerConfig::default();
        assert_eq!(config.effective_lookup_limit(None), 15);
        assert_eq!(config.effective_lookup_limit(Some(7)), 7);

        let config = LinkerConfig {
            max_suggestions: 1,
            ..Default::default()
        };
        assert_eq!(config.effective_lookup_limit(None), MIN_LOOKUP_LIMIT);

        let config = LinkerConfig {
            lookup_limit: Some(50),
            ..Default::default()
        };
        assert_eq!(config.effective_lookup_limit(Some(100)), 50);
    }

    #[test]
    fn test_selected_fields_include_redirects_only_when_processed() {
        let mut config = LinkerConfig::default();
        assert_eq!(config.selected_fields().len(), 2);
        config.redirect_mode = RedirectMode::Follow;
        assert!(config.selected_fields().contains(&config.redirect_field));
    }

    #[test]
    fn test_type_filters() {
        let place = Iri::new("urn:Place");
        let person = Iri::new("urn:Person");
        let config = LinkerConfig {
            allowed_types: vec![place.clone()],
            ..Default::default()
        };
        assert!(config.accepts_types([&place]));
        assert!(!config.accepts_types([&person]));
        assert!(!config.accepts_types(std::iter::empty()));

        let config = LinkerConfig {
            denied_types: vec![person.clone()],
            ..Default::default()
        };
        assert!(config.accepts_types(std::iter::empty()));
        assert!(!config.accepts_types([&place, &person]));
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(LinkerConfig::strict().validate().is_ok());
        assert!(LinkerConfig::lenient().validate().is_ok());
        assert!(LinkerConfig::strict().min_label_score > LinkerConfig::lenient().min_label_score);
    }

    #[test]
    fn test_validate() {
        assert!(LinkerConfig::default().validate().is_ok());
        let config = LinkerConfig {
            min_label_score: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                field: "min_label_score",
                ..
            })
        ));
        let config = LinkerConfig {
            max_suggestions: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
