//! Linking configuration
//!
//! Configuration is plain serde data. Every struct uses `#[serde(default)]`,
//! so partial TOML files only need the values that differ from the defaults.

mod linker;
mod loader;
mod text_processing;

pub use linker::{LinkerConfig, RedirectMode, MIN_LOOKUP_LIMIT};
pub use loader::{embedded_default, DEFAULT_CONFIG_TOML};
pub use text_processing::TextProcessingConfig;

use crate::error::ConfigError;
use crate::lang::{primary_subtag, same_language};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Complete configuration of a linking run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkingConfig {
    /// Token and chunk classification, per language
    pub processing: LanguageProcessingConfig,
    /// Search and matching parameters
    pub linker: LinkerConfig,
}

impl LinkingConfig {
    /// Parse and validate a TOML configuration
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: LinkingConfig =
            toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Serialize to TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Validates every section of the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.processing.validate()?;
        self.linker.validate()
    }
}

/// Text processing configuration with per-language overrides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageProcessingConfig {
    /// Configuration for languages without an override
    pub default: TextProcessingConfig,
    /// Overrides by language tag; omitted fields take the built-in defaults
    pub languages: BTreeMap<String, TextProcessingConfig>,
    /// Languages whose script has no letter case
    pub unicase_languages: Vec<String>,
}

impl Default for LanguageProcessingConfig {
    fn default() -> Self {
        // every German noun is capitalised, so case says nothing about names
        let german = TextProcessingConfig {
            match_upper_case_tokens: false,
            ..Default::default()
        };
        Self {
            default: TextProcessingConfig::default(),
            languages: BTreeMap::from([("de".to_string(), german)]),
            unicase_languages: ["ar", "fa", "he", "hi", "ja", "ko", "th", "zh"]
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}

impl LanguageProcessingConfig {
    /// Configuration for `language`: exact tag, then primary subtag, then default
    pub fn for_language(&self, language: Option<&str>) -> &TextProcessingConfig {
        let Some(language) = language else {
            return &self.default;
        };
        self.lookup(language)
            .or_else(|| self.lookup(primary_subtag(language)))
            .unwrap_or(&self.default)
    }

    fn lookup(&self, language: &str) -> Option<&TextProcessingConfig> {
        self.languages
            .iter()
            .find(|(tag, _)| tag.eq_ignore_ascii_case(language))
            .map(|(_, config)| config)
    }

    /// `true` if `language` (or its primary subtag) has no letter case
    pub fn is_unicase(&self, language: Option<&str>) -> bool {
        let Some(language) = language else {
            return false;
        };
        let primary = primary_subtag(language);
        self.unicase_languages.iter().any(|l| {
            same_language(Some(l), Some(language)) || same_language(Some(l), Some(primary))
        })
    }

    /// Validates the default and every override
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.default.validate()?;
        self.languages.values().try_for_each(TextProcessingConfig::validate)
    }
}

pub(crate) fn check_probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    check_range(field, (0.0..=1.0).contains(&value), "must be within [0, 1]")
}

pub(crate) fn check_range(
    field: &'static str,
    ok: bool,
    reason: &str,
) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field,
            reason: reason.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_for_language_resolution() {
        let config = LanguageProcessingConfig::default();
        assert!(!config.for_language(Some("de-AT")).match_upper_case_tokens);
        assert!(!config.for_language(Some("DE")).match_upper_case_tokens);
        assert!(config.for_language(Some("en")).match_upper_case_tokens);
        assert!(config.for_language(None).match_upper_case_tokens);
    }

    #[test]
    fn test_unicase_languages() {
        let config = LanguageProcessingConfig::default();
        assert!(config.is_unicase(Some("zh-Hans")));
        assert!(config.is_unicase(Some("ja")));
        assert!(!config.is_unicase(Some("en")));
        assert!(!config.is_unicase(None));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = LinkingConfig::from_toml_str(
            r#"
            [linker]
            max_suggestions = 5
            redirect_mode = "follow"
            "#,
        )
        .unwrap();
        assert_eq!(config.linker.max_suggestions, 5);
        assert_eq!(config.linker.redirect_mode, RedirectMode::Follow);
        assert_eq!(config.linker.max_search_tokens, 3);
        assert_eq!(config.processing, LanguageProcessingConfig::default());
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        assert!(matches!(
            LinkingConfig::from_toml_str("[linker]\nmax_suggestions = \"many\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            LinkingConfig::from_toml_str("[linker]\nmin_text_score = 2.0"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[processing.default]\nmin_search_token_length = 4").unwrap();
        let config = LinkingConfig::from_file(file.path()).unwrap();
        assert_eq!(config.processing.default.min_search_token_length, 4);

        assert!(matches!(
            LinkingConfig::from_file("/nonexistent/kblink.toml"),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_toml_round_trip_of_default() {
        let toml = LinkingConfig::default().to_toml_string().unwrap();
        let parsed = LinkingConfig::from_toml_str(&toml).unwrap();
        assert_eq!(parsed, LinkingConfig::default());
    }
}
