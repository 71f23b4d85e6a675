//! Label tokenization
//!
//! Labels are split into tokens before they are aligned with the text.
//! Tokenizers are looked up in a [`TokenizerTable`] by language; a tokenizer
//! that does not support a language returns `None`.

use crate::lang::primary_subtag;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Key of tokenizers that apply to every language
pub const ANY_LANGUAGE: &str = "*";

/// Splits labels into tokens
pub trait LabelTokenizer: Send + Sync {
    /// Tokens of `label`, or `None` if `language` is not supported
    fn tokenize(&self, label: &str, language: Option<&str>) -> Option<Vec<String>>;
}

/// Whitespace tokenizer that splits leading and trailing punctuation off
/// each word; supports every language
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleLabelTokenizer;

impl LabelTokenizer for SimpleLabelTokenizer {
    fn tokenize(&self, label: &str, _language: Option<&str>) -> Option<Vec<String>> {
        let mut tokens = Vec::new();
        for word in label.split_whitespace() {
            let core = word.trim_matches(|c: char| !c.is_alphanumeric());
            if core.is_empty() {
                tokens.push(word.to_string());
                continue;
            }
            let lead = word.len() - word.trim_start_matches(|c: char| !c.is_alphanumeric()).len();
            let tail_start = lead + core.len();
            if lead > 0 {
                tokens.push(word[..lead].to_string());
            }
            tokens.push(core.to_string());
            if tail_start < word.len() {
                tokens.push(word[tail_start..].to_string());
            }
        }
        Some(tokens)
    }
}

/// Tokenizer extracting every match of a regular expression
#[derive(Debug, Clone)]
pub struct PatternLabelTokenizer {
    pattern: Regex,
    languages: Vec<String>,
}

impl PatternLabelTokenizer {
    /// Tokenizer for `languages`; an empty list supports every language
    pub fn new(pattern: &str, languages: &[&str]) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            languages: languages.iter().map(|l| l.to_string()).collect(),
        })
    }

    fn supports(&self, language: Option<&str>) -> bool {
        if self.languages.is_empty() {
            return true;
        }
        language.is_some_and(|language| {
            let primary = primary_subtag(language);
            self.languages
                .iter()
                .any(|l| l.eq_ignore_ascii_case(language) || l.eq_ignore_ascii_case(primary))
        })
    }
}

impl LabelTokenizer for PatternLabelTokenizer {
    fn tokenize(&self, label: &str, language: Option<&str>) -> Option<Vec<String>> {
        self.supports(language).then(|| {
            self.pattern
                .find_iter(label)
                .map(|m| m.as_str().to_string())
                .collect()
        })
    }
}

/// Ordered tokenizers per language
///
/// Resolution tries the exact language tag, then its primary subtag, then
/// the [`ANY_LANGUAGE`] entry; the first tokenizer returning tokens wins.
#[derive(Clone, Default)]
pub struct TokenizerTable {
    tokenizers: BTreeMap<String, Vec<Arc<dyn LabelTokenizer>>>,
}

impl TokenizerTable {
    /// Empty table; every label is unsupported
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with [`SimpleLabelTokenizer`] for every language
    pub fn with_defaults() -> Self {
        Self::new().register(ANY_LANGUAGE, Arc::new(SimpleLabelTokenizer))
    }

    /// Append a tokenizer for `language` (or [`ANY_LANGUAGE`])
    pub fn register(mut self, language: &str, tokenizer: Arc<dyn LabelTokenizer>) -> Self {
        self.tokenizers
            .entry(language.to_ascii_lowercase())
            .or_default()
            .push(tokenizer);
        self
    }

    /// Languages with registered tokenizers
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.tokenizers.keys().map(String::as_str)
    }

    fn candidates(&self, language: Option<&str>) -> Vec<&Arc<dyn LabelTokenizer>> {
        let mut keys: Vec<String> = Vec::with_capacity(3);
        if let Some(language) = language {
            keys.push(language.to_ascii_lowercase());
            let primary = primary_subtag(language).to_ascii_lowercase();
            if !keys.contains(&primary) {
                keys.push(primary);
            }
        }
        keys.push(ANY_LANGUAGE.to_string());
        keys.iter()
            .filter_map(|k| self.tokenizers.get(k))
            .flatten()
            .collect()
    }
}

impl LabelTokenizer for TokenizerTable {
    fn tokenize(&self, label: &str, language: Option<&str>) -> Option<Vec<String>> {
        self.candidates(language)
            .into_iter()
            .find_map(|t| t.tokenize(label, language))
    }
}

impl std::fmt::Debug for TokenizerTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.tokenizers.iter().map(|(k, v)| (k, v.len())))
            .finish()
    }
}
