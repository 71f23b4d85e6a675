//! Linguistic annotations attached to tokens and chunks

use serde::{Deserialize, Serialize};

/// An annotation value together with its confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotated<T> {
    /// The annotated value
    pub value: T,
    /// Probability in `[0, 1]`; `None` when the annotator does not report one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
}

impl<T> Annotated<T> {
    /// Annotation with a known probability
    pub fn new(value: T, probability: f64) -> Self {
        Self {
            value,
            probability: Some(probability),
        }
    }

    /// Annotation with unknown probability
    pub fn unknown(value: T) -> Self {
        Self {
            value,
            probability: None,
        }
    }

    /// `true` if the probability is unknown or at least `threshold`
    pub fn reaches(&self, threshold: f64) -> bool {
        self.probability.map_or(true, |p| p >= threshold)
    }
}

/// Coarse grained lexical categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LexicalCategory {
    Noun,
    Verb,
    Adjective,
    Adposition,
    Adverb,
    Conjunction,
    Interjection,
    PronounOrDeterminer,
    Punctuation,
    Quantifier,
    Residual,
    Unique,
}

/// Fine grained part-of-speech types the linker cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pos {
    ProperNoun,
    CommonNoun,
    Numeral,
    Quote,
    OpenQuote,
    CloseQuote,
    OpenBracket,
    CloseBracket,
    Colon,
    SemiColon,
    Hyphen,
    Dash,
    Comma,
    Point,
}

/// A part-of-speech tag as produced by a tagger, mapped onto categories
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PosTag {
    /// Tag as emitted by the tagger (e.g. `NNP`)
    pub tag: String,
    /// Lexical categories the tag belongs to
    #[serde(default)]
    pub categories: Vec<LexicalCategory>,
    /// Fine grained types of the tag
    #[serde(default)]
    pub pos: Vec<Pos>,
}

impl PosTag {
    /// Create a tag without category information
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            categories: Vec::new(),
            pos: Vec::new(),
        }
    }

    /// Add a lexical category
    pub fn with_category(mut self, category: LexicalCategory) -> Self {
        self.categories.push(category);
        self
    }

    /// Add a fine grained type
    pub fn with_pos(mut self, pos: Pos) -> Self {
        self.pos.push(pos);
        self
    }
}

/// A phrase (chunk) tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseTag {
    /// Tag as emitted by the chunker (e.g. `NP`)
    pub tag: String,
    /// Category of the phrase head, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<LexicalCategory>,
}

impl PhraseTag {
    /// Create a phrase tag
    pub fn new(tag: impl Into<String>, category: Option<LexicalCategory>) -> Self {
        Self {
            tag: tag.into(),
            category,
        }
    }
}

/// Morphological analysis of a token
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MorphoFeatures {
    /// Dictionary base form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lemma: Option<String>,
}

impl MorphoFeatures {
    /// Features carrying only a lemma
    pub fn lemma(lemma: impl Into<String>) -> Self {
        Self {
            lemma: Some(lemma.into()),
        }
    }
}
