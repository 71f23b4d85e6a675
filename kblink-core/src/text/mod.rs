//! Analysed-text model consumed by the linker
//!
//! Tokens, chunks and sentences are produced by an upstream NLP pipeline. The
//! linker only reads them: offsets are byte offsets into [`AnalysedText::text`].

pub mod annotation;
mod builder;

pub use annotation::{Annotated, LexicalCategory, MorphoFeatures, PhraseTag, Pos, PosTag};
pub use builder::TextBuilder;

use crate::error::{LinkError, Result};
use serde::{Deserialize, Serialize};

/// Half-open byte range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpanRange {
    /// Inclusive start offset
    pub start: usize,
    /// Exclusive end offset
    pub end: usize,
}

impl SpanRange {
    /// Create a range
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// `true` if `other` lies within this range
    pub fn encloses(&self, start: usize, end: usize) -> bool {
        start >= self.start && end <= self.end
    }
}

/// A token with its annotations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Start byte offset
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
    /// Part-of-speech annotations, best first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pos: Vec<Annotated<PosTag>>,
    /// Morphological annotations, best first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub morpho: Vec<Annotated<MorphoFeatures>>,
}

impl Token {
    /// Create an unannotated token
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            pos: Vec::new(),
            morpho: Vec::new(),
        }
    }
}

/// A phrase-level grouping of tokens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Start byte offset
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
    /// Phrase annotations, best first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub phrase: Vec<Annotated<PhraseTag>>,
}

/// Span types a section can be traversed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpanKind {
    /// Phrase chunks
    Chunk,
    /// Tokens
    Token,
}

/// A span yielded by [`Section::enclosed_spans`]
#[derive(Debug, Clone, Copy)]
pub enum SpanRef<'a> {
    /// A chunk
    Chunk(&'a Chunk),
    /// A token
    Token(&'a Token),
}

impl SpanRef<'_> {
    /// Start byte offset
    pub fn start(&self) -> usize {
        match self {
            SpanRef::Chunk(c) => c.start,
            SpanRef::Token(t) => t.start,
        }
    }

    /// End byte offset (exclusive)
    pub fn end(&self) -> usize {
        match self {
            SpanRef::Chunk(c) => c.end,
            SpanRef::Token(t) => t.end,
        }
    }

    fn kind_order(&self) -> u8 {
        match self {
            SpanRef::Chunk(_) => 0,
            SpanRef::Token(_) => 1,
        }
    }
}

/// A document after upstream NLP processing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysedText {
    /// Full document text
    pub text: String,
    /// Document language tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Sentence boundaries in document order; empty means one section
    #[serde(default)]
    pub sentences: Vec<SpanRange>,
    /// Phrase chunks
    #[serde(default)]
    pub chunks: Vec<Chunk>,
    /// Tokens
    #[serde(default)]
    pub tokens: Vec<Token>,
}

impl AnalysedText {
    /// Create a document without annotations
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Start building a document token by token
    pub fn builder() -> TextBuilder {
        TextBuilder::new()
    }

    /// Set the document language
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Document language tag
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Text covered by `[start, end)`
    ///
    /// Offsets must have passed [`AnalysedText::validate`].
    pub fn span_text(&self, start: usize, end: usize) -> &str {
        self.text.get(start..end).unwrap_or_default()
    }

    /// Check that every span lies within the text on char boundaries
    pub fn validate(&self) -> Result<()> {
        let spans = self
            .sentences
            .iter()
            .map(|s| ("sentence", s.start, s.end))
            .chain(self.chunks.iter().map(|c| ("chunk", c.start, c.end)))
            .chain(self.tokens.iter().map(|t| ("token", t.start, t.end)));
        for (kind, start, end) in spans {
            if start > end || end > self.text.len() {
                return Err(LinkError::InvalidText {
                    reason: format!(
                        "{kind} [{start}, {end}) outside text of {} bytes",
                        self.text.len()
                    ),
                });
            }
            if !self.text.is_char_boundary(start) || !self.text.is_char_boundary(end) {
                return Err(LinkError::InvalidText {
                    reason: format!("{kind} [{start}, {end}) does not fall on char boundaries"),
                });
            }
        }
        Ok(())
    }

    /// Sections of this document in order
    ///
    /// Without sentence annotations the whole document is a single section.
    pub fn sections(&self) -> Vec<Section<'_>> {
        if self.sentences.is_empty() {
            return vec![Section {
                text: self,
                index: 0,
                range: SpanRange::new(0, self.text.len()),
            }];
        }
        self.sentences
            .iter()
            .enumerate()
            .map(|(index, range)| Section {
                text: self,
                index,
                range: *range,
            })
            .collect()
    }
}

/// A sentence, or the whole document when no sentences are annotated
#[derive(Debug, Clone, Copy)]
pub struct Section<'a> {
    text: &'a AnalysedText,
    index: usize,
    range: SpanRange,
}

impl<'a> Section<'a> {
    /// Position of this section within the document
    pub fn index(&self) -> usize {
        self.index
    }

    /// Start byte offset
    pub fn start(&self) -> usize {
        self.range.start
    }

    /// End byte offset (exclusive)
    pub fn end(&self) -> usize {
        self.range.end
    }

    /// The document this section belongs to
    pub fn document(&self) -> &'a AnalysedText {
        self.text
    }

    /// Section text
    pub fn as_str(&self) -> &'a str {
        self.text.span_text(self.range.start, self.range.end)
    }

    /// Spans of the requested kinds enclosed by this section
    ///
    /// Ordered by start offset, enclosing spans before enclosed ones, chunks
    /// before tokens on identical ranges.
    pub fn enclosed_spans(&self, kinds: &[SpanKind]) -> Vec<SpanRef<'a>> {
        let mut spans: Vec<SpanRef<'a>> = Vec::new();
        if kinds.contains(&SpanKind::Chunk) {
            spans.extend(
                self.text
                    .chunks
                    .iter()
                    .filter(|c| self.range.encloses(c.start, c.end))
                    .map(SpanRef::Chunk),
            );
        }
        if kinds.contains(&SpanKind::Token) {
            spans.extend(
                self.text
                    .tokens
                    .iter()
                    .filter(|t| self.range.encloses(t.start, t.end))
                    .map(SpanRef::Token),
            );
        }
        spans.sort_by(|a, b| {
            a.start()
                .cmp(&b.start())
                .then_with(|| b.end().cmp(&a.end()))
                .then_with(|| a.kind_order().cmp(&b.kind_order()))
        });
        spans
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AnalysedText {
        let mut text = AnalysedText::new("New York is big.");
        text.tokens = vec![
            Token::new(0, 3),
            Token::new(4, 8),
            Token::new(9, 11),
            Token::new(12, 15),
            Token::new(15, 16),
        ];
        text.chunks = vec![Chunk {
            start: 0,
            end: 8,
            phrase: vec![],
        }];
        text
    }

    #[test]
    fn test_whole_document_is_one_section_without_sentences() {
        let text = sample();
        let sections = text.sections();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].as_str(), "New York is big.");
    }

    #[test]
    fn test_enclosed_spans_order_chunk_first() {
        let text = sample();
        let section = text.sections()[0];
        let spans = section.enclosed_spans(&[SpanKind::Chunk, SpanKind::Token]);
        assert_eq!(spans.len(), 6);
        assert!(matches!(spans[0], SpanRef::Chunk(_)));
        assert!(matches!(spans[1], SpanRef::Token(t) if t.start == 0));
    }

    #[test]
    fn test_enclosed_spans_without_chunks() {
        let text = sample();
        let section = text.sections()[0];
        let spans = section.enclosed_spans(&[SpanKind::Token]);
        assert!(spans.iter().all(|s| matches!(s, SpanRef::Token(_))));
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let mut text = sample();
        text.tokens.push(Token::new(14, 40));
        assert!(matches!(
            text.validate(),
            Err(LinkError::InvalidText { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_split_char() {
        let mut text = AnalysedText::new("café");
        text.tokens.push(Token::new(0, 4)); // 'é' spans bytes 3..5
        assert!(text.validate().is_err());
    }

    #[test]
    fn test_sentences_restrict_spans() {
        let mut text = sample();
        text.sentences = vec![SpanRange::new(0, 8), SpanRange::new(9, 16)];
        let sections = text.sections();
        let second = sections[1].enclosed_spans(&[SpanKind::Chunk, SpanKind::Token]);
        assert_eq!(second.len(), 3);
        assert_eq!(sections[1].index(), 1);
    }
}
