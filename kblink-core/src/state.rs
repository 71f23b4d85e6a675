//! Iteration over the linkable tokens of a document
//!
//! [`ProcessingState`] walks the sections of a document and yields every
//! linkable token that has not been consumed by an earlier match. Token
//! indices are relative to the current section; the consumed index is reset
//! to `-1` whenever a new section becomes current.

use crate::config::TextProcessingConfig;
use crate::error::{LinkError, Result};
use crate::section::{ChunkData, SectionData, TokenData};
use crate::text::{AnalysedText, Section, SpanKind};

/// Cursor over the linkable tokens of one document
#[derive(Debug)]
pub struct ProcessingState<'a> {
    text: &'a AnalysedText,
    config: &'a TextProcessingConfig,
    unicase: bool,
    sections: std::vec::IntoIter<Section<'a>>,
    last_section_end: Option<usize>,
    section: Option<SectionData>,
    cursor: usize,
    token: Option<usize>,
    consumed: isize,
}

impl<'a> ProcessingState<'a> {
    /// Create a state positioned before the first section
    pub fn new(text: &'a AnalysedText, config: &'a TextProcessingConfig, unicase: bool) -> Self {
        Self {
            text,
            config,
            unicase,
            sections: text.sections().into_iter(),
            last_section_end: None,
            section: None,
            cursor: 0,
            token: None,
            consumed: -1,
        }
    }

    /// Advance to the next unconsumed linkable token
    ///
    /// Returns `false` once every section is exhausted.
    pub fn next(&mut self) -> bool {
        loop {
            if let Some(section) = &self.section {
                let tokens = section.tokens();
                while self.cursor < tokens.len() {
                    let index = self.cursor;
                    self.cursor += 1;
                    if tokens[index].is_linkable && index as isize > self.consumed {
                        self.token = Some(index);
                        return true;
                    }
                }
            }
            self.token = None;
            match self.next_section() {
                Some(section) => {
                    self.section = Some(section);
                    self.cursor = 0;
                    self.consumed = -1;
                }
                None => {
                    self.section = None;
                    return false;
                }
            }
        }
    }

    fn next_section(&mut self) -> Option<SectionData> {
        let kinds: &[SpanKind] = if self.config.ignore_chunks {
            &[SpanKind::Token]
        } else {
            &[SpanKind::Chunk, SpanKind::Token]
        };
        for section in self.sections.by_ref() {
            if let Some(last_end) = self.last_section_end {
                if section.start() < last_end {
                    log::warn!(
                        "skipping section {} [{}, {}): overlaps the previous section ending at {}",
                        section.index(),
                        section.start(),
                        section.end(),
                        last_end
                    );
                    continue;
                }
            }
            self.last_section_end = Some(section.end());
            let data = SectionData::new(section, kinds, self.unicase, self.config);
            if data.has_linkable_token() {
                return Some(data);
            }
        }
        None
    }

    /// The current token
    pub fn token(&self) -> Option<&TokenData> {
        let index = self.token?;
        self.section.as_ref()?.tokens().get(index)
    }

    /// Index of the current token within its section
    pub fn token_index(&self) -> Option<usize> {
        self.token
    }

    /// Tokens of the current section
    pub fn tokens(&self) -> &[TokenData] {
        self.section.as_ref().map_or(&[], |s| s.tokens())
    }

    /// Processable chunks of the current section
    pub fn chunks(&self) -> &[ChunkData] {
        self.section.as_ref().map_or(&[], |s| s.chunks())
    }

    /// The current section
    pub fn section(&self) -> Option<&SectionData> {
        self.section.as_ref()
    }

    /// Index of the last consumed token of the current section, `-1` if none
    pub fn consumed_index(&self) -> isize {
        self.consumed
    }

    /// Mark every token up to and including `position` as consumed
    ///
    /// Fails if `position` lies before the current token.
    pub fn set_consumed(&mut self, position: isize) -> Result<()> {
        let current = self.token.map_or(-1, |i| i as isize);
        if position < current || position < self.consumed {
            return Err(LinkError::InvalidConsumption { position, current });
        }
        self.consumed = position;
        Ok(())
    }

    /// Document language
    pub fn language(&self) -> Option<&'a str> {
        self.text.language()
    }

    /// The document being processed
    pub fn document(&self) -> &'a AnalysedText {
        self.text
    }

    /// Language-processing configuration in use
    pub fn config(&self) -> &'a TextProcessingConfig {
        self.config
    }
}
