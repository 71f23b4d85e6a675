//! Per-section token and chunk classification
//!
//! A [`SectionData`] owns the flat token list of one section. Chunks refer to
//! tokens by index range and tokens refer to their chunk by index, so there
//! are no back-pointers between the two.

mod chunk;
mod token;

pub use chunk::{ChunkData, LINKABLE_SEEN};
pub use token::TokenData;

use crate::config::TextProcessingConfig;
use crate::text::{Section, SpanKind, SpanRef};

/// Classified tokens and processable chunks of one section
#[derive(Debug, Clone)]
pub struct SectionData {
    section_index: usize,
    start: usize,
    end: usize,
    text: String,
    tokens: Vec<TokenData>,
    chunks: Vec<ChunkData>,
    has_linkable_token: bool,
}

impl SectionData {
    /// Classify the spans of `section`
    ///
    /// `kinds` selects the traversed span types; chunks are only read when
    /// they are requested and not disabled by `ignore_chunks`.
    pub fn new(
        section: Section<'_>,
        kinds: &[SpanKind],
        unicase: bool,
        config: &TextProcessingConfig,
    ) -> Self {
        let read_chunks = kinds.contains(&SpanKind::Chunk) && !config.ignore_chunks;
        let kinds: &[SpanKind] = if read_chunks {
            &[SpanKind::Chunk, SpanKind::Token]
        } else {
            &[SpanKind::Token]
        };

        let mut data = SectionData {
            section_index: section.index(),
            start: section.start(),
            end: section.end(),
            text: section.as_str().to_string(),
            tokens: Vec::new(),
            chunks: Vec::new(),
            has_linkable_token: false,
        };
        let document = section.document();
        let mut open_chunk: Option<usize> = None;
        let mut sub_sentence_start = true;

        for span in section.enclosed_spans(kinds) {
            match span {
                SpanRef::Chunk(chunk) => {
                    if !ChunkData::is_processable(chunk, config) {
                        continue;
                    }
                    if let Some(open) = open_chunk {
                        let active = &mut data.chunks[open];
                        if chunk.start < active.end {
                            // overlapping chunk: merge, or ignore when fully covered
                            active.end = active.end.max(chunk.end);
                            continue;
                        }
                        data.close_chunk(open, config);
                    }
                    data.chunks.push(ChunkData::open(chunk, data.tokens.len()));
                    open_chunk = Some(data.chunks.len() - 1);
                }
                SpanRef::Token(token) => {
                    if let Some(open) = open_chunk {
                        if token.start >= data.chunks[open].end {
                            data.close_chunk(open, config);
                            open_chunk = None;
                        }
                    }
                    let index = data.tokens.len();
                    let token_data = TokenData::classify(
                        index,
                        token,
                        document.span_text(token.start, token.end),
                        sub_sentence_start,
                        open_chunk,
                        unicase,
                        config,
                    );
                    if let Some(open) = open_chunk {
                        data.chunks[open].add_token(
                            index,
                            token_data.is_linkable,
                            token_data.is_matchable,
                        );
                    }
                    sub_sentence_start = TokenData::opens_sub_sentence(token, config);
                    data.tokens.push(token_data);
                }
            }
        }
        if let Some(open) = open_chunk {
            data.close_chunk(open, config);
        }

        data.has_linkable_token = data.tokens.iter().any(|t| t.is_linkable);
        data
    }

    /// Finish the chunk at `index`; a chunk that received no tokens is dropped
    fn close_chunk(&mut self, index: usize, config: &TextProcessingConfig) {
        let chunk = &self.chunks[index];
        let empty = self
            .tokens
            .get(chunk.start_token)
            .map_or(true, |t| t.in_chunk != Some(index));
        if empty {
            // only the most recent chunk can be open
            self.chunks.pop();
            return;
        }
        if config.link_multi_matchable_tokens_in_chunk && chunk.matchable_count > 1 {
            let (first, last) = (chunk.start_token, chunk.end_token);
            for i in (first + 1..=last).rev() {
                if self.tokens[i].is_matchable && self.tokens[i - 1].is_matchable {
                    self.tokens[i].is_linkable = true;
                }
            }
        }
    }

    /// Position of the section within the document
    pub fn section_index(&self) -> usize {
        self.section_index
    }

    /// Start byte offset of the section
    pub fn start(&self) -> usize {
        self.start
    }

    /// End byte offset of the section (exclusive)
    pub fn end(&self) -> usize {
        self.end
    }

    /// Section text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Classified tokens in document order
    pub fn tokens(&self) -> &[TokenData] {
        &self.tokens
    }

    /// Processable chunks in document order
    pub fn chunks(&self) -> &[ChunkData] {
        &self.chunks
    }

    /// `false` if the section has nothing to link
    pub fn has_linkable_token(&self) -> bool {
        self.has_linkable_token
    }

    /// Number of matchable tokens of the chunk at `index`
    pub fn chunk_matchable_count(&self, index: usize) -> usize {
        self.chunks.get(index).map_or(0, |chunk| {
            self.tokens[chunk.start_token..=chunk.end_token]
                .iter()
                .filter(|t| t.is_matchable)
                .count()
        })
    }
}
