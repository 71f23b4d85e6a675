use crate::config::TextProcessingConfig;
use crate::text::Chunk;

/// `matchable_count` once the chunk contains a linkable token
pub const LINKABLE_SEEN: i32 = -10;

/// A processable chunk of a section
///
/// Token positions are indices into the section's token list.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkData {
    /// Chunks are only recorded when processable
    pub is_processable: bool,
    /// Start byte offset in the document
    pub start: usize,
    /// End byte offset in the document (exclusive); extended by merged chunks
    pub end: usize,
    /// First token of the chunk
    pub start_token: usize,
    /// Last token of the chunk (inclusive)
    pub end_token: usize,
    /// First matchable token of the chunk
    pub matchable_start: Option<usize>,
    /// Last matchable token of the chunk
    pub matchable_end: Option<usize>,
    /// Running count of matchable tokens, [`LINKABLE_SEEN`] once a linkable token was added
    pub matchable_count: i32,
}

impl ChunkData {
    pub(crate) fn open(chunk: &Chunk, first_token: usize) -> Self {
        Self {
            is_processable: true,
            start: chunk.start,
            end: chunk.end,
            start_token: first_token,
            end_token: first_token,
            matchable_start: None,
            matchable_end: None,
            matchable_count: 0,
        }
    }

    /// `true` if the phrase annotations select this chunk for processing
    ///
    /// Annotations are read best first: an included phrase at the inclusion
    /// threshold accepts, any other phrase at the exclusion threshold rejects.
    pub fn is_processable(chunk: &Chunk, config: &TextProcessingConfig) -> bool {
        for annotation in &chunk.phrase {
            let processed = config.is_processed_phrase(&annotation.value);
            if processed && annotation.reaches(config.min_phrase_annotation_probability) {
                return true;
            }
            if !processed && annotation.reaches(config.min_exclude_phrase_annotation_probability) {
                return false;
            }
        }
        false
    }

    pub(crate) fn add_token(&mut self, index: usize, linkable: bool, matchable: bool) {
        self.end_token = index;
        if matchable {
            self.matchable_start.get_or_insert(index);
            self.matchable_end = Some(index);
        }
        if linkable {
            self.matchable_count = LINKABLE_SEEN;
        } else if matchable {
            self.matchable_count += 1;
        }
    }
}
