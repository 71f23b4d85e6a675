//! Domain layer of knowledge-base entity linking
//!
//! This crate decides which tokens of an analysed text are worth looking up
//! in a vocabulary, and how well a candidate's labels align with the text.
//! It holds no I/O: vocabularies are reached through [`EntitySearcher`] and
//! label tokenization through [`LabelTokenizer`].
//!
//! # Architecture
//!
//! - **text**: the analysed-text model produced by an upstream NLP pipeline
//! - **section / state**: token and chunk classification, and the cursor
//!   over linkable tokens
//! - **matching / suggestion**: label alignment, scoring and orderings
//! - **config**: serde configuration with an embedded default
//!
//! The orchestrating linker lives in `kblink-engine`.
//!
//! # Example
//!
//! ```rust
//! use kblink_core::config::TextProcessingConfig;
//! use kblink_core::text::{LexicalCategory, PosTag, TextBuilder};
//! use kblink_core::ProcessingState;
//!
//! let noun = PosTag::new("NNP").with_category(LexicalCategory::Noun);
//! let text = TextBuilder::new()
//!     .language("en")
//!     .token("Paris", Some(noun))
//!     .token(".", None)
//!     .build();
//!
//! let config = TextProcessingConfig::default();
//! let mut state = ProcessingState::new(&text, &config, false);
//! assert!(state.next());
//! assert_eq!(state.token().unwrap().text, "Paris");
//! assert!(!state.next());
//! ```

pub mod config;
pub mod entity;
pub mod error;
pub mod lang;
pub mod matching;
pub mod section;
pub mod state;
pub mod suggestion;
pub mod text;
pub mod tokenizer;

pub use config::{LinkerConfig, LinkingConfig, RedirectMode, TextProcessingConfig};
pub use entity::{Entity, EntitySearcher, Iri, Literal, LookupRequest, SearchError, Term, Triple};
pub use error::{ConfigError, LinkError, Result};
pub use matching::{LabelMatch, LabelMatcher, MatchType};
pub use section::{ChunkData, SectionData, TokenData};
pub use state::ProcessingState;
pub use suggestion::Suggestion;
pub use text::AnalysedText;
pub use tokenizer::{LabelTokenizer, TokenizerTable};
