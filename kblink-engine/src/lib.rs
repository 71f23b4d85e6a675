//! Entity linking orchestration
//!
//! This crate drives the domain types of `kblink-core` over whole documents:
//! it builds search windows, queries an [`EntitySearcher`] through a
//! per-document cache, ranks the suggestions, resolves redirects and
//! aggregates the results by selected text.
//!
//! # Example
//!
//! ```rust
//! use kblink_core::text::{LexicalCategory, PosTag, TextBuilder};
//! use kblink_core::LinkerConfig;
//! use kblink_engine::{InMemorySearcher, LinkingEngine};
//!
//! let vocabulary = r#"[{ "id": "urn:paris", "labels": [{ "text": "Paris", "lang": "en" }] }]"#;
//! let searcher = InMemorySearcher::from_json_str(vocabulary, &LinkerConfig::default())?;
//! let engine = LinkingEngine::builder().searcher(searcher).build()?;
//!
//! let noun = PosTag::new("NNP").with_category(LexicalCategory::Noun);
//! let text = TextBuilder::new()
//!     .language("en")
//!     .token("Paris", Some(noun))
//!     .build();
//!
//! let output = engine.link(&text)?;
//! let paris = output.get("Paris").unwrap();
//! assert_eq!(paris.best().unwrap().entity().id().as_str(), "urn:paris");
//! # Ok::<(), kblink_engine::EngineError>(())
//! ```

#![warn(missing_docs)]

pub mod cache;
pub mod engine;
pub mod error;
pub mod linked_entity;
pub mod linker;
pub mod memory;
pub mod ranking;
pub mod redirect;
pub mod stats;

pub use engine::{LinkingEngine, LinkingEngineBuilder};
pub use error::{EngineError, Result};
pub use linked_entity::{LinkedEntity, LinkingOutput, Occurrence};
pub use linker::EntityLinker;
pub use memory::InMemorySearcher;
pub use stats::LinkingStats;

// Re-export from core for convenience
pub use kblink_core::{AnalysedText, EntitySearcher, LinkingConfig};
