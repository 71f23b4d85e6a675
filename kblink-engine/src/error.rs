//! Engine error types
//!
//! Layers over the core [`LinkError`]: backend failures reach the caller
//! unchanged inside [`EngineError::Link`].

use kblink_core::{ConfigError, LinkError, SearchError};
use thiserror::Error;

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Linking a document failed
    #[error("linking failed: {0}")]
    Link(#[from] LinkError),

    /// Configuration error
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The engine was built without a required component
    #[error("engine requires a {component}")]
    MissingComponent {
        /// Name of the missing component
        component: &'static str,
    },

    /// The vocabulary could not be parsed
    #[error("invalid vocabulary: {reason}")]
    Vocabulary {
        /// Why the vocabulary was rejected
        reason: String,
    },

    /// Parallel execution error
    #[cfg(feature = "parallel")]
    #[error("parallel execution failed: {0}")]
    Parallel(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::Io(err.to_string())
    }
}

impl From<SearchError> for EngineError {
    fn from(err: SearchError) -> Self {
        EngineError::Link(LinkError::Search(err))
    }
}

impl EngineError {
    /// The backend failure behind this error, if any
    pub fn search_error(&self) -> Option<&SearchError> {
        match self {
            EngineError::Link(LinkError::Search(err)) => Some(err),
            _ => None,
        }
    }
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
