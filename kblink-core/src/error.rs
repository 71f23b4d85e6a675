//! Core error types
//!
//! Backend failures surface as [`SearchError`](crate::entity::SearchError) and are
//! carried through unchanged; everything else here signals either bad input
//! (analysed text, configuration) or a logic defect upstream.

use crate::entity::SearchError;
use thiserror::Error;

/// Errors raised by the linking domain
#[derive(Debug, Error)]
pub enum LinkError {
    /// The vocabulary backend failed; linking of the current document is aborted
    #[error("entity search failed: {0}")]
    Search(#[from] SearchError),

    /// A label match was constructed with violated invariants
    #[error("invalid label match: {reason}")]
    InvalidLabelMatch {
        /// Which invariant was violated
        reason: String,
    },

    /// `set_consumed` was called with a position before the current token
    #[error("cannot consume up to token {position}: current token is {current}")]
    InvalidConsumption {
        /// The requested consumed position
        position: isize,
        /// Index of the current token, `-1` before the first token
        current: isize,
    },

    /// The analysed text carries spans that do not fit its text
    #[error("invalid analysed text: {reason}")]
    InvalidText {
        /// Description of the offending span
        reason: String,
    },

    /// Configuration could not be loaded or failed validation
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("failed to read configuration '{path}': {source}")]
    Io {
        /// Path of the configuration file
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid TOML or does not fit the schema
    #[error("failed to parse configuration: {0}")]
    Parse(String),

    /// A value is outside its allowed range
    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue {
        /// Name of the offending field
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },
}

/// Result type for linking operations
pub type Result<T> = std::result::Result<T, LinkError>;
