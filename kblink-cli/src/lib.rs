//! kblink CLI library
//!
//! This library provides the command-line interface for linking analysed
//! text against a knowledge-base vocabulary.

pub mod commands;
pub mod error;
pub mod input;
pub mod output;
pub mod progress;

pub use error::{CliError, CliResult};
