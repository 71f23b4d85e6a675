//! Reading analysed-text documents

use crate::error::CliError;
use anyhow::{Context, Result};
use kblink_core::AnalysedText;
use std::fs;
use std::path::Path;

/// Reads input files
pub struct FileReader;

impl FileReader {
    /// Read a file as UTF-8 text
    pub fn read_text(path: &Path) -> Result<String> {
        fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))
    }

    /// Read an analysed-text JSON document
    pub fn read_document(path: &Path) -> Result<AnalysedText> {
        let json = Self::read_text(path)?;
        let document: AnalysedText = serde_json::from_str(&json)
            .map_err(|e| CliError::InvalidDocument(format!("{}: {e}", path.display())))?;
        document
            .validate()
            .map_err(|e| CliError::InvalidDocument(format!("{}: {e}", path.display())))?;
        Ok(document)
    }
}
