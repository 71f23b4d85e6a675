//! JSON output formatter

use super::OutputFormatter;
use anyhow::Result;
use kblink_engine::LinkingOutput;
use serde_json::{json, Value};
use std::io::Write;

/// JSON formatter - outputs one object per document in a JSON array
pub struct JsonFormatter<W: Write> {
    writer: W,
    documents: Vec<Value>,
}

impl<W: Write> JsonFormatter<W> {
    /// Create a new JSON formatter
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            documents: Vec::new(),
        }
    }
}

impl<W: Write + Send + Sync> OutputFormatter for JsonFormatter<W> {
    fn format_document(&mut self, source: &str, output: &LinkingOutput) -> Result<()> {
        self.documents.push(json!({
            "source": source,
            "entities": output.entities(),
            "stats": output.stats(),
        }));
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, &self.documents)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}
