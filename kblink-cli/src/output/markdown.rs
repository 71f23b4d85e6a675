//! Markdown output formatter

use super::OutputFormatter;
use anyhow::Result;
use kblink_engine::LinkingOutput;
use std::io::Write;

/// Markdown formatter - one table per document
pub struct MarkdownFormatter<W: Write> {
    writer: W,
    entity_count: usize,
}

impl<W: Write> MarkdownFormatter<W> {
    /// Create a new markdown formatter
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            entity_count: 0,
        }
    }
}

fn escape(cell: &str) -> String {
    cell.replace('|', "\\|")
}

impl<W: Write + Send + Sync> OutputFormatter for MarkdownFormatter<W> {
    fn format_document(&mut self, source: &str, output: &LinkingOutput) -> Result<()> {
        writeln!(self.writer, "## {}", escape(source))?;
        writeln!(self.writer)?;
        if output.is_empty() {
            writeln!(self.writer, "*No entities linked*")?;
            writeln!(self.writer)?;
            return Ok(());
        }
        writeln!(self.writer, "| Text | Entity | Match | Score | Occurrences |")?;
        writeln!(self.writer, "|------|--------|-------|-------|-------------|")?;
        for entity in output.entities() {
            let Some(best) = entity.best() else {
                continue;
            };
            self.entity_count += 1;
            writeln!(
                self.writer,
                "| {} | {} | {:?} | {:.3} | {} |",
                escape(entity.selected_text()),
                escape(best.effective_entity().id().as_str()),
                best.match_type(),
                best.score(),
                entity.occurrences().len()
            )?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        writeln!(self.writer, "---")?;
        writeln!(self.writer, "*Total linked entities: {}*", self.entity_count)?;
        self.writer.flush()?;
        Ok(())
    }
}
