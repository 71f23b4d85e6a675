//! Plain text output formatter

use super::OutputFormatter;
use anyhow::Result;
use kblink_engine::LinkingOutput;
use std::io::{self, Write};

/// Plain text formatter - one line per linked text, tab separated
pub struct TextFormatter<W: Write> {
    writer: W,
}

impl<W: Write> TextFormatter<W> {
    /// Create a new text formatter
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl TextFormatter<io::Stdout> {
    /// Create a formatter that writes to stdout
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send + Sync> OutputFormatter for TextFormatter<W> {
    fn format_document(&mut self, source: &str, output: &LinkingOutput) -> Result<()> {
        writeln!(self.writer, "# {source}")?;
        for entity in output.entities() {
            let Some(best) = entity.best() else {
                continue;
            };
            writeln!(
                self.writer,
                "{}\t{}\t{:?}\t{:.3}\t{}",
                entity.selected_text(),
                best.effective_entity().id(),
                best.match_type(),
                best.score(),
                entity.occurrences().len()
            )?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::fixtures;

    #[test]
    fn test_one_line_per_linked_text() {
        let mut buffer = Vec::new();
        let mut formatter = TextFormatter::new(&mut buffer);
        formatter.format_document("doc.json", &fixtures::linked()).unwrap();
        formatter.finish().unwrap();

        let out = String::from_utf8(buffer).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[0], "# doc.json");
        assert_eq!(lines[1], "Barack Obama\turn:obama\tExact\t1.000\t1");
        assert_eq!(lines[2], "Paris\turn:paris\tExact\t1.000\t1");
    }
}
