//! Link command implementation

use super::Preset;
use crate::error::CliError;
use crate::input::{resolve_patterns, FileReader};
use crate::output::{JsonFormatter, MarkdownFormatter, OutputFormatter, TextFormatter};
use crate::progress::ProgressReporter;
use anyhow::{Context, Result};
use clap::Args;
use kblink_core::config::embedded_default;
use kblink_core::LinkingConfig;
use kblink_engine::{InMemorySearcher, LinkingEngine};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

/// Arguments for the link command
#[derive(Debug, Args)]
pub struct LinkArgs {
    /// Analysed-text JSON documents or patterns (supports glob)
    #[arg(short, long, value_name = "FILE/PATTERN", required = true)]
    pub input: Vec<String>,

    /// Vocabulary JSON file
    #[arg(long, value_name = "FILE", required = true)]
    pub vocabulary: PathBuf,

    /// Configuration file (default: embedded configuration)
    #[arg(short, long, value_name = "FILE", conflicts_with = "preset")]
    pub config: Option<PathBuf>,

    /// Linker preset applied to the embedded configuration
    #[arg(long, value_enum)]
    pub preset: Option<Preset>,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Number of threads for linking several documents (default: all cores)
    #[arg(short, long, value_name = "N")]
    pub threads: Option<usize>,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Tab separated, one line per linked text
    Text,
    /// JSON array of documents with entities and statistics
    Json,
    /// Markdown table per document
    Markdown,
}

impl LinkArgs {
    /// Execute the link command
    pub fn execute(&self) -> Result<()> {
        self.init_logging()?;

        log::info!("Starting entity linking");
        log::debug!("Arguments: {:?}", self);

        let config = self.load_config()?;
        let searcher = InMemorySearcher::from_file(&self.vocabulary, &config.linker)
            .with_context(|| format!("Failed to load vocabulary: {}", self.vocabulary.display()))?;
        log::info!("Loaded {} vocabulary entities", searcher.len());

        let engine = LinkingEngine::builder()
            .searcher(searcher)
            .config(config)
            .threads(self.threads)
            .build()?;

        let files = resolve_patterns(&self.input)?;
        let documents = files
            .iter()
            .map(|path| FileReader::read_document(path))
            .collect::<Result<Vec<_>>>()?;

        let mut progress = ProgressReporter::new(self.quiet);
        progress.init_documents(documents.len() as u64);

        let mut formatter = self.formatter()?;
        for (path, result) in files.iter().zip(engine.link_batch(&documents)) {
            let source = path.display().to_string();
            let output = result.with_context(|| format!("Failed to link {source}"))?;
            formatter.format_document(&source, &output)?;
            progress.document_completed(&source, output.len());
        }
        formatter.finish()?;
        progress.finish();

        Ok(())
    }

    /// Configuration file, else the embedded default with the preset applied
    fn load_config(&self) -> Result<LinkingConfig> {
        if let Some(path) = &self.config {
            return LinkingConfig::from_file(path)
                .map_err(|e| CliError::ConfigError(format!("{}: {e}", path.display())).into());
        }
        let mut config = embedded_default()?.clone();
        if let Some(preset) = self.preset {
            config.linker = preset.linker_config();
        }
        Ok(config)
    }

    fn formatter(&self) -> Result<Box<dyn OutputFormatter>> {
        let writer: Box<dyn Write + Send + Sync> = match &self.output {
            Some(path) => Box::new(BufWriter::new(
                File::create(path)
                    .with_context(|| format!("Failed to create {}", path.display()))?,
            )),
            None => Box::new(io::stdout()),
        };
        Ok(match self.format {
            OutputFormat::Text => Box::new(TextFormatter::new(writer)),
            OutputFormat::Json => Box::new(JsonFormatter::new(writer)),
            OutputFormat::Markdown => Box::new(MarkdownFormatter::new(writer)),
        })
    }

    /// Initialize logging based on verbosity level
    fn init_logging(&self) -> Result<()> {
        let log_level = match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };

        if !self.quiet {
            // A logger may already be installed when running under tests
            let _ = env_logger::Builder::from_env(
                env_logger::Env::default().default_filter_or(log_level),
            )
            .try_init();
        }

        Ok(())
    }
}
