//! CLI command implementations

use anyhow::Result;
use clap::{Subcommand, ValueEnum};

pub mod generate_config;
pub mod link;
pub mod validate;

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Link analysed-text documents against a vocabulary
    Link(link::LinkArgs),

    /// Validate a linking configuration file
    Validate(validate::ValidateArgs),

    /// Write a configuration file to start from
    GenerateConfig(generate_config::GenerateConfigArgs),

    /// List available components
    List {
        #[command(subcommand)]
        subcommand: ListCommands,
    },
}

/// List subcommands
#[derive(Debug, Subcommand)]
pub enum ListCommands {
    /// List available output formats
    Formats,

    /// List available configuration presets
    Presets,
}

/// Linker configuration presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    /// Fewer, more certain links
    Strict,
    /// More links, including partial label matches
    Lenient,
}

impl Preset {
    /// Linker configuration of this preset
    pub fn linker_config(self) -> kblink_core::LinkerConfig {
        match self {
            Preset::Strict => kblink_core::LinkerConfig::strict(),
            Preset::Lenient => kblink_core::LinkerConfig::lenient(),
        }
    }
}

impl Commands {
    /// Execute the command
    pub fn execute(&self) -> Result<()> {
        match self {
            Commands::Link(args) => args.execute(),
            Commands::Validate(args) => args.execute(),
            Commands::GenerateConfig(args) => args.execute(),
            Commands::List { subcommand } => {
                subcommand.execute();
                Ok(())
            }
        }
    }
}

impl ListCommands {
    /// Print the requested listing
    pub fn execute(&self) {
        for line in self.lines() {
            println!("{line}");
        }
    }

    fn lines(&self) -> Vec<String> {
        let values = match self {
            ListCommands::Formats => link::OutputFormat::value_variants()
                .iter()
                .filter_map(|v| v.to_possible_value())
                .collect::<Vec<_>>(),
            ListCommands::Presets => Preset::value_variants()
                .iter()
                .filter_map(|v| v.to_possible_value())
                .collect::<Vec<_>>(),
        };
        values
            .iter()
            .map(|v| match v.get_help() {
                Some(help) => format!("{:<10} {help}", v.get_name()),
                None => v.get_name().to_string(),
            })
            .collect()
    }
}
