//! Generate config command implementation

use super::Preset;
use anyhow::{Context, Result};
use clap::Args;
use kblink_core::config::{embedded_default, DEFAULT_CONFIG_TOML};
use std::path::PathBuf;

/// Arguments for the generate-config command
#[derive(Debug, Args)]
pub struct GenerateConfigArgs {
    /// Output file path (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Start from a linker preset instead of the commented default
    #[arg(long, value_enum)]
    pub preset: Option<Preset>,
}

impl GenerateConfigArgs {
    /// Execute the generate-config command
    pub fn execute(&self) -> Result<()> {
        let content = self.render()?;

        let Some(output) = &self.output else {
            print!("{content}");
            return Ok(());
        };

        std::fs::write(output, content)
            .with_context(|| format!("Failed to write to {}", output.display()))?;

        println!("✓ Configuration written to {}", output.display());
        println!();
        println!("Next steps:");
        println!("1. Edit the values that differ from your needs");
        println!("2. Validate your configuration:");
        println!("   kblink validate --config {}", output.display());
        println!("3. Use it for linking:");
        println!(
            "   kblink link -i doc.json --vocabulary vocabulary.json --config {}",
            output.display()
        );

        Ok(())
    }

    fn render(&self) -> Result<String> {
        let Some(preset) = self.preset else {
            return Ok(DEFAULT_CONFIG_TOML.to_string());
        };
        let mut config = embedded_default()?.clone();
        config.linker = preset.linker_config();
        Ok(config.to_toml_string()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kblink_core::{LinkerConfig, LinkingConfig};
    use tempfile::TempDir;

    #[test]
    fn test_default_template_is_the_embedded_config() {
        let args = GenerateConfigArgs {
            output: None,
            preset: None,
        };
        let content = args.render().unwrap();
        assert!(content.contains("[linker]"));
        assert_eq!(
            LinkingConfig::from_toml_str(&content).unwrap(),
            LinkingConfig::default()
        );
    }

    #[test]
    fn test_preset_template_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("strict.toml");
        let args = GenerateConfigArgs {
            output: Some(output_path.clone()),
            preset: Some(Preset::Strict),
        };

        args.execute().unwrap();

        let config = LinkingConfig::from_file(&output_path).unwrap();
        assert_eq!(config.linker, LinkerConfig::strict());
    }
}
