use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use crate::cli::ConfigCommand;
use crate::config::DatadepsConfig;
use crate::config_discovery::discover_config;

pub fn run(command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Example => {
            print!("{}", DatadepsConfig::example());
            Ok(())
        }
        ConfigCommand::Validate { path } => match path {
            Some(path) => validate(&path),
            None => {
                let cwd = std::env::current_dir().context("Failed to get current directory")?;
                let path = discover_config(&cwd)
                    .ok_or_else(|| anyhow::anyhow!("No datadeps.toml found"))?;
                validate(&path)
            }
        },
    }
}

fn validate(path: &Path) -> Result<()> {
    info!(path = %path.display(), "Validating config file");

    let config = DatadepsConfig::from_file(path)?;
    config.validate()?;

    println!("✓ Configuration file is valid: {}", path.display());
    println!("\nSummary:");
    println!("  - Data root: {}", config.data.root);
    println!("  - Scan patterns: {}", config.scan.patterns.join(", "));
    println!("  - Compression: {}", config.archive.compression);

    Ok(())
}
