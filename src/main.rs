use anyhow::Result;
use clap::Parser;

use datadeps::cli::{Cli, Commands};
use datadeps::{commands, logging};

fn main() -> Result<()> {
    // Initialize structured logging
    logging::init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Archive(args) => commands::archive::run(&args),
        Commands::Deps(args) => commands::deps::run(&args),
        Commands::Config(args) => commands::config::run(args.command),
    }
}
