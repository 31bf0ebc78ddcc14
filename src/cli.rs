use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// datadeps - Archive the data a script depends on
///
/// Scans the scripts next to the given one, follows the data they read and
/// write, and bundles the newest matching data directories into a zip.
#[derive(Parser, Debug)]
#[command(name = "datadeps")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Archive the data a script transitively depends on", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Archive the newest data the script depends on
    Archive(ArchiveArgs),

    /// List the data a script depends on without writing anything
    Deps(DepsArgs),

    /// Configuration management utilities
    Config(ConfigArgs),
}

/// Arguments shared by the commands that analyze a script
#[derive(Args, Debug, Clone)]
pub struct ScriptArgs {
    /// Script to analyze
    pub script: PathBuf,

    /// Run parameter substituted for `param` in data labels
    #[arg(short, long, env = "DATADEPS_ALPHA", allow_negative_numbers = true)]
    pub alpha: f64,

    /// Config file path
    #[arg(short = 'c', long, env = "DATADEPS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding the timestamped data directories
    #[arg(long, env = "DATADEPS_DATA_ROOT")]
    pub data_root: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct ArchiveArgs {
    #[command(flatten)]
    pub script: ScriptArgs,

    /// Store files without compression
    #[arg(long)]
    pub stored: bool,
}

#[derive(Parser, Debug)]
pub struct DepsArgs {
    #[command(flatten)]
    pub script: ScriptArgs,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print an example datadeps.toml
    Example,

    /// Validate a config file (discovered from the current directory if omitted)
    Validate {
        /// Config file path
        path: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_archive() {
        let cli = Cli::try_parse_from(["datadeps", "archive", "train.py", "--alpha", "0.5"])
            .unwrap();
        match cli.command {
            Commands::Archive(args) => {
                assert_eq!(args.script.script, PathBuf::from("train.py"));
                assert_eq!(args.script.alpha, 0.5);
                assert!(!args.stored);
            }
            _ => panic!("expected archive command"),
        }
    }

    #[test]
    fn test_alpha_is_a_float() {
        let result = Cli::try_parse_from(["datadeps", "deps", "train.py", "--alpha", "half"]);
        assert!(result.is_err());
    }
}
