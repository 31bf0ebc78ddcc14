// Library interface for datadeps
// The binary and the integration tests both go through these modules

pub mod archive;
pub mod cli;
pub mod cli_utils;
pub mod commands;
pub mod config;
pub mod config_discovery;
pub mod data_path;
pub mod discovery;
pub mod error;
pub mod graph;
pub mod label;
pub mod logging;
pub mod xdg;

// Re-export commonly used types
pub use archive::{ArchiveSummary, DataArchive};
pub use data_path::{DataPathResolver, DataStore};
pub use discovery::{discover, Discovery, NodeOutcome};
pub use error::DatadepsError;
pub use graph::{DependencyGraph, GraphProvider, ScriptScanner};
pub use label::expand_label;
