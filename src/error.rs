use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the archiving core.
///
/// A data node whose label resolves to nothing is not an error: the resolver
/// reports it as `Ok(None)` and discovery skips the node.
#[derive(Error, Debug)]
pub enum DatadepsError {
    #[error("Script not found: {0}")]
    ScriptNotFound(PathBuf),

    #[error("{script} does not match any scan pattern ({patterns}); add it to [scan] patterns")]
    ScriptNotScanned { script: String, patterns: String },

    #[error("File {file} is not under the script directory {root}")]
    PathOutsideRoot { file: PathBuf, root: PathBuf },

    #[error("File name is not valid UTF-8: {0}")]
    NonUtf8Path(PathBuf),

    #[error("Failed to write archive entry '{entry}': {source}")]
    ArchiveWrite {
        entry: String,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Archive is {state}, cannot {action}")]
    InvalidState {
        state: &'static str,
        action: &'static str,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DatadepsError>;
