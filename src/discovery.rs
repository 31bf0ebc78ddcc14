/// Data file discovery
///
/// Turns the selected data nodes into concrete files: expand each label with
/// the run parameter, resolve it to its newest directory, then walk that
/// directory recursively.
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::data_path::DataPathResolver;
use crate::label::expand_label;

/// What happened to one data node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NodeOutcome {
    Resolved {
        label: String,
        expanded: String,
        directory: PathBuf,
        files: Vec<PathBuf>,
    },
    NotFound {
        label: String,
        expanded: String,
    },
}

impl NodeOutcome {
    pub fn label(&self) -> &str {
        match self {
            Self::Resolved { label, .. } | Self::NotFound { label, .. } => label,
        }
    }

    pub fn files(&self) -> &[PathBuf] {
        match self {
            Self::Resolved { files, .. } => files,
            Self::NotFound { .. } => &[],
        }
    }
}

/// Per-node results of a discovery pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct Discovery {
    pub nodes: Vec<NodeOutcome>,
}

impl Discovery {
    /// Every discovered file, node by node
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.nodes
            .iter()
            .flat_map(|node| node.files().iter().map(PathBuf::as_path))
    }

    pub fn file_count(&self) -> usize {
        self.nodes.iter().map(|node| node.files().len()).sum()
    }

    pub fn not_found(&self) -> impl Iterator<Item = &NodeOutcome> {
        self.nodes
            .iter()
            .filter(|node| matches!(node, NodeOutcome::NotFound { .. }))
    }
}

/// Resolve and walk every data node
///
/// A label with no matching directory is logged and skipped. Resolver and
/// walk failures abort discovery.
pub fn discover<'a, I, R>(data_nodes: I, alpha: f64, resolver: &R) -> Result<Discovery>
where
    I: IntoIterator<Item = &'a String>,
    R: DataPathResolver + ?Sized,
{
    let mut discovery = Discovery::default();

    for label in data_nodes {
        let expanded = expand_label(label, alpha);
        info!(label = %label, expanded = %expanded, "Searching for data paths");

        let outcome = match resolver
            .find_newest_data_path(&expanded)
            .with_context(|| format!("Failed to resolve data label: {}", expanded))?
        {
            Some(directory) => {
                let files = walk_files(&directory)?;
                info!(
                    expanded = %expanded,
                    directory = %directory.display(),
                    file_count = files.len(),
                    "Found data path"
                );
                NodeOutcome::Resolved {
                    label: label.clone(),
                    expanded,
                    directory,
                    files,
                }
            }
            None => {
                info!(expanded = %expanded, "No paths found; skipping");
                NodeOutcome::NotFound {
                    label: label.clone(),
                    expanded,
                }
            }
        };

        discovery.nodes.push(outcome);
    }

    Ok(discovery)
}

/// Every file below `dir`, in file name order
///
/// Symlinks to files are kept under the link's own path. Symlinked
/// directories are not descended into. A dangling link is an error.
pub fn walk_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk: {}", dir.display()))?;
        let file_type = entry.file_type();

        if file_type.is_file() {
            files.push(entry.into_path());
        } else if file_type.is_symlink() {
            let target = fs::metadata(entry.path()).with_context(|| {
                format!("Failed to follow symlink: {}", entry.path().display())
            })?;
            if target.is_file() {
                files.push(entry.into_path());
            } else {
                debug!(path = %entry.path().display(), "Skipping symlinked directory");
            }
        }
    }

    Ok(files)
}
