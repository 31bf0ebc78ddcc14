pub mod archive;
pub mod config;
pub mod deps;

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use tracing::info;

use crate::cli::ScriptArgs;
use crate::config_discovery::{load_config_with_discovery, LoadedConfig};
use crate::data_path::DataStore;
use crate::error::DatadepsError;
use crate::graph::{GraphProvider, ScriptScanner};

/// Everything known about the script under analysis
pub struct ScriptContext {
    /// Canonical path of the script
    pub script_path: PathBuf,
    /// Canonical directory holding the script; the project root
    pub script_dir: PathBuf,
    /// Base filename of the script
    pub script_name: String,
    pub alpha: f64,
    pub config: LoadedConfig,
    pub store: DataStore,
    /// Data labels reachable from the script, before expansion
    pub data_nodes: BTreeSet<String>,
}

impl ScriptContext {
    /// Load config, build the dependency graph and select the script's data nodes
    pub fn prepare(args: &ScriptArgs) -> Result<Self> {
        if !args.script.is_file() {
            return Err(DatadepsError::ScriptNotFound(args.script.clone()).into());
        }

        let script_path = args
            .script
            .canonicalize()
            .with_context(|| format!("Failed to canonicalize path: {}", args.script.display()))?;
        let script_dir = script_path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Script has no parent directory"))?
            .to_path_buf();
        let script_name = script_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| anyhow::anyhow!("Script has no file name"))?;

        let cwd = std::env::current_dir().context("Failed to get current directory")?;
        let config = load_config_with_discovery(args.config.as_deref(), &script_dir, &cwd)?;

        let data_root = match &args.data_root {
            Some(root) => cwd.join(root),
            None => config.config.data_root(&config.base_dir),
        };
        // Match the canonical script directory when the root already exists
        let data_root = fs::canonicalize(&data_root).unwrap_or(data_root);

        let scanner = ScriptScanner::new(config.config.scan.patterns.clone());
        let graph = scanner.build(&script_dir)?;
        if !graph.contains(&script_name) {
            return Err(DatadepsError::ScriptNotScanned {
                script: script_name,
                patterns: config.config.scan.patterns.join(", "),
            }
            .into());
        }
        let data_nodes = graph.select_data_nodes(&script_name);

        info!(
            script = %script_name,
            data_root = %data_root.display(),
            data_nodes = data_nodes.len(),
            "Selected data dependencies"
        );

        Ok(Self {
            script_path,
            script_dir,
            script_name,
            alpha: args.alpha,
            config,
            store: DataStore::new(data_root),
            data_nodes,
        })
    }
}
