/// Script scanner
///
/// Builds the dependency graph from the scripts of a project. Data usage is
/// detected two ways:
///
/// - call sites: `create_data_path("label")` writes data,
///   `find_newest_data_path("label")` reads it
/// - `#DATA` (or `//DATA`) directive comments, parsed as KDL:
///   `reads "label"`, `writes "label"`, `depends "./other.py"`
use anyhow::{anyhow, Context, Result};
use glob::glob;
use kdl::{KdlDocument, KdlNode};
use regex::Regex;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

use super::{DependencyGraph, GraphProvider};

const DIRECTIVE_PREFIXES: [&str; 2] = ["#DATA", "//DATA"];

static CALL_SITE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\b(create_data_path|find_newest_data_path)\(\s*[fFrR]?(?:'([^'\n]+)'|"([^"\n]+)")"#,
    )
    .expect("call-site pattern is valid")
});

/// How a script uses a piece of data or another script
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Usage {
    Reads(String),
    Writes(String),
    Depends(PathBuf),
}

/// Graph provider that scans script sources under the project root
#[derive(Debug, Clone)]
pub struct ScriptScanner {
    patterns: Vec<String>,
}

impl ScriptScanner {
    pub fn new(patterns: Vec<String>) -> Self {
        Self { patterns }
    }

    /// Script files under `root` matching any pattern, sorted and deduplicated
    pub fn script_files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let escaped_root = glob::Pattern::escape(&root.to_string_lossy());
        let mut files = Vec::new();

        for pattern in &self.patterns {
            let full_pattern = format!("{}/{}", escaped_root, pattern);
            for entry in
                glob(&full_pattern).with_context(|| format!("Invalid glob pattern: {}", pattern))?
            {
                let path =
                    entry.with_context(|| format!("Failed to read glob entry for: {}", pattern))?;
                if path.is_file() {
                    files.push(path);
                }
            }
        }

        files.sort();
        files.dedup();
        Ok(files)
    }
}

impl GraphProvider for ScriptScanner {
    fn build(&self, project_root: &Path) -> Result<DependencyGraph> {
        let mut graph = DependencyGraph::new();

        for script in self.script_files(project_root)? {
            let id = node_id(&script, project_root)?;
            graph.add_node(&id);

            let usages = scan_script(&script)
                .with_context(|| format!("Failed to scan script: {}", script.display()))?;

            for usage in usages {
                match usage {
                    Usage::Reads(label) => {
                        graph.add_data_node(&label);
                        graph.add_edge(&id, &label);
                    }
                    Usage::Writes(label) => {
                        graph.add_data_node(&label);
                        graph.add_edge(&label, &id);
                    }
                    Usage::Depends(dep) => {
                        let base = script.parent().unwrap_or(project_root);
                        let dep_id = node_id(&base.join(&dep), project_root).with_context(|| {
                            format!("Invalid dependency in {}: {}", id, dep.display())
                        })?;
                        graph.add_edge(&id, &dep_id);
                    }
                }
            }
        }

        debug!(
            root = %project_root.display(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            data_nodes = graph.data_nodes().len(),
            "Built dependency graph"
        );

        Ok(graph)
    }
}

/// Collect every data usage declared by a script
pub fn scan_script(path: &Path) -> Result<Vec<Usage>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read script: {}", path.display()))?;
    scan_source(&content)
}

/// Collect data usages from script source text
pub fn scan_source(content: &str) -> Result<Vec<Usage>> {
    let mut usages = Vec::new();

    for caps in CALL_SITE.captures_iter(content) {
        let label = caps
            .get(2)
            .or_else(|| caps.get(3))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| anyhow!("Call site without a label"))?;

        match &caps[1] {
            "create_data_path" => usages.push(Usage::Writes(label)),
            _ => usages.push(Usage::Reads(label)),
        }
    }

    // Extract KDL directives from comments
    let mut kdl_lines = Vec::new();
    for line in content.lines() {
        let trimmed = line.trim();
        for prefix in DIRECTIVE_PREFIXES {
            // `#DATABASE` and friends are ordinary comments
            if let Some(directive) = trimmed.strip_prefix(prefix) {
                if directive.starts_with(char::is_whitespace) {
                    kdl_lines.push(directive.trim());
                }
                break;
            }
        }
    }

    if !kdl_lines.is_empty() {
        let kdl_text = kdl_lines.join("\n");
        let doc: KdlDocument = kdl_text
            .parse()
            .map_err(|e| anyhow!("Invalid KDL syntax: {}", e))?;

        for node in doc.nodes() {
            let usage = parse_directive(node)
                .with_context(|| format!("Failed to parse directive: {}", node.name()))?;
            usages.push(usage);
        }
    }

    Ok(usages)
}

fn parse_directive(node: &KdlNode) -> Result<Usage> {
    let argument = || {
        get_positional_string(node, 0)
            .ok_or_else(|| anyhow!("{} requires a string argument", node.name().value()))
    };

    match node.name().value() {
        "reads" => Ok(Usage::Reads(argument()?)),
        "writes" => Ok(Usage::Writes(argument()?)),
        "depends" => Ok(Usage::Depends(PathBuf::from(argument()?))),
        other => Err(anyhow!(
            "Unknown directive: {}. Use: reads, writes, depends",
            other
        )),
    }
}

/// Get positional string argument from KDL node
fn get_positional_string(node: &KdlNode, index: usize) -> Option<String> {
    node.entries()
        .iter()
        .filter(|e| e.name().is_none())
        .nth(index)
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

/// Node identifier of a script: its path relative to `root`, `/`-separated
///
/// `.` and `..` are folded lexically so the file does not need to exist.
pub fn node_id(path: &Path, root: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| anyhow!("{} is outside {}", path.display(), root.display()))?;

    let mut parts: Vec<String> = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::CurDir => {}
            Component::ParentDir => {
                if parts.pop().is_none() {
                    return Err(anyhow!(
                        "{} escapes the project root {}",
                        path.display(),
                        root.display()
                    ));
                }
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(anyhow!("Unexpected absolute path: {}", path.display()));
            }
        }
    }

    Ok(parts.join("/"))
}
