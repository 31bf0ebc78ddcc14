/// `datadeps deps` command implementation
///
/// Shows what `datadeps archive` would bundle, without writing anything.
use anyhow::Result;
use serde::Serialize;
use std::path::Path;

use crate::cli::{DepsArgs, OutputFormat};
use crate::discovery::{discover, Discovery, NodeOutcome};

use super::ScriptContext;

#[derive(Debug, Serialize)]
struct DepsReport<'a> {
    script: &'a Path,
    alpha: f64,
    data_root: &'a Path,
    #[serde(flatten)]
    discovery: &'a Discovery,
}

pub fn run(args: &DepsArgs) -> Result<()> {
    let ctx = ScriptContext::prepare(&args.script)?;
    let discovery = discover(&ctx.data_nodes, ctx.alpha, &ctx.store)?;

    match args.format {
        OutputFormat::Json => {
            let report = DepsReport {
                script: &ctx.script_path,
                alpha: ctx.alpha,
                data_root: ctx.store.root(),
                discovery: &discovery,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => print!("{}", render_text(&ctx.script_name, &discovery)),
    }

    Ok(())
}

fn render_text(script_name: &str, discovery: &Discovery) -> String {
    let mut out = String::new();

    if discovery.nodes.is_empty() {
        out.push_str(&format!("{} depends on no data\n", script_name));
        return out;
    }

    out.push_str(&format!(
        "{} depends on {} data labels ({} files):\n",
        script_name,
        discovery.nodes.len(),
        discovery.file_count()
    ));

    for node in &discovery.nodes {
        match node {
            NodeOutcome::Resolved {
                expanded,
                directory,
                files,
                ..
            } => out.push_str(&format!(
                "  ✓ {} -> {} ({} files)\n",
                expanded,
                directory.display(),
                files.len()
            )),
            NodeOutcome::NotFound { expanded, .. } => {
                out.push_str(&format!("  ✗ {} (not found)\n", expanded))
            }
        }
    }

    out
}
