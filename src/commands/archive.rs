/// `datadeps archive` command implementation
///
/// Bundles the newest data the script depends on into
/// `<data_root>/archive_script_data_dependencies_<timestamp>/data.zip`.
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use zip::CompressionMethod;

use crate::archive::{manifest_contents, ArchiveSummary, DataArchive, ARCHIVE_NAME, MANIFEST_NAME};
use crate::cli::ArchiveArgs;
use crate::cli_utils::datadeps_prefix;
use crate::data_path::DataPathResolver;
use crate::discovery::{discover, Discovery};

use super::ScriptContext;

/// Label of the output directories this command creates
pub const TOOL_NAME: &str = "archive_script_data_dependencies";

pub fn run(args: &ArchiveArgs) -> Result<()> {
    let ctx = ScriptContext::prepare(&args.script)?;

    let compression = if args.stored {
        CompressionMethod::Stored
    } else {
        ctx.config.config.compression_method()?
    };

    let output_dir = ctx
        .store
        .create_data_path(TOOL_NAME)
        .context("Failed to create output directory")?;

    let summary = archive_script_data(
        &ctx.script_name,
        &ctx.script_dir,
        &ctx.data_nodes,
        ctx.alpha,
        &ctx.store,
        &output_dir,
        compression,
    )?;

    eprintln!(
        "{} Archived {} files ({} bytes) from {} to {}",
        datadeps_prefix(),
        summary.data_entries,
        summary.bytes,
        ctx.script_path.display(),
        summary.path.display()
    );
    println!("{}", output_dir.display());

    Ok(())
}

/// Write the manifest and archive of the script's data into `output_dir`
///
/// Any failure after the archive was opened discards it, so a `data.zip`
/// left behind is always complete.
pub fn archive_script_data<'a, I, R>(
    script_name: &str,
    script_dir: &Path,
    data_nodes: I,
    alpha: f64,
    resolver: &R,
    output_dir: &Path,
    compression: CompressionMethod,
) -> Result<ArchiveSummary>
where
    I: IntoIterator<Item = &'a String>,
    R: DataPathResolver + ?Sized,
{
    let manifest_path = output_dir.join(MANIFEST_NAME);
    fs::write(&manifest_path, manifest_contents(script_name))
        .with_context(|| format!("Failed to write manifest: {}", manifest_path.display()))?;

    let discovery = discover(data_nodes, alpha, resolver)?;
    write_archive(script_name, script_dir, &discovery, output_dir, compression)
}

/// Write `data.zip` holding the manifest entry and every discovered file
fn write_archive(
    script_name: &str,
    script_dir: &Path,
    discovery: &Discovery,
    output_dir: &Path,
    compression: CompressionMethod,
) -> Result<ArchiveSummary> {
    let zip_path = archive_path(output_dir);
    info!(path = %zip_path.display(), "Archiving data");

    let mut archive = DataArchive::create(&zip_path, script_dir, compression)
        .with_context(|| format!("Failed to create archive: {}", zip_path.display()))?;

    match populate(&mut archive, script_name, discovery) {
        Ok(()) => Ok(archive.finish()?),
        Err(e) => {
            error!(path = %zip_path.display(), error = %e, "Archiving failed; discarding archive");
            archive.abort();
            Err(e)
        }
    }
}

fn populate(archive: &mut DataArchive, script_name: &str, discovery: &Discovery) -> Result<()> {
    archive.write_manifest(script_name)?;

    for file in discovery.files() {
        archive
            .add_file(file)
            .with_context(|| format!("Failed to archive {}", file.display()))?;
    }

    Ok(())
}

/// Path of the archive inside an output directory
pub fn archive_path(output_dir: &Path) -> PathBuf {
    output_dir.join(ARCHIVE_NAME)
}
