//! Zip archive of discovered data files
//!
//! [`DataArchive`] moves through `Created → ManifestWritten → Populating →
//! Closed`. Data files can only be added after the manifest, and
//! [`DataArchive::finish`] consumes the archive, so nothing can be written
//! once it is closed.

use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{DatadepsError, Result};

/// Name of the manifest, both next to the archive and inside it
pub const MANIFEST_NAME: &str = "script_filename.txt";

/// Name of the archive inside the output directory
pub const ARCHIVE_NAME: &str = "data.zip";

/// Manifest text: the script's base filename, newline-terminated
pub fn manifest_contents(script_name: &str) -> String {
    format!("{}\n", script_name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveState {
    Created,
    ManifestWritten,
    Populating,
    Closed,
}

impl ArchiveState {
    fn name(self) -> &'static str {
        match self {
            ArchiveState::Created => "created",
            ArchiveState::ManifestWritten => "manifest-written",
            ArchiveState::Populating => "populating",
            ArchiveState::Closed => "closed",
        }
    }
}

/// Result of a finished archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub path: PathBuf,
    pub data_entries: usize,
    pub bytes: u64,
}

pub struct DataArchive {
    path: PathBuf,
    base_dir: PathBuf,
    options: SimpleFileOptions,
    writer: ZipWriter<File>,
    state: ArchiveState,
    data_entries: usize,
    bytes: u64,
}

impl DataArchive {
    /// Create a new archive at `path`; entries are named relative to `base_dir`
    pub fn create(
        path: impl Into<PathBuf>,
        base_dir: impl Into<PathBuf>,
        compression: CompressionMethod,
    ) -> Result<Self> {
        let path = path.into();
        let file = File::create(&path)?;
        Ok(Self::from_file(path, file, base_dir, compression))
    }

    fn from_file(
        path: PathBuf,
        file: File,
        base_dir: impl Into<PathBuf>,
        compression: CompressionMethod,
    ) -> Self {
        Self {
            path,
            base_dir: base_dir.into(),
            options: SimpleFileOptions::default().compression_method(compression),
            writer: ZipWriter::new(file),
            state: ArchiveState::Created,
            data_entries: 0,
            bytes: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> ArchiveState {
        self.state
    }

    /// Store the manifest entry naming the source script
    pub fn write_manifest(&mut self, script_name: &str) -> Result<()> {
        if self.state != ArchiveState::Created {
            return Err(self.invalid("write the manifest"));
        }

        let options = self.options;
        self.start_entry(MANIFEST_NAME, options)?;
        io::Write::write_all(&mut self.writer, manifest_contents(script_name).as_bytes())?;

        self.state = ArchiveState::ManifestWritten;
        Ok(())
    }

    /// Store `file` under its path relative to the base directory
    pub fn add_file(&mut self, file: &Path) -> Result<()> {
        match self.state {
            ArchiveState::ManifestWritten | ArchiveState::Populating => {}
            _ => return Err(self.invalid("add files")),
        }

        let entry = relative_entry_name(file, &self.base_dir)?;
        let mut source = File::open(file)?;
        let size = source.metadata()?.len();

        let options = self.options.large_file(size >= u64::from(u32::MAX));
        self.start_entry(&entry, options)?;
        let written = io::copy(&mut source, &mut self.writer)?;

        debug!(entry = %entry, size_bytes = written, "Archived file");
        self.state = ArchiveState::Populating;
        self.data_entries += 1;
        self.bytes += written;
        Ok(())
    }

    /// Write the central directory and close the file
    ///
    /// On failure the incomplete file is deleted.
    pub fn finish(self) -> Result<ArchiveSummary> {
        let Self {
            path,
            writer,
            data_entries,
            bytes,
            ..
        } = self;

        if let Err(source) = writer.finish() {
            discard(&path);
            return Err(DatadepsError::ArchiveWrite {
                entry: "<central directory>".to_string(),
                source,
            });
        }
        debug!(path = %path.display(), state = ArchiveState::Closed.name(), "Archive closed");

        Ok(ArchiveSummary {
            path,
            data_entries,
            bytes,
        })
    }

    /// Drop the archive and delete the partial file
    pub fn abort(self) {
        let Self { path, writer, .. } = self;
        drop(writer);
        discard(&path);
    }

    fn start_entry(&mut self, entry: &str, options: SimpleFileOptions) -> Result<()> {
        self.writer
            .start_file(entry, options)
            .map_err(|source| DatadepsError::ArchiveWrite {
                entry: entry.to_string(),
                source,
            })
    }

    fn invalid(&self, action: &'static str) -> DatadepsError {
        DatadepsError::InvalidState {
            state: self.state.name(),
            action,
        }
    }
}

fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        warn!(path = %path.display(), error = %e, "Failed to remove partial archive");
    }
}

/// Entry name of `file` relative to `base_dir`, `/`-separated
///
/// Entry names must match the files on disk, so non-UTF-8 names are rejected.
pub fn relative_entry_name(file: &Path, base_dir: &Path) -> Result<String> {
    let outside = || DatadepsError::PathOutsideRoot {
        file: file.to_path_buf(),
        root: base_dir.to_path_buf(),
    };

    let relative = file.strip_prefix(base_dir).map_err(|_| outside())?;

    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => match part.to_str() {
                Some(part) => parts.push(part),
                None => return Err(DatadepsError::NonUtf8Path(file.to_path_buf())),
            },
            Component::CurDir => {}
            _ => return Err(outside()),
        }
    }

    if parts.is_empty() {
        return Err(outside());
    }
    Ok(parts.join("/"))
}
