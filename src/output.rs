//! Conversion results and staged (atomic) output writing.
//!
//! Delegates never write to the destination path directly. They write into a
//! [`StagedFile`] or [`StagedDir`] created next to the destination, and only
//! [`StagedFile::commit`] / [`StagedDir::commit`] move the result into place.
//! If a delegate fails half-way the staging area is dropped and removed, so
//! the caller never finds a truncated file or pages 1–5 of a 10-page job.

use crate::error::ConvertError;
use crate::format::FormatTag;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempDir};
use tracing::debug;

const STAGING_PREFIX: &str = ".uconvert-";

/// Files produced by a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "paths", rename_all = "snake_case")]
pub enum ConvertedOutput {
    /// Every conversion except pdf→image writes exactly one file.
    SingleFile(PathBuf),
    /// pdf→image writes one file per page, in page order.
    MultiFile(Vec<PathBuf>),
}

impl ConvertedOutput {
    /// All produced paths, in order.
    pub fn paths(&self) -> Vec<&Path> {
        match self {
            ConvertedOutput::SingleFile(p) => vec![p.as_path()],
            ConvertedOutput::MultiFile(ps) => ps.iter().map(PathBuf::as_path).collect(),
        }
    }
}

/// What a conversion request led to, when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConversionOutcome {
    /// The delegate ran and its output is in place.
    Converted { output: ConvertedOutput },
    /// The capability matrix has no route for this pair. Nothing was done;
    /// this is informational and not a failure.
    Unsupported { input: FormatTag, output: FormatTag },
}

impl ConversionOutcome {
    pub fn is_converted(&self) -> bool {
        matches!(self, ConversionOutcome::Converted { .. })
    }

    /// The produced output, if any.
    pub fn output(&self) -> Option<&ConvertedOutput> {
        match self {
            ConversionOutcome::Converted { output } => Some(output),
            ConversionOutcome::Unsupported { .. } => None,
        }
    }

    /// Human-readable one-line summary.
    pub fn message(&self) -> String {
        match self {
            ConversionOutcome::Converted {
                output: ConvertedOutput::SingleFile(p),
            } => format!("File converted and saved to: {}", p.display()),
            ConversionOutcome::Converted {
                output: ConvertedOutput::MultiFile(ps),
            } => {
                let folder = ps
                    .first()
                    .and_then(|p| p.parent())
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                format!("PDF converted to {} images in folder: {}", ps.len(), folder)
            }
            ConversionOutcome::Unsupported { input, output } => {
                format!("conversion not supported for this pair ({input} → {output})")
            }
        }
    }
}

/// Create `dir` (and parents) if it does not exist yet.
pub(crate) fn ensure_dir(dir: &Path) -> Result<(), ConvertError> {
    if dir.as_os_str().is_empty() || dir.is_dir() {
        return Ok(());
    }
    std::fs::create_dir_all(dir).map_err(|e| ConvertError::write_failed(dir, e))?;
    debug!("Created output directory {}", dir.display());
    Ok(())
}

/// Parent of `path`, with `""` mapped to the current directory.
pub(crate) fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// A temp file in the destination's directory, renamed over it on commit.
pub struct StagedFile {
    tmp: NamedTempFile,
    dest: PathBuf,
}

impl StagedFile {
    /// Stage a write to `dest`, creating its directory if needed.
    pub fn create(dest: &Path) -> Result<Self, ConvertError> {
        let dir = parent_dir(dest);
        ensure_dir(&dir)?;
        let tmp = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .suffix(".part")
            .tempfile_in(&dir)
            .map_err(|e| ConvertError::write_failed(dest, e))?;
        Ok(Self {
            tmp,
            dest: dest.to_path_buf(),
        })
    }

    /// Where the staged bytes currently live.
    pub fn path(&self) -> &Path {
        self.tmp.path()
    }

    pub fn file(&mut self) -> &mut File {
        self.tmp.as_file_mut()
    }

    pub fn dest(&self) -> &Path {
        &self.dest
    }

    /// Move the staged file over the destination.
    pub fn commit(self) -> Result<PathBuf, ConvertError> {
        let dest = self.dest;
        self.tmp
            .persist(&dest)
            .map_err(|e| ConvertError::write_failed(&dest, e.error))?;
        debug!("Committed {}", dest.display());
        Ok(dest)
    }
}

/// A temp directory inside the destination directory for multi-file output.
pub struct StagedDir {
    tmp: TempDir,
    dest_dir: PathBuf,
    names: Vec<String>,
}

impl StagedDir {
    pub fn create(dest_dir: &Path) -> Result<Self, ConvertError> {
        ensure_dir(dest_dir)?;
        let tmp = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(dest_dir)
            .map_err(|e| ConvertError::write_failed(dest_dir, e))?;
        Ok(Self {
            tmp,
            dest_dir: dest_dir.to_path_buf(),
            names: Vec::new(),
        })
    }

    /// Reserve `name` and return the staging path to write it to.
    pub fn stage(&mut self, name: impl Into<String>) -> PathBuf {
        let name = name.into();
        let path = self.tmp.path().join(&name);
        self.names.push(name);
        path
    }

    /// Move every staged file into the destination directory, in staging order.
    pub fn commit(self) -> Result<Vec<PathBuf>, ConvertError> {
        let mut out = Vec::with_capacity(self.names.len());
        for name in &self.names {
            let from = self.tmp.path().join(name);
            let to = self.dest_dir.join(name);
            std::fs::rename(&from, &to).map_err(|e| ConvertError::write_failed(&to, e))?;
            out.push(to);
        }
        debug!(
            "Committed {} files into {}",
            out.len(),
            self.dest_dir.display()
        );
        Ok(out)
    }
}
