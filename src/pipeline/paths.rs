//! Path resolution for navigation entries.
//!
//! `PathData` is computed once per entry and carries every path the
//! dispositions need: where to read, where to write, and which TOC
//! directory owns the file. Pure path arithmetic plus one in-memory
//! ownership lookup; no filesystem access.

use crate::{config::OutputFormat, toc::TocService, utils::paths::to_slash};
use anyhow::{Context, Result, anyhow};
use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
};

/// Resolved paths for one navigation entry.
///
/// # Fields
///
/// | Field         | Example (`guide/install.md`, html) |
/// |---------------|------------------------------------|
/// | `source_rel`  | `guide/install.md`                 |
/// | `source`      | `<input>/guide/install.md`         |
/// | `file_name`   | `install.md`                       |
/// | `base_name`   | `install`                          |
/// | `extension`   | `md`                               |
/// | `output_dir`  | `<output>/guide`                   |
/// | `output_path` | `<output>/guide/install.html`      |
/// | `toc_dir`     | `<input>/guide`                    |
#[derive(Debug, Clone)]
pub struct PathData {
    /// Entry path as listed in the manifest, relative to the input root.
    pub source_rel: PathBuf,
    /// Absolute input path.
    pub source: PathBuf,
    /// File name with extension.
    pub file_name: String,
    /// File name without extension.
    pub base_name: String,
    /// Extension without the dot, empty when absent.
    pub extension: String,
    /// Output directory: `<output>/<dirname(entry)>`.
    pub output_dir: PathBuf,
    /// Output file: `<output_dir>/<base_name>.<format>`.
    pub output_path: PathBuf,
    /// Requested output format.
    pub format: OutputFormat,
    /// Directory of the manifest owning this entry (absolute).
    pub toc_dir: PathBuf,
}

impl PathData {
    /// Resolve a navigation entry against the input/output roots.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry has no file name or no manifest
    /// claims it (entries always originate from a manifest, so a miss
    /// means the navigation list and ownership map diverged).
    pub fn resolve(
        entry: &Path,
        input_root: &Path,
        output_root: &Path,
        format: OutputFormat,
        toc: &TocService,
    ) -> Result<Self> {
        let file_name = entry
            .file_name()
            .and_then(OsStr::to_str)
            .ok_or_else(|| anyhow!("entry has no file name: {}", entry.display()))?
            .to_owned();
        let extension = entry
            .extension()
            .and_then(OsStr::to_str)
            .unwrap_or_default()
            .to_owned();
        let base_name = entry
            .file_stem()
            .and_then(OsStr::to_str)
            .unwrap_or(&file_name)
            .to_owned();

        let source = input_root.join(entry);
        let rel_dir = entry.parent().unwrap_or(Path::new(""));
        let output_dir = output_root.join(rel_dir);
        let output_path = output_dir.join(format!("{base_name}.{format}"));

        let toc_dir = toc
            .toc_dir(&source)
            .with_context(|| format!("no manifest owns `{}`", entry.display()))?
            .to_path_buf();

        Ok(Self {
            source_rel: entry.to_path_buf(),
            source,
            file_name,
            base_name,
            extension,
            output_dir,
            output_path,
            format,
            toc_dir,
        })
    }

    /// Whether the entry is a structured index file.
    pub fn is_yaml(&self) -> bool {
        self.extension == "yaml"
    }

    /// Whether the entry is a markdown file.
    pub fn is_markdown(&self) -> bool {
        self.extension == "md"
    }

    /// Artifact path relative to the owning TOC directory, with the
    /// output extension. Falls back to the bare file name for entries
    /// aliased in from outside the owner's subtree.
    pub fn bundle_pathname(&self) -> String {
        let rel = self
            .source
            .strip_prefix(&self.toc_dir)
            .unwrap_or_else(|_| Path::new(&self.file_name));
        to_slash(&rel.with_extension(self.format.extension()))
    }
}

// ============================================================================
// Tests
// ============================================================================
