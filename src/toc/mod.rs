//! TOC manifest discovery and navigation lookups.
//!
//! Walks the input tree for `toc.yaml` manifests, flattens them into one
//! ordered navigation list, and answers ownership queries for the pipeline:
//! which manifest governs a file, and in what order a section's documents
//! appear.

mod types;

pub use types::{TOC_FILENAME, Toc, TocItem, anchor_slug};

use crate::utils::paths::normalize_path;
use anyhow::{Context, Result};
use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

/// Navigation graph built from every `toc.yaml` under the input root.
///
/// Entry paths handed out by this service are relative to the input root;
/// ownership lookups take absolute paths.
#[derive(Debug, Default)]
pub struct TocService {
    input_root: PathBuf,

    /// Parsed manifests keyed by their directory (absolute).
    tocs: BTreeMap<PathBuf, Toc>,

    /// Every manifest entry in discovery-then-document order.
    /// A file listed by two manifests appears twice.
    nav: Vec<PathBuf>,

    /// Absolute entry path -> directory of the owning manifest.
    /// First registrar wins for aliased entries.
    owners: HashMap<PathBuf, PathBuf>,
}

impl TocService {
    /// Walk `input_root` for manifests and flatten them into the navigation
    /// list. Deterministic: directories are visited in sorted order.
    pub fn discover(input_root: &Path) -> Result<Self> {
        let mut service = Self {
            input_root: input_root.to_path_buf(),
            ..Self::default()
        };

        let manifests: Vec<PathBuf> = WalkDir::new(input_root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file() && e.file_name() == TOC_FILENAME)
            .map(|e| e.into_path())
            .collect();

        for manifest in &manifests {
            service.register(manifest)?;
        }

        Ok(service)
    }

    /// Parse one manifest and append its entries to the navigation list.
    fn register(&mut self, manifest: &Path) -> Result<()> {
        let content = fs::read_to_string(manifest)
            .with_context(|| format!("failed to read manifest `{}`", manifest.display()))?;
        let toc: Toc = serde_yaml::from_str(&content)
            .with_context(|| format!("malformed manifest `{}`", manifest.display()))?;

        let toc_dir = manifest
            .parent()
            .unwrap_or(&self.input_root)
            .to_path_buf();
        let rel_dir = toc_dir
            .strip_prefix(&self.input_root)
            .unwrap_or(Path::new(""))
            .to_path_buf();

        for entry in toc.document_order() {
            // Lexical normalization so `a/../shared.md` and `shared.md`
            // land on the same owner key.
            let rel = normalize_path(&rel_dir.join(entry));
            let abs = self.input_root.join(&rel);
            self.owners.entry(abs).or_insert_with(|| toc_dir.clone());
            self.nav.push(rel);
        }

        self.tocs.insert(toc_dir, toc);
        Ok(())
    }

    /// Ordered navigation entries, relative to the input root.
    pub fn navigation_paths(&self) -> &[PathBuf] {
        &self.nav
    }

    /// Directory of the manifest owning `path` (absolute).
    pub fn toc_dir(&self, path: &Path) -> Option<&Path> {
        self.owners.get(path).map(PathBuf::as_path)
    }

    /// Manifest covering `path` (absolute), if any.
    pub fn toc_for(&self, path: &Path) -> Option<&Toc> {
        self.toc_dir(path).and_then(|dir| self.tocs.get(dir))
    }

    /// Manifest declared in `toc_dir` (absolute).
    pub fn toc_in_dir(&self, toc_dir: &Path) -> Option<&Toc> {
        self.tocs.get(toc_dir)
    }

    /// Entry paths of the manifest in `toc_dir`, in document order,
    /// relative to the input root.
    pub fn document_order(&self, toc_dir: &Path) -> Vec<PathBuf> {
        let rel_dir = toc_dir
            .strip_prefix(&self.input_root)
            .unwrap_or(Path::new(""));

        self.tocs
            .get(toc_dir)
            .map(|toc| {
                toc.document_order()
                    .into_iter()
                    .map(|entry| normalize_path(&rel_dir.join(entry)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Directories that declare a manifest (absolute), sorted.
    pub fn toc_dirs(&self) -> impl Iterator<Item = &Path> {
        self.tocs.keys().map(PathBuf::as_path)
    }

    pub fn input_root(&self) -> &Path {
        &self.input_root
    }
}

// ============================================================================
// Tests
// ============================================================================
