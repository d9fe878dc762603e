//! Build-owned accumulation of single-page results.
//!
//! One `AggregationStore` lives for exactly one build. Workers offer page
//! results as entries complete, in whatever order they finish; the store
//! groups them by owning TOC directory, rejects leading pages, and
//! collapses duplicate submissions of the same source path. The flush
//! drains it once at the end of the run.

use parking_lot::Mutex;
use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
};

/// Rendered body of one page, queued for a combined document.
#[derive(Debug, Clone)]
pub struct PageResult {
    /// Source path relative to the input root; also the dedup key.
    pub source: PathBuf,
    /// Rendered HTML body (not the full page shell).
    pub html: String,
    /// Page title, when the engine found one.
    pub title: Option<String>,
}

/// Accumulated pages of one TOC directory, in arrival order.
#[derive(Debug, Default)]
pub struct SinglePageGroup {
    seen: HashSet<PathBuf>,
    pages: Vec<PageResult>,
}

impl SinglePageGroup {
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn pages(&self) -> &[PageResult] {
        &self.pages
    }

    pub fn into_pages(self) -> Vec<PageResult> {
        self.pages
    }
}

/// Thread-safe map from TOC directory to its accumulated pages.
///
/// Groups are created lazily on first contribution. Appends from
/// concurrent workers are serialized by the lock; the dedup check and
/// the push happen under the same guard, so a source path can never be
/// appended twice even when offered from two threads at once.
#[derive(Debug, Default)]
pub struct AggregationStore {
    groups: Mutex<HashMap<PathBuf, SinglePageGroup>>,
}

impl AggregationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a completed page to its group.
    ///
    /// Returns `false` when the page was rejected: leading pages never
    /// enter a combined body, and a source path already present in the
    /// group (an alias reachable through two manifests) is kept once.
    pub fn offer(&self, toc_dir: &Path, leading: bool, page: PageResult) -> bool {
        if leading {
            return false;
        }

        let mut groups = self.groups.lock();
        let group = groups.entry(toc_dir.to_path_buf()).or_default();

        if !group.seen.insert(page.source.clone()) {
            return false;
        }

        group.pages.push(page);
        true
    }

    /// Take every group out of the store, sorted by TOC directory.
    ///
    /// The store is empty afterwards, so a second flush writes nothing.
    pub fn drain(&self) -> Vec<(PathBuf, SinglePageGroup)> {
        let mut groups = self.groups.lock();
        let mut drained: Vec<_> = std::mem::take(&mut *groups).into_iter().collect();
        drained.sort_by(|a, b| a.0.cmp(&b.0));
        drained
    }

    /// Number of groups currently held.
    pub fn group_count(&self) -> usize {
        self.groups.lock().len()
    }
}

// ============================================================================
// Tests
// ============================================================================
