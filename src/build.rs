//! Build orchestration.
//!
//! One build is a straight line with a wide middle:
//!
//! ```text
//! build_site()
//!     │
//!     ├── stage_input()          copy sources to <output>/.tmp_input
//!     ├── TocService::discover() parse every toc.yaml on the stage
//!     ├── sweep_unreferenced()   delete unlisted content from the stage
//!     ├── process_pages()        bounded fan-out over navigation entries,
//!     │                          then the single-page flush
//!     └── cleanup                remove the stage, log the summary
//! ```
//!
//! The staged copy is what makes the destructive stages safe: the filter
//! rewrites and the sweep deletions only ever touch the copy, and every
//! entry is read from the same frozen snapshot of the tree.

use crate::{
    aggregate::AggregationStore,
    config::SiteConfig,
    log,
    pipeline::{BuildContext, EntryFailure, exclude, process_pages},
    render::CommonMarkEngine,
    toc::TocService,
};
use anyhow::{Context, Result, bail};
use std::{
    fs,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

/// Working copy of the input tree, recreated under the output root for
/// every build and removed when the build finishes.
const TMP_INPUT_FOLDER: &str = ".tmp_input";

/// What one build did. Per-entry failures live here, not in the `Result`:
/// only setup failures abort a build.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Entries that completed their disposition.
    pub processed: usize,

    /// Entries skipped after a logged failure.
    pub failures: Vec<EntryFailure>,

    /// Unreferenced files removed from the staged copy, stage-relative.
    pub swept: Vec<PathBuf>,

    /// Single-page groups written by the flush.
    pub flushed_groups: usize,

    /// Error chain of a failed single-page flush.
    pub flush_error: Option<String>,
}

/// Build the site described by `config`.
///
/// Fails only on setup: unstageable input, unwalkable tree, malformed
/// manifest, bad ignore pattern, pool construction. Everything per-entry
/// is caught, logged and reported.
pub fn build_site(config: &SiteConfig) -> Result<BuildReport> {
    let started = Instant::now();
    let input = &config.build.input;
    let output = &config.build.output;

    fs::create_dir_all(output)
        .with_context(|| format!("failed to create output dir `{}`", output.display()))?;

    let stage = stage_input(input, output)?;
    let result = run_pipeline(config, &stage, output);

    // The stage goes away however the pipeline went.
    if let Err(err) = fs::remove_dir_all(&stage) {
        log!("warn"; "failed to remove `{}`: {err}", stage.display());
    }

    let report = result?;
    log_build_result(&report, started.elapsed());
    Ok(report)
}

// ============================================================================
// Phases
// ============================================================================

/// Recreate `<output>/.tmp_input` as a copy of the input tree.
///
/// VCS metadata is dropped from the copy; nothing else is filtered here:
/// the sweep decides what content survives.
fn stage_input(input: &Path, output: &Path) -> Result<PathBuf> {
    let stage = output.join(TMP_INPUT_FOLDER);

    if stage.starts_with(input) {
        bail!(
            "output dir `{}` must not live inside the input tree `{}`",
            output.display(),
            input.display()
        );
    }

    if stage.exists() {
        fs::remove_dir_all(&stage)
            .with_context(|| format!("failed to clear stale stage `{}`", stage.display()))?;
    }
    fs::create_dir_all(&stage)
        .with_context(|| format!("failed to create stage `{}`", stage.display()))?;

    let options = fs_extra::dir::CopyOptions::new()
        .overwrite(true)
        .content_only(true);
    fs_extra::dir::copy(input, &stage, &options)
        .with_context(|| format!("failed to stage `{}`", input.display()))?;

    let vcs = stage.join(".git");
    if vcs.exists() {
        fs::remove_dir_all(&vcs)
            .with_context(|| format!("failed to drop VCS metadata from `{}`", stage.display()))?;
    }

    Ok(stage)
}

fn run_pipeline(config: &SiteConfig, stage: &Path, output: &Path) -> Result<BuildReport> {
    let toc = TocService::discover(stage)?;
    log!(
        "toc";
        "{} manifests, {} entries",
        toc.toc_dirs().count(),
        toc.navigation_paths().len()
    );

    let swept = exclude::sweep_unreferenced(&toc, &config.build.ignore)?;
    if !swept.is_empty() {
        log!("sweep"; "removed {} unreferenced files", swept.len());
    }

    let engine = CommonMarkEngine::new();
    let store = AggregationStore::new();
    let ctx = BuildContext {
        config,
        input_root: stage.to_path_buf(),
        output_root: output.to_path_buf(),
        engine: &engine,
        leading_filter: None,
        contributors: None,
    };

    let process = process_pages(&ctx, &toc, &store)?;

    Ok(BuildReport {
        processed: process.processed,
        failures: process.failures,
        swept,
        flushed_groups: process.flushed_groups,
        flush_error: process.flush_error,
    })
}

/// Summary line, shaped by how the build went.
fn log_build_result(report: &BuildReport, elapsed: Duration) {
    let total = report.processed + report.failures.len();

    if total == 0 {
        log!("warn"; "no entries found, check the toc.yaml manifests");
    } else if report.failures.is_empty() {
        log!("build"; "done: {} entries in {elapsed:.2?}", report.processed);
    } else {
        log!(
            "build";
            "done with {} failures: {}/{total} entries in {elapsed:.2?}",
            report.failures.len(),
            report.processed
        );
    }
}

// ============================================================================
// Tests
// ============================================================================
