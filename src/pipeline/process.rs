//! Concurrent fan-out over the navigation list.
//!
//! Every entry is dispatched exactly once on a dedicated worker pool.
//! Completion order is unspecified; the pool's size is the only
//! concurrency bound. A failing entry is logged and recorded, never
//! propagated; one bad file must not abort the batch. After the pool
//! drains, aggregation (when enabled) flushes exactly once.

use super::{BuildContext, meta::MetaOptions, paths::PathData, route};
use crate::{aggregate, aggregate::AggregationStore, log, toc::TocService};
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// One navigation entry that failed, with its rendered error chain.
#[derive(Debug, Clone)]
pub struct EntryFailure {
    pub path: PathBuf,
    pub error: String,
}

/// What the fan-out did: completions, casualties, and the flush outcome.
#[derive(Debug, Default)]
pub struct ProcessReport {
    /// Entries that completed their disposition.
    pub processed: usize,

    /// Entries that were skipped after a logged failure.
    pub failures: Vec<EntryFailure>,

    /// Single-page groups written by the flush.
    pub flushed_groups: usize,

    /// Error chain of a failed flush; artifacts written before the
    /// failure are not rolled back.
    pub flush_error: Option<String>,
}

/// Process every navigation entry, then flush single-page groups.
///
/// Fails only on setup (pool construction); per-entry failures land in
/// the report.
pub fn process_pages(
    ctx: &BuildContext<'_>,
    toc: &TocService,
    store: &AggregationStore,
) -> Result<ProcessReport> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(ctx.config.build.workers)
        .thread_name(|i| format!("page-worker-{i}"))
        .build()
        .context("failed to build page worker pool")?;

    let entries = toc.navigation_paths();

    // install() returns only after every entry has settled.
    let failures: Vec<EntryFailure> = pool.install(|| {
        entries
            .par_iter()
            .filter_map(|entry| {
                log!("proc"; "{}", entry.display());
                match process_entry(ctx, toc, store, entry) {
                    Ok(()) => None,
                    Err(err) => {
                        log!("error"; "{}: {err:#}", entry.display());
                        Some(EntryFailure {
                            path: entry.clone(),
                            error: format!("{err:#}"),
                        })
                    }
                }
            })
            .collect()
    });

    let processed = entries.len() - failures.len();

    let (flushed_groups, flush_error) = if ctx.config.build.single_page {
        match aggregate::flush_single_pages(ctx, toc, store) {
            Ok(count) => (count, None),
            Err(err) => {
                log!("error"; "single-page flush failed: {err:#}");
                (0, Some(format!("{err:#}")))
            }
        }
    } else {
        (0, None)
    };

    Ok(ProcessReport {
        processed,
        failures,
        flushed_groups,
        flush_error,
    })
}

/// One entry: resolve paths, assemble context, dispatch.
fn process_entry(
    ctx: &BuildContext<'_>,
    toc: &TocService,
    store: &AggregationStore,
    entry: &Path,
) -> Result<()> {
    let paths = PathData::resolve(
        entry,
        &ctx.input_root,
        &ctx.output_root,
        ctx.config.build.format,
        toc,
    )?;
    let meta = MetaOptions::assemble(ctx.config, ctx.contributors);

    route::dispatch(ctx, toc, store, &paths, &meta)
}

// ============================================================================
// Tests
// ============================================================================
