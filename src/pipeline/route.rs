//! Disposition routing: one entry, exactly one handler.
//!
//! The router maps (extension, output format, build flags) to one of five
//! dispositions, first match wins:
//!
//! 1. **FilterLeading**: conditional filter over index manifests; the
//!    source is rewritten in place, then routing re-runs with the
//!    conditional flag cleared.
//! 2. **MergeResources**: md output, structured file, custom resources
//!    allowed; merges the allow-listed resource map into the document's
//!    metadata block.
//! 3. **Copy**: byte-copy, no renderer.
//! 4. **Markdown**: md output through the engine.
//! 5. **Render**: html output through the engine, plus a single-page
//!    submission when aggregation is on.
//!
//! The output directory is created before any disposition writes.

use super::{BuildContext, meta::MetaOptions, paths::PathData};
use crate::{
    aggregate::{AggregationStore, PageResult},
    config::OutputFormat,
    log,
    render::{TransformOptions, render_static_markup, resolve_to_bundle},
    toc::TocService,
};
use anyhow::{Context, Result};
use std::fs;

// ============================================================================
// Selection
// ============================================================================

/// The five ways an entry can be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    FilterLeading,
    MergeResources,
    Copy,
    Markdown,
    Render,
}

/// Pick the disposition for an entry. Deterministic in
/// (extension, format, flags); first match wins.
pub fn select(
    paths: &PathData,
    resolve_conditions: bool,
    allow_custom_resources: bool,
) -> Disposition {
    let yaml = paths.is_yaml();
    let markdown = paths.is_markdown();

    if resolve_conditions && yaml && paths.base_name == "index" {
        return Disposition::FilterLeading;
    }

    match paths.format {
        OutputFormat::Md if yaml && allow_custom_resources => Disposition::MergeResources,
        OutputFormat::Md if yaml => Disposition::Copy,
        OutputFormat::Html if !yaml && !markdown => Disposition::Copy,
        OutputFormat::Md => Disposition::Markdown,
        OutputFormat::Html => Disposition::Render,
    }
}

// ============================================================================
// Dispatch
// ============================================================================

/// Route one entry through its disposition.
///
/// Creates the output directory first; concurrent workers landing in the
/// same directory both succeed (`create_dir_all` is idempotent).
pub fn dispatch(
    ctx: &BuildContext<'_>,
    toc: &TocService,
    store: &AggregationStore,
    paths: &PathData,
    meta: &MetaOptions,
) -> Result<()> {
    fs::create_dir_all(&paths.output_dir).with_context(|| {
        format!("failed to create output dir `{}`", paths.output_dir.display())
    })?;

    execute(ctx, toc, store, paths, meta, ctx.config.build.resolve_conditions)
}

fn execute(
    ctx: &BuildContext<'_>,
    toc: &TocService,
    store: &AggregationStore,
    paths: &PathData,
    meta: &MetaOptions,
    resolve_conditions: bool,
) -> Result<()> {
    match select(paths, resolve_conditions, ctx.config.build.allow_custom_resources) {
        Disposition::FilterLeading => {
            if let Some(filter) = ctx.leading_filter {
                filter
                    .filter_file(&paths.source)
                    .with_context(|| format!("filter failed on `{}`", paths.source_rel.display()))?;
            }
            // The rewritten file takes one of the remaining dispositions.
            execute(ctx, toc, store, paths, meta, false)
        }
        Disposition::MergeResources => merge_resources(paths, meta),
        Disposition::Copy => copy_unchanged(paths),
        Disposition::Markdown => transform_markdown(ctx, paths, meta),
        Disposition::Render => render_page(ctx, toc, store, paths, meta),
    }
}

// ============================================================================
// Dispositions
// ============================================================================

/// Merge the allow-listed resource map into a structured file's `meta`
/// block and write the result, keeping the structured format.
///
/// A document that fails to parse (or isn't a mapping) is substituted
/// with an empty one; the resources still land in a fresh `meta` block.
fn merge_resources(paths: &PathData, meta: &MetaOptions) -> Result<()> {
    let content = fs::read_to_string(&paths.source)
        .with_context(|| format!("failed to read `{}`", paths.source.display()))?;

    let mut doc = match serde_yaml::from_str::<serde_yaml::Value>(&content) {
        Ok(serde_yaml::Value::Mapping(mapping)) => mapping,
        Ok(_) => serde_yaml::Mapping::new(),
        Err(err) => {
            log!("error"; "malformed `{}`: {err}", paths.source_rel.display());
            serde_yaml::Mapping::new()
        }
    };

    if let Some(resources) = &meta.resources {
        let meta_key = serde_yaml::Value::String("meta".into());
        let meta_block = doc
            .entry(meta_key)
            .or_insert_with(|| serde_yaml::Value::Mapping(serde_yaml::Mapping::new()));
        if !meta_block.is_mapping() {
            *meta_block = serde_yaml::Value::Mapping(serde_yaml::Mapping::new());
        }
        if let Some(block) = meta_block.as_mapping_mut() {
            for (kind, values) in resources {
                block.insert(
                    serde_yaml::Value::String(kind.as_str().into()),
                    serde_yaml::to_value(values)?,
                );
            }
        }
    }

    // Structured files keep their own name and extension in the output.
    let target = paths.output_dir.join(&paths.file_name);
    let merged = serde_yaml::to_string(&serde_yaml::Value::Mapping(doc))?;
    fs::write(&target, merged)
        .with_context(|| format!("failed to write `{}`", target.display()))
}

/// Byte-copy the source into the output directory under its own name.
fn copy_unchanged(paths: &PathData) -> Result<()> {
    let target = paths.output_dir.join(&paths.file_name);
    fs::copy(&paths.source, &target).with_context(|| {
        format!(
            "failed to copy `{}` to `{}`",
            paths.source.display(),
            target.display()
        )
    })?;
    Ok(())
}

/// Resolve markdown to markdown through the engine.
fn transform_markdown(ctx: &BuildContext<'_>, paths: &PathData, meta: &MetaOptions) -> Result<()> {
    let content = fs::read_to_string(&paths.source)
        .with_context(|| format!("failed to read `{}`", paths.source.display()))?;

    let opts = TransformOptions {
        path: &paths.source_rel,
        root: &ctx.input_root,
        meta,
    };
    let resolved = ctx.engine.to_markdown(&content, &opts)?;

    fs::write(&paths.output_path, resolved)
        .with_context(|| format!("failed to write `{}`", paths.output_path.display()))
}

/// Render a viewable page; in aggregation mode, submit the body too.
fn render_page(
    ctx: &BuildContext<'_>,
    toc: &TocService,
    store: &AggregationStore,
    paths: &PathData,
    meta: &MetaOptions,
) -> Result<()> {
    let bundle = resolve_to_bundle(paths, meta, toc, ctx.engine, &ctx.config.base.language)?;

    if ctx.config.build.single_page {
        store.offer(
            &paths.toc_dir,
            bundle.data.leading,
            PageResult {
                source: paths.source_rel.clone(),
                html: bundle.data.html.clone(),
                title: bundle.data.title.clone(),
            },
        );
    }

    let markup = render_static_markup(&bundle, &ctx.config.base.title);
    fs::write(&paths.output_path, markup)
        .with_context(|| format!("failed to write `{}`", paths.output_path.display()))
}

// ============================================================================
// Tests
// ============================================================================
