//! Single-page aggregation: one combined document per TOC directory.
//!
//! Workers submit rendered bodies into the [`AggregationStore`] as they
//! finish; after the join barrier the flush drains it once. Per group the
//! flush re-derives the manifest's document order (arrival order is
//! meaningless under parallel fan-out), interleaves the bodies into one
//! combined body, and writes two artifacts next to the section's other
//! output: a viewable `single-page.html` and a `single-page.json`
//! snapshot for client-side reuse.

mod store;

pub use store::{AggregationStore, PageResult, SinglePageGroup};

use crate::{
    log,
    pipeline::{BuildContext, meta::MetaOptions, meta::whitelist_resources},
    render::{PageBundle, PageState, RouterState, render_static_markup},
    toc::{TocService, anchor_slug},
    utils::paths::to_slash,
};
use anyhow::{Context, Result};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

/// Viewable combined page, written per TOC directory.
pub const SINGLE_PAGE_FILENAME: &str = "single-page.html";

/// Serialized combined snapshot, written next to the viewable page.
pub const SINGLE_PAGE_DATA_FILENAME: &str = "single-page.json";

/// Drain the store and write both artifacts for every non-empty group.
///
/// Returns the number of groups written. One failure anywhere stops the
/// pass; groups already written stay on disk, and the caller records the
/// error instead of aborting the build.
pub fn flush_single_pages(
    ctx: &BuildContext<'_>,
    toc: &TocService,
    store: &AggregationStore,
) -> Result<usize> {
    let mut flushed = 0;

    for (toc_dir, group) in store.drain() {
        if group.is_empty() {
            continue;
        }

        write_group(ctx, toc, &toc_dir, group.into_pages())?;
        flushed += 1;
    }

    Ok(flushed)
}

fn write_group(
    ctx: &BuildContext<'_>,
    toc: &TocService,
    toc_dir: &Path,
    mut pages: Vec<PageResult>,
) -> Result<()> {
    let placement = manifest_placement(toc, toc_dir);

    // Manifest order, not arrival order. Unlisted strays sink to the end
    // in their arrival order (stable sort).
    pages.sort_by_key(|page| {
        placement
            .get(&page.source)
            .map_or(usize::MAX, |(position, _)| *position)
    });

    let body = join_page_bodies(&pages, &placement);

    // First titled page in manifest order names the combined document.
    let title = pages.iter().find_map(|page| page.title.clone());

    let resources = MetaOptions {
        resources: Some(whitelist_resources(&ctx.config.build.resources)),
        ..MetaOptions::default()
    }
    .resources_json();

    let bundle = PageBundle {
        data: PageState {
            leading: false,
            html: body,
            title,
            headings: Vec::new(),
            meta: resources,
            toc: toc
                .toc_in_dir(toc_dir)
                .map(|manifest| manifest.for_single_page(SINGLE_PAGE_FILENAME)),
        },
        router: RouterState {
            pathname: SINGLE_PAGE_FILENAME.to_owned(),
        },
        lang: ctx.config.base.language.clone(),
    };

    let rel_dir = toc_dir
        .strip_prefix(&ctx.input_root)
        .unwrap_or(Path::new(""));
    let out_dir = ctx.output_root.join(rel_dir);
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create output dir `{}`", out_dir.display()))?;

    let page_path = out_dir.join(SINGLE_PAGE_FILENAME);
    let markup = render_static_markup(&bundle, &ctx.config.base.title);
    fs::write(&page_path, markup)
        .with_context(|| format!("failed to write `{}`", page_path.display()))?;

    let data_path = out_dir.join(SINGLE_PAGE_DATA_FILENAME);
    let snapshot = serde_json::to_string(&bundle).context("failed to serialize snapshot")?;
    fs::write(&data_path, snapshot)
        .with_context(|| format!("failed to write `{}`", data_path.display()))?;

    log!("single"; "{}", to_slash(&rel_dir.join(SINGLE_PAGE_FILENAME)));
    Ok(())
}

/// Map each entry of the directory's manifest to its document-order
/// position and its anchor inside the combined page.
///
/// Anchors are slugged from the manifest's own hrefs, so they agree with
/// the rewritten TOC whatever the alias shape. First listing wins for
/// entries a manifest names twice.
fn manifest_placement(
    toc: &TocService,
    toc_dir: &Path,
) -> HashMap<PathBuf, (usize, String)> {
    let raw_order = toc
        .toc_in_dir(toc_dir)
        .map(|manifest| manifest.document_order())
        .unwrap_or_default();
    let normalized_order = toc.document_order(toc_dir);

    let mut placement = HashMap::new();
    for (position, (normalized, raw)) in
        normalized_order.into_iter().zip(raw_order).enumerate()
    {
        placement
            .entry(normalized)
            .or_insert_with(|| (position, anchor_slug(&to_slash(&raw))));
    }
    placement
}

/// Interleave page bodies, each wrapped in the section anchor its TOC
/// entry points at.
fn join_page_bodies(
    pages: &[PageResult],
    placement: &HashMap<PathBuf, (usize, String)>,
) -> String {
    let sections: Vec<String> = pages
        .iter()
        .map(|page| {
            let anchor = placement
                .get(&page.source)
                .map(|(_, anchor)| anchor.clone())
                .unwrap_or_else(|| anchor_slug(&to_slash(&page.source)));
            format!("<section id=\"{anchor}\">\n{}</section>", page.html)
        })
        .collect();

    sections.join("\n")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::SiteConfig, render::CommonMarkEngine};
    use tempfile::TempDir;

    struct Fixture {
        input: TempDir,
        output: TempDir,
        toc: TocService,
        config: SiteConfig,
        engine: CommonMarkEngine,
    }

    impl Fixture {
        fn new(files: &[(&str, &str)]) -> Self {
            let input = TempDir::new().unwrap();
            for (rel, content) in files {
                let path = input.path().join(rel);
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent).unwrap();
                }
                fs::write(path, content).unwrap();
            }
            let toc = TocService::discover(input.path()).unwrap();

            let mut config = SiteConfig::default();
            config.build.single_page = true;

            Self {
                input,
                output: TempDir::new().unwrap(),
                toc,
                config,
                engine: CommonMarkEngine::new(),
            }
        }

        fn ctx(&self) -> BuildContext<'_> {
            BuildContext {
                config: &self.config,
                input_root: self.input.path().to_path_buf(),
                output_root: self.output.path().to_path_buf(),
                engine: &self.engine,
                leading_filter: None,
                contributors: None,
            }
        }

        fn offer(&self, store: &AggregationStore, source: &str, html: &str) {
            store.offer(
                self.input.path(),
                false,
                PageResult {
                    source: PathBuf::from(source),
                    html: html.to_owned(),
                    title: None,
                },
            );
        }
    }

    #[test]
    fn test_flush_orders_by_manifest_not_arrival() {
        let fixture = Fixture::new(&[(
            "toc.yaml",
            "items:\n  - href: a.md\n  - href: b.md\n  - href: c.md\n",
        )]);

        let store = AggregationStore::new();
        // Arrival order scrambled on purpose.
        fixture.offer(&store, "c.md", "<p>C</p>\n");
        fixture.offer(&store, "a.md", "<p>A</p>\n");
        fixture.offer(&store, "b.md", "<p>B</p>\n");

        let flushed = flush_single_pages(&fixture.ctx(), &fixture.toc, &store).unwrap();
        assert_eq!(flushed, 1);

        let html =
            fs::read_to_string(fixture.output.path().join(SINGLE_PAGE_FILENAME)).unwrap();
        let a = html.find("<p>A</p>").unwrap();
        let b = html.find("<p>B</p>").unwrap();
        let c = html.find("<p>C</p>").unwrap();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_flush_wraps_bodies_in_manifest_anchors() {
        let fixture = Fixture::new(&[(
            "toc.yaml",
            "items:\n  - href: install.md\n  - href: advanced/tuning.md\n",
        )]);

        let store = AggregationStore::new();
        fixture.offer(&store, "install.md", "<p>install</p>\n");
        fixture.offer(&store, "advanced/tuning.md", "<p>tuning</p>\n");

        flush_single_pages(&fixture.ctx(), &fixture.toc, &store).unwrap();

        let html =
            fs::read_to_string(fixture.output.path().join(SINGLE_PAGE_FILENAME)).unwrap();
        assert!(html.contains("<section id=\"install\">"));
        assert!(html.contains("<section id=\"advanced-tuning\">"));
    }

    #[test]
    fn test_snapshot_carries_rewritten_toc_and_resources() {
        let mut fixture = Fixture::new(&[(
            "toc.yaml",
            "title: Guide\nitems:\n  - href: a.md\n",
        )]);
        fixture
            .config
            .build
            .resources
            .insert("style".into(), vec!["custom.css".into()]);
        fixture
            .config
            .build
            .resources
            .insert("csp".into(), vec!["policy".into()]);

        let store = AggregationStore::new();
        fixture.offer(&store, "a.md", "<p>a</p>\n");

        flush_single_pages(&fixture.ctx(), &fixture.toc, &store).unwrap();

        let snapshot =
            fs::read_to_string(fixture.output.path().join(SINGLE_PAGE_DATA_FILENAME)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&snapshot).unwrap();

        assert_eq!(json["data"]["leading"], false);
        assert_eq!(json["data"]["headings"], serde_json::json!([]));
        assert_eq!(json["router"]["pathname"], "single-page.html");
        assert_eq!(
            json["data"]["toc"]["items"][0]["href"],
            "single-page.html#a"
        );
        // Resource map rides along whitelisted, even without the
        // custom-resources flag.
        assert_eq!(json["data"]["meta"]["style"][0], "custom.css");
        assert!(json["data"]["meta"].get("csp").is_none());
    }

    #[test]
    fn test_combined_title_from_first_titled_page() {
        let fixture = Fixture::new(&[(
            "toc.yaml",
            "items:\n  - href: a.md\n  - href: b.md\n",
        )]);

        let store = AggregationStore::new();
        // Arrival order reversed; a.md carries no title of its own.
        store.offer(
            fixture.input.path(),
            false,
            PageResult {
                source: PathBuf::from("b.md"),
                html: "<p>b</p>\n".to_owned(),
                title: Some("Beta".to_owned()),
            },
        );
        store.offer(
            fixture.input.path(),
            false,
            PageResult {
                source: PathBuf::from("a.md"),
                html: "<p>a</p>\n".to_owned(),
                title: None,
            },
        );

        flush_single_pages(&fixture.ctx(), &fixture.toc, &store).unwrap();

        let html =
            fs::read_to_string(fixture.output.path().join(SINGLE_PAGE_FILENAME)).unwrap();
        assert!(html.contains("<title>Beta</title>"));
    }

    #[test]
    fn test_flush_writes_into_section_directory() {
        let fixture = Fixture::new(&[
            ("guide/toc.yaml", "items:\n  - href: a.md\n"),
        ]);

        let store = AggregationStore::new();
        store.offer(
            &fixture.input.path().join("guide"),
            false,
            PageResult {
                source: PathBuf::from("guide/a.md"),
                html: "<p>a</p>\n".to_owned(),
                title: None,
            },
        );

        flush_single_pages(&fixture.ctx(), &fixture.toc, &store).unwrap();

        assert!(fixture.output.path().join("guide").join(SINGLE_PAGE_FILENAME).exists());
        assert!(
            fixture
                .output
                .path()
                .join("guide")
                .join(SINGLE_PAGE_DATA_FILENAME)
                .exists()
        );
    }

    #[test]
    fn test_flush_empty_store_writes_nothing() {
        let fixture = Fixture::new(&[("toc.yaml", "items:\n  - href: a.md\n")]);

        let store = AggregationStore::new();
        let flushed = flush_single_pages(&fixture.ctx(), &fixture.toc, &store).unwrap();

        assert_eq!(flushed, 0);
        assert!(!fixture.output.path().join(SINGLE_PAGE_FILENAME).exists());
    }
}
