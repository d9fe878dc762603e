//! Serde model of `toc.yaml` manifests.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Manifest file name each section directory carries.
pub const TOC_FILENAME: &str = "toc.yaml";

/// A `toc.yaml` manifest: the ordered navigation structure of one section.
///
/// # Example
/// ```yaml
/// title: Guide
/// href: index.yaml
/// items:
///   - name: Install
///     href: install.md
///   - name: Advanced
///     items:
///       - name: Tuning
///         href: advanced/tuning.md
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Toc {
    /// Section title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Leading page of the section, usually `index.yaml`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,

    /// Navigation tree in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<TocItem>,
}

/// One navigation node: a link, a grouping node, or both.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TocItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<TocItem>,
}

impl Toc {
    /// Entry paths in declared document order, relative to the manifest's
    /// directory. The leading `href` comes first, then the item tree
    /// depth-first. External links are skipped.
    pub fn document_order(&self) -> Vec<PathBuf> {
        let mut order = Vec::new();
        if let Some(href) = &self.href
            && is_internal(href)
        {
            order.push(PathBuf::from(href));
        }
        collect_items(&self.items, &mut order);
        order
    }

    /// Rewrite every internal href to an anchor inside the combined page,
    /// e.g. `guide/deploy.md` -> `single-page.html#guide-deploy`.
    pub fn for_single_page(&self, page: &str) -> Toc {
        let mut toc = self.clone();
        if let Some(href) = toc.href.take() {
            toc.href = Some(rewrite_href(page, href));
        }
        rewrite_items(&mut toc.items, page);
        toc
    }
}

fn collect_items(items: &[TocItem], order: &mut Vec<PathBuf>) {
    for item in items {
        if let Some(href) = &item.href
            && is_internal(href)
        {
            order.push(PathBuf::from(href));
        }
        collect_items(&item.items, order);
    }
}

fn rewrite_items(items: &mut [TocItem], page: &str) {
    for item in items {
        if let Some(href) = item.href.take() {
            item.href = Some(rewrite_href(page, href));
        }
        rewrite_items(&mut item.items, page);
    }
}

fn rewrite_href(page: &str, href: String) -> String {
    if is_internal(&href) {
        format!("{page}#{}", anchor_slug(&href))
    } else {
        href
    }
}

/// External links stay in manifests but never become navigation entries.
fn is_internal(href: &str) -> bool {
    !href.contains("://") && !href.starts_with("//")
}

/// Anchor id of an entry inside a combined page: extension stripped,
/// separators flattened to `-`.
pub fn anchor_slug(href: &str) -> String {
    let href = href.replace('\\', "/");
    let stem = href.rsplit_once('.').map_or(href.as_str(), |(stem, _)| stem);
    stem.trim_matches('/').replace('/', "-")
}
