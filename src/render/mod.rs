//! Renderer seams and page bundle types.
//!
//! The pipeline talks to the markdown engine, the conditional leading-page
//! filter and the contributor connector through the traits defined here. The
//! bundle types are the serialized shape of every rendered page:
//!
//! ```text
//! { data: { leading, html, headings, title?, meta?, toc? },
//!   router: { pathname },
//!   lang }
//! ```

mod markdown;
mod page;

pub use markdown::CommonMarkEngine;
pub use page::{render_static_markup, resolve_to_bundle};

use crate::{pipeline::meta::MetaOptions, toc::Toc};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ============================================================================
// Collaborator Seams
// ============================================================================

/// Markdown engine: content in, markdown or HTML out.
///
/// Implementations must be callable from multiple worker threads at once.
pub trait Transform: Send + Sync {
    /// Resolve markdown content to markdown (md output format).
    fn to_markdown(&self, content: &str, opts: &TransformOptions<'_>) -> Result<String>;

    /// Render markdown content to an HTML body plus its heading outline.
    fn to_html(&self, content: &str, opts: &TransformOptions<'_>) -> Result<RenderedBody>;
}

/// Per-call context handed to the engine.
pub struct TransformOptions<'a> {
    /// Source path, relative to the input root.
    pub path: &'a Path,

    /// Input root the content was read from.
    pub root: &'a Path,

    /// Per-file metadata context (contributor flag, resource subset).
    pub meta: &'a MetaOptions,
}

/// Engine output for one markdown body.
#[derive(Debug, Clone, Default)]
pub struct RenderedBody {
    pub html: String,
    pub title: Option<String>,
    pub headings: Vec<Heading>,
}

/// Rewrites a structured index file in place against build-time conditions.
pub trait LeadingFilter: Send + Sync {
    fn filter_file(&self, path: &Path) -> Result<()>;
}

/// Supplies contributor metadata keyed by source path.
pub trait ContributorSource: Send + Sync {
    fn contributors_for(&self, path: &Path) -> Result<Vec<String>>;
}

// ============================================================================
// Page Bundles
// ============================================================================

/// One node of a page's heading outline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub title: String,
    pub href: String,
    pub level: u8,
}

/// The `data` half of a page bundle.
///
/// Leading pages carry their parsed document in `meta` and an empty body;
/// rendered pages carry the HTML body and, when configured, the whitelisted
/// resource map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageState {
    pub leading: bool,

    pub html: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    pub headings: Vec<Heading>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub toc: Option<Toc>,
}

/// The `router` half of a page bundle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouterState {
    /// Artifact path relative to its owning TOC directory.
    pub pathname: String,
}

/// Serialized snapshot of one rendered page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageBundle {
    pub data: PageState,
    pub router: RouterState,
    pub lang: String,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_snapshot_shape() {
        let bundle = PageBundle {
            data: PageState {
                leading: false,
                html: "<p>body</p>".into(),
                title: None,
                headings: Vec::new(),
                meta: Some(serde_json::json!({"style": ["a.css"]})),
                toc: Some(Toc::default()),
            },
            router: RouterState {
                pathname: "single-page.html".into(),
            },
            lang: "en".into(),
        };

        let json: serde_json::Value = serde_json::to_value(&bundle).unwrap();

        assert_eq!(json["data"]["leading"], false);
        assert_eq!(json["data"]["html"], "<p>body</p>");
        assert_eq!(json["data"]["headings"], serde_json::json!([]));
        assert_eq!(json["data"]["meta"]["style"][0], "a.css");
        assert_eq!(json["router"]["pathname"], "single-page.html");
        assert_eq!(json["lang"], "en");
        // Absent title is skipped entirely
        assert!(json["data"].get("title").is_none());
    }

    #[test]
    fn test_bundle_round_trip() {
        let bundle = PageBundle {
            data: PageState {
                leading: true,
                title: Some("Landing".into()),
                ..PageState::default()
            },
            router: RouterState {
                pathname: "index.html".into(),
            },
            lang: "ru".into(),
        };

        let json = serde_json::to_string(&bundle).unwrap();
        let back: PageBundle = serde_json::from_str(&json).unwrap();

        assert!(back.data.leading);
        assert_eq!(back.data.title.as_deref(), Some("Landing"));
        assert_eq!(back.lang, "ru");
    }
}
