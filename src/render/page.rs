//! Page resolution: source file to bundle, bundle to viewable HTML.
//!
//! Markdown entries go through the engine; structured index files are
//! parsed into a leading bundle with no body. Either way the result is
//! one [`PageBundle`], and the viewable artifact is a minimal static
//! shell wrapped around its body.

use super::{PageBundle, PageState, RouterState, Transform, TransformOptions};
use crate::{log, pipeline::meta::MetaOptions, pipeline::paths::PathData, toc::TocService};
use anyhow::{Context, Result};
use std::{borrow::Cow, fs};

/// Resolve one entry to its page bundle.
///
/// Structured (`.yaml`) entries become leading bundles: the parsed
/// document rides in `meta`, the body stays empty. A document that fails
/// to parse is logged and substituted with an empty one; the entry still
/// produces a bundle. Markdown entries render through the engine.
pub fn resolve_to_bundle(
    paths: &PathData,
    meta: &MetaOptions,
    toc: &TocService,
    engine: &dyn Transform,
    lang: &str,
) -> Result<PageBundle> {
    let content = fs::read_to_string(&paths.source)
        .with_context(|| format!("failed to read `{}`", paths.source.display()))?;

    let mut data = if paths.is_yaml() {
        leading_state(paths, &content)
    } else {
        let opts = TransformOptions {
            path: &paths.source_rel,
            root: toc.input_root(),
            meta,
        };
        let body = engine.to_html(&content, &opts)?;

        PageState {
            leading: false,
            html: body.html,
            title: body.title,
            headings: body.headings,
            meta: meta.resources_json(),
            toc: None,
        }
    };

    data.toc = toc.toc_for(&paths.source).cloned();

    Ok(PageBundle {
        data,
        router: RouterState {
            pathname: paths.bundle_pathname(),
        },
        lang: lang.to_owned(),
    })
}

/// Bundle state of a structured index file.
fn leading_state(paths: &PathData, content: &str) -> PageState {
    let doc: serde_yaml::Value = match serde_yaml::from_str(content) {
        Ok(doc) => doc,
        Err(err) => {
            log!("error"; "malformed `{}`: {err}", paths.source_rel.display());
            serde_yaml::Value::Mapping(serde_yaml::Mapping::new())
        }
    };

    let title = doc
        .get("title")
        .and_then(serde_yaml::Value::as_str)
        .map(str::to_owned);
    let meta = serde_json::to_value(&doc).unwrap_or(serde_json::Value::Null);

    PageState {
        leading: true,
        html: String::new(),
        title,
        headings: Vec::new(),
        meta: Some(meta),
        toc: None,
    }
}

/// Wrap a bundle's body in the static page shell.
///
/// `fallback_title` fills in when the bundle carries none (a body with no
/// level-1 heading, or an untitled index document).
pub fn render_static_markup(bundle: &PageBundle, fallback_title: &str) -> String {
    let title = bundle.data.title.as_deref().unwrap_or(fallback_title);

    let mut html = String::with_capacity(bundle.data.html.len() + 256);
    html.push_str("<!DOCTYPE html>\n");
    html.push_str(&format!("<html lang=\"{}\">\n", html_escape(&bundle.lang)));
    html.push_str("<head>\n");
    html.push_str("  <meta charset=\"utf-8\">\n");
    html.push_str(&format!("  <title>{}</title>\n", html_escape(title)));
    html.push_str("</head>\n");
    html.push_str("<body>\n");
    html.push_str(&bundle.data.html);
    html.push_str("\n</body>\n</html>\n");
    html
}

/// Escape text destined for HTML attribute or element content.
fn html_escape(s: &str) -> Cow<'_, str> {
    // Fast path: check if escaping is needed
    if !s.contains(['<', '>', '&', '"']) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '&' => result.push_str("&amp;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    Cow::Owned(result)
}

// ============================================================================
// Tests
// ============================================================================
