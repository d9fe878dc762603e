//! CommonMark engine built on comrak.
//!
//! One stateless engine instance serves the whole worker pool. HTML
//! rendering walks the AST once for the heading outline (and page title),
//! then formats the same tree, so outline and body can never disagree
//! about what the document contains.

use super::{Heading, RenderedBody, Transform, TransformOptions};
use anyhow::{Context, Result};
use comrak::{
    Arena,
    nodes::{AstNode, NodeHeading, NodeValue},
    options::Options,
    parse_document,
};

/// Stateless CommonMark renderer with the GFM extension set.
#[derive(Debug, Default)]
pub struct CommonMarkEngine;

impl CommonMarkEngine {
    pub fn new() -> Self {
        Self
    }

    fn options() -> Options<'static> {
        let mut options = Options::default();
        options.extension.table = true;
        options.extension.footnotes = true;
        options.extension.strikethrough = true;
        options.extension.tasklist = true;
        options.extension.autolink = true;
        // Raw HTML in docs passes through untouched.
        options.render.r#unsafe = true;
        // Anchor ids come from the outline walk, not comrak.
        options.extension.header_ids = None;
        options
    }
}

impl Transform for CommonMarkEngine {
    /// Markdown output keeps the source body as-is; resolution concerns
    /// (conditionals, includes) live in the leading-page filter seam.
    fn to_markdown(&self, content: &str, _opts: &TransformOptions<'_>) -> Result<String> {
        Ok(content.to_owned())
    }

    fn to_html(&self, content: &str, opts: &TransformOptions<'_>) -> Result<RenderedBody> {
        let arena = Arena::new();
        let options = Self::options();
        let root = parse_document(&arena, content, &options);

        let (headings, title) = collect_headings(root);

        let mut html = String::new();
        comrak::format_html(root, &options, &mut html)
            .with_context(|| format!("failed to render `{}`", opts.path.display()))?;

        Ok(RenderedBody {
            html,
            title,
            headings,
        })
    }
}

/// Walk the document for its heading outline. The first level-1 heading
/// doubles as the page title.
fn collect_headings<'a>(root: &'a AstNode<'a>) -> (Vec<Heading>, Option<String>) {
    let mut headings = Vec::new();
    let mut title = None;

    for node in root.descendants() {
        if let NodeValue::Heading(NodeHeading { level, .. }) = &node.data.borrow().value {
            let text = inline_text(node);
            if *level == 1 && title.is_none() {
                title = Some(text.clone());
            }
            headings.push(Heading {
                href: format!("#{}", slugify(&text)),
                title: text,
                level: *level,
            });
        }
    }

    (headings, title)
}

/// Concatenated text of a node's inline children, formatting stripped.
fn inline_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    for child in node.children() {
        match &child.data.borrow().value {
            NodeValue::Text(t) => text.push_str(t),
            NodeValue::Code(code) => text.push_str(&code.literal),
            NodeValue::Link(..)
            | NodeValue::Emph
            | NodeValue::Strong
            | NodeValue::Strikethrough => text.push_str(&inline_text(child)),
            _ => {}
        }
    }
    text
}

/// Lowercased anchor id: each non-alphanumeric character becomes `-`.
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .replace(|c: char| !c.is_alphanumeric() && c != '-' && c != '_', "-")
        .trim_matches('-')
        .to_string()
}

// ============================================================================
// Tests
// ============================================================================
