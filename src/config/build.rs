//! `[build]` section configuration.
//!
//! Contains the pipeline settings: input/output roots, output format,
//! single-page aggregation, disposition flags and the sweep patterns.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, path::PathBuf};

// ============================================================================
// Enums
// ============================================================================

/// Output format of the build: processed markdown or rendered HTML pages.
///
/// Doubles as the output file extension, so `Display` yields `md`/`html`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Resolve markdown to markdown; structured files are copied or merged.
    Md,
    /// Render every page to a static HTML document (default).
    #[default]
    Html,
}

impl OutputFormat {
    /// Output file extension without the dot.
    pub const fn extension(self) -> &'static str {
        match self {
            OutputFormat::Md => "md",
            OutputFormat::Html => "html",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Resource categories that may be merged into page metadata.
///
/// Configured resource keys outside this set are dropped by the metadata
/// assembler and never reach merged documents or snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Style,
    Script,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 2] = [ResourceKind::Style, ResourceKind::Script];

    pub const fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Style => "style",
            ResourceKind::Script => "script",
        }
    }

    /// Parse a configured resource key; `None` for keys outside the allow list.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "style" => Some(ResourceKind::Style),
            "script" => Some(ResourceKind::Script),
            _ => None,
        }
    }
}

// ============================================================================
// Main BuildConfig
// ============================================================================

/// `[build]` section in toccata.toml - build pipeline configuration.
///
/// # Example
/// ```toml
/// [build]
/// input = "docs"           # Content tree with toc.yaml manifests
/// output = "build"         # Output directory
/// format = "html"          # md | html
/// single_page = true       # Combined page per TOC directory
///
/// [build.resources]
/// style = ["custom.css"]
/// script = ["custom.js"]
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Project root directory (usually set via CLI `--root`).
    #[serde(default = "defaults::build::root")]
    #[educe(Default = defaults::build::root())]
    pub root: Option<PathBuf>,

    /// Content tree holding `toc.yaml` manifests and the files they list.
    #[serde(default = "defaults::build::input")]
    #[educe(Default = defaults::build::input())]
    pub input: PathBuf,

    /// Build output directory.
    #[serde(default = "defaults::build::output")]
    #[educe(Default = defaults::build::output())]
    pub output: PathBuf,

    /// Output format for processed entries.
    #[serde(default = "defaults::build::format")]
    #[educe(Default = defaults::build::format())]
    pub format: OutputFormat,

    /// Additionally emit one combined page per TOC directory.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub single_page: bool,

    /// Run the conditional filter over index manifests before routing.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub resolve_conditions: bool,

    /// Merge configured resources into structured files (md format only).
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub allow_custom_resources: bool,

    /// Request contributor metadata from the version-control connector.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub contributors: bool,

    /// Extra glob patterns swept together with unreferenced content files
    /// (e.g. `["**/drafts/**"]`). Referenced files always survive.
    #[serde(default = "defaults::build::ignore")]
    #[educe(Default = defaults::build::ignore())]
    pub ignore: Vec<String>,

    /// Concurrency cap for the page processor pool.
    #[serde(default = "defaults::build::workers")]
    #[educe(Default = defaults::build::workers())]
    pub workers: usize,

    /// `[build.resources]` - free-form resource map. Only `style`/`script`
    /// keys pass the allow list; anything else is ignored.
    #[serde(default)]
    pub resources: BTreeMap<String, Vec<String>>,
}

// ============================================================================
// Tests
// ============================================================================
