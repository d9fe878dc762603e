//! The per-entry processing pipeline.
//!
//! Every navigation entry flows through the same three stages, fanned out
//! across a bounded worker pool:
//!
//! - **paths**: resolve the entry to its source/output/ownership paths
//! - **meta**: assemble the per-file render context
//! - **route**: pick exactly one disposition and execute it
//!
//! plus two stages that frame the fan-out:
//!
//! - **exclude**: sweep unreferenced files before processing starts
//! - **process**: drive the pool and gate the single-page flush
//!
//! ```text
//! navigation entries ──► PathData ──► MetaOptions ──► disposition
//!        │                                                │
//!        └── sweep (before) ─────── flush (after) ◄───────┘
//! ```

pub mod exclude;
pub mod meta;
pub mod paths;
pub mod process;
pub mod route;

use crate::{
    config::SiteConfig,
    render::{ContributorSource, LeadingFilter, Transform},
};
use std::path::PathBuf;

// ============================================================================
// Public API
// ============================================================================

pub use process::{EntryFailure, ProcessReport, process_pages};

/// Everything one build run shares across workers.
///
/// The roots point at the staged working copy, not the user's sources;
/// the filter and contributor seams are optional collaborators.
pub struct BuildContext<'a> {
    pub config: &'a SiteConfig,

    /// Staged input root every read goes through.
    pub input_root: PathBuf,

    /// Output root artifacts are written under.
    pub output_root: PathBuf,

    pub engine: &'a dyn Transform,

    /// Rewrites index manifests against build conditions; `None` turns
    /// the filter disposition into a no-op.
    pub leading_filter: Option<&'a dyn LeadingFilter>,

    /// Supplies contributor metadata; `None` disables contributor
    /// enrichment regardless of the config flag.
    pub contributors: Option<&'a dyn ContributorSource>,
}
