//! Per-file render context assembly.
//!
//! `MetaOptions` is built fresh for every entry, handed to the engine and
//! the dispositions, and dropped when the entry completes. It carries the
//! contributor flag and the allow-listed subset of the configured resource
//! map; configured keys outside [`ResourceKind`] never get this far.

use crate::{
    config::{ResourceKind, SiteConfig},
    render::ContributorSource,
};
use std::collections::BTreeMap;

/// Ephemeral per-file render context.
#[derive(Debug, Clone, Default)]
pub struct MetaOptions {
    /// Contributor metadata requested: the config flag is on AND a
    /// connector is wired. Either alone is not enough.
    pub contributors_enabled: bool,

    /// Allow-listed resources to merge into metadata. `None` when custom
    /// resources are disabled; may be an empty map when everything the
    /// user configured fell outside the allow list.
    pub resources: Option<BTreeMap<ResourceKind, Vec<String>>>,

    /// Raw content placeholder, filled by dispositions that read the file.
    pub content: String,
}

impl MetaOptions {
    /// Assemble the context for one entry.
    pub fn assemble(
        config: &SiteConfig,
        contributors: Option<&dyn ContributorSource>,
    ) -> Self {
        let contributors_enabled = config.build.contributors && contributors.is_some();

        let resources = (config.build.allow_custom_resources
            && !config.build.resources.is_empty())
        .then(|| whitelist_resources(&config.build.resources));

        Self {
            contributors_enabled,
            resources,
            content: String::new(),
        }
    }

    /// Resource subset as a JSON object for page bundles, `{}` when no
    /// resources survived the allow list.
    pub fn resources_json(&self) -> Option<serde_json::Value> {
        self.resources.as_ref().map(|resources| {
            let map: serde_json::Map<String, serde_json::Value> = resources
                .iter()
                .map(|(kind, values)| {
                    (
                        kind.as_str().to_owned(),
                        serde_json::Value::from(values.clone()),
                    )
                })
                .collect();
            serde_json::Value::Object(map)
        })
    }
}

/// Intersect the configured resource map with the [`ResourceKind`] allow
/// list. Unknown keys are dropped silently.
pub fn whitelist_resources(
    configured: &BTreeMap<String, Vec<String>>,
) -> BTreeMap<ResourceKind, Vec<String>> {
    configured
        .iter()
        .filter_map(|(key, values)| {
            ResourceKind::from_key(key).map(|kind| (kind, values.clone()))
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
