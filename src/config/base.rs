//! `[base]` section configuration.
//!
//! Contains basic site information like title and language.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[base]` section in toccata.toml - basic site metadata.
///
/// # Example
/// ```toml
/// [base]
/// title = "Product Docs"
/// language = "en"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct BaseConfig {
    /// Site title, used when a page declares no title of its own.
    #[serde(default = "defaults::base::title")]
    #[educe(Default = defaults::base::title())]
    pub title: String,

    /// BCP 47 language tag (e.g., "en", "ru", "en-US"), stamped into every
    /// page bundle and the `lang` attribute of rendered pages.
    #[serde(default = "defaults::base::language")]
    #[educe(Default = defaults::base::language())]
    pub language: String,
}
