//! Site configuration management for `toccata.toml`.
//!
//! # Sections
//!
//! | Section             | Purpose                                        |
//! |---------------------|------------------------------------------------|
//! | `[base]`            | Site metadata (title, language)                |
//! | `[build]`           | Roots, output format, flags, sweep patterns    |
//! | `[build.resources]` | Resource map merged into structured files      |
//!
//! # Example
//!
//! ```toml
//! [base]
//! title = "Product Docs"
//! language = "en"
//!
//! [build]
//! input = "docs"
//! output = "build"
//! format = "html"
//! single_page = true
//!
//! [build.resources]
//! style = ["custom.css"]
//! ```

mod base;
mod build;
pub mod defaults;
mod error;

// Re-export public types used by other modules
pub use build::{OutputFormat, ResourceKind};
pub use error::ConfigError;

// Internal imports used in this module
use base::BaseConfig;
use build::BuildConfig;

use crate::cli::{Cli, Commands};
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing toccata.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// CLI arguments reference
    #[serde(skip)]
    pub cli: Option<&'static Cli>,

    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Basic site information
    #[serde(default)]
    pub base: BaseConfig,

    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.build.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.build.root = Some(path.to_path_buf())
    }

    /// Get CLI arguments reference
    pub fn get_cli(&self) -> &'static Cli {
        self.cli.unwrap()
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &'static Cli) {
        self.cli = Some(cli);

        // Determine the final root path based on command
        let root = match &cli.command {
            Commands::Init { name: Some(name) } => {
                let base = cli
                    .root
                    .as_ref()
                    .cloned()
                    .unwrap_or_else(|| self.get_root().to_owned());
                base.join(name)
            }
            _ => cli
                .root
                .as_ref()
                .cloned()
                .unwrap_or_else(|| self.get_root().to_owned()),
        };

        self.set_root(&root);
        self.update_path_with_root(&root);

        if let Commands::Build { build_args } = &cli.command {
            Self::update_option(&mut self.build.format, build_args.format.as_ref());
            Self::update_option(&mut self.build.single_page, build_args.single_page.as_ref());
            Self::update_option(
                &mut self.build.resolve_conditions,
                build_args.resolve_conditions.as_ref(),
            );
            Self::update_option(
                &mut self.build.allow_custom_resources,
                build_args.allow_custom_resources.as_ref(),
            );
            Self::update_option(&mut self.build.contributors, build_args.contributors.as_ref());
            Self::update_option(&mut self.build.workers, build_args.workers.as_ref());
        }
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Update all paths relative to root directory and normalize to absolute paths
    fn update_path_with_root(&mut self, root: &Path) {
        let cli = self.get_cli();

        // Apply CLI overrides first
        Self::update_option(&mut self.build.input, cli.input.as_ref());
        Self::update_option(&mut self.build.output, cli.output.as_ref());

        // Normalize root to absolute path (with tilde expansion)
        let root = Self::normalize_path(&Self::expand_tilde(root));
        self.set_root(&root);

        // Normalize config path
        self.config_path = Self::normalize_path(&root.join(&cli.config));

        // Normalize the content roots
        self.build.input = Self::normalize_path(&root.join(Self::expand_tilde(&self.build.input)));
        self.build.output =
            Self::normalize_path(&root.join(Self::expand_tilde(&self.build.output)));
    }

    /// Expand a leading `~` to the user's home directory
    fn expand_tilde(path: &Path) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            // For non-existent paths, manually make them absolute
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate configuration for a build run
    pub fn validate(&self) -> Result<()> {
        if self.build.workers == 0 {
            bail!(ConfigError::Validation(
                "[build.workers] must be at least 1".into()
            ));
        }

        if !self.build.input.exists() {
            bail!(ConfigError::Validation(format!(
                "[build.input] not found: {}",
                self.build.input.display()
            )));
        }

        if !self.build.input.is_dir() {
            bail!(ConfigError::Validation(format!(
                "[build.input] is not a directory: {}",
                self.build.input.display()
            )));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        let config_str = r#"
            [base]
            title = "Platform Docs"

            [build]
            input = "documentation"
            single_page = true
        "#;
        let result = SiteConfig::from_str(config_str);

        assert!(result.is_ok());
        let config = result.unwrap();
        assert_eq!(config.base.title, "Platform Docs");
        assert_eq!(config.build.input, PathBuf::from("documentation"));
        assert!(config.build.single_page);
    }

    #[test]
    fn test_from_str_invalid_toml() {
        let invalid_config = r#"
            [base
            title = "Docs"
        "#;
        let result = SiteConfig::from_str(invalid_config);

        assert!(result.is_err());
    }

    #[test]
    fn test_get_root_default() {
        let config = SiteConfig::default();
        assert_eq!(config.get_root(), Path::new("./"));
    }

    #[test]
    fn test_set_root() {
        let mut config = SiteConfig::default();
        config.set_root(Path::new("/custom/path"));
        assert_eq!(config.get_root(), Path::new("/custom/path"));
    }

    #[test]
    fn test_site_config_default() {
        let config = SiteConfig::default();

        assert!(config.cli.is_none());
        assert_eq!(config.config_path, PathBuf::new());
        assert_eq!(config.base.title, "Documentation");
        assert_eq!(config.base.language, "en");
        assert_eq!(config.build.format, OutputFormat::Html);
        assert!(!config.build.single_page);
        assert_eq!(config.build.workers, 50);
    }

    #[test]
    fn test_default_config_serializes() {
        // init writes SiteConfig::default() back out; the round trip must hold
        let serialized = toml::to_string_pretty(&SiteConfig::default()).unwrap();
        let reparsed = SiteConfig::from_str(&serialized).unwrap();

        assert_eq!(reparsed.base.language, "en");
        assert_eq!(reparsed.build.format, OutputFormat::Html);
    }

    #[test]
    fn test_validate_zero_workers() {
        let mut config = SiteConfig::from_str(
            r#"
            [build]
            workers = 0
        "#,
        )
        .unwrap();
        config.build.input = std::env::temp_dir();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("[build.workers]"));
    }

    #[test]
    fn test_validate_missing_input() {
        let mut config = SiteConfig::default();
        config.build.input = PathBuf::from("/nonexistent/toccata-input");

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("[build.input]"));
    }

    #[test]
    fn test_unknown_top_level_field_rejection() {
        let config = r#"
            [base]
            title = "Test"

            [unknown_section]
            field = "value"
        "#;
        let result: Result<SiteConfig, _> = toml::from_str(config);
        assert!(result.is_err());
    }
}
