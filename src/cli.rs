//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use crate::config::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Toccata documentation site builder CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root directory
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Input directory path (relative to project root)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output directory path (relative to project root)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Config file name (default: toccata.toml)
    #[arg(short = 'C', long, default_value = "toccata.toml")]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Build arguments for the Build command
#[derive(clap::Args, Debug, Clone)]
pub struct BuildArgs {
    /// Output format for processed entries
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// emit one combined page per TOC directory
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub single_page: Option<bool>,

    /// run the conditional filter over index manifests
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub resolve_conditions: Option<bool>,

    /// merge configured resources into structured files
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub allow_custom_resources: Option<bool>,

    /// request contributor metadata from the VCS connector
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub contributors: Option<bool>,

    /// Concurrency cap for the page processor pool
    #[arg(short, long)]
    pub workers: Option<usize>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Init a documentation project skeleton
    Init {
        /// the name(path) of the project directory, related to `root`
        name: Option<PathBuf>,
    },

    /// Build the documentation site from TOC manifests
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },
}

#[allow(unused)]
impl Cli {
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Commands::Init { .. })
    }
    pub const fn is_build(&self) -> bool {
        matches!(self.command, Commands::Build { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_flag_parsing() {
        let cli = Cli::parse_from(["toccata", "build", "--single-page", "--format", "html"]);
        let Commands::Build { build_args } = &cli.command else {
            panic!("expected build command");
        };

        assert_eq!(build_args.single_page, Some(true));
        assert_eq!(build_args.format, Some(OutputFormat::Html));
        assert!(cli.is_build());
    }

    #[test]
    fn test_build_flag_explicit_false() {
        let cli = Cli::parse_from(["toccata", "build", "--single-page", "false"]);
        let Commands::Build { build_args } = &cli.command else {
            panic!("expected build command");
        };

        assert_eq!(build_args.single_page, Some(false));
    }

    #[test]
    fn test_init_with_name() {
        let cli = Cli::parse_from(["toccata", "init", "my-docs"]);
        let Commands::Init { name } = &cli.command else {
            panic!("expected init command");
        };

        assert_eq!(name.as_deref(), Some(std::path::Path::new("my-docs")));
        assert!(cli.is_init());
    }

    #[test]
    fn test_default_config_name() {
        let cli = Cli::parse_from(["toccata", "build"]);
        assert_eq!(cli.config, PathBuf::from("toccata.toml"));
    }
}
