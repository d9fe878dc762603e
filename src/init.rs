//! Project initialization module.
//!
//! Scaffolds a new documentation project: a starter section with a
//! `toc.yaml` manifest, a leading `index.yaml` and one article, plus a
//! default `toccata.toml`.

use crate::{config::SiteConfig, log, toc::TOC_FILENAME};
use anyhow::{Context, Result, bail};
use std::{fs, path::Path};

/// Files to write ignore patterns to
const IGNORE_FILES: &[&str] = &[".gitignore", ".ignore"];

/// Default config filename
const CONFIG_FILE: &str = "toccata.toml";

/// Starter section content, written into the input root
const STARTER_FILES: &[(&str, &str)] = &[
    (TOC_FILENAME, STARTER_TOC),
    ("index.yaml", STARTER_LEADING),
    ("getting-started.md", STARTER_ARTICLE),
];

const STARTER_TOC: &str = "\
title: Documentation
href: index.yaml
items:
  - name: Getting started
    href: getting-started.md
";

const STARTER_LEADING: &str = "\
title: Overview
description: What this documentation covers and where to start.
links:
  - title: Getting started
    description: Build the section for the first time.
    href: getting-started.md
";

const STARTER_ARTICLE: &str = "\
# Getting started

Write articles in CommonMark, list them in `toc.yaml`, then run
`toccata build` to render the section into static pages.

## Add a page

1. Create `my-page.md` next to this file.
2. List it in `toc.yaml` under `items`.
3. Run `toccata build` again.
";

/// Create a new documentation project with a starter section
pub fn new_project(config: &SiteConfig, has_name: bool) -> Result<()> {
    let root = config.get_root();

    // Safety check: if no name was provided (init in current dir),
    // the directory must be completely empty
    if !has_name && !is_dir_empty(root)? {
        bail!(
            "Current directory is not empty. Use `toccata init <NAME>` to create in a subdirectory."
        );
    }

    init_section(&config.build.input)?;
    init_default_config(root)?;

    let output = config
        .build
        .output
        .strip_prefix(root)
        .unwrap_or(config.build.output.as_path());
    init_ignored_files(root, &[output])?;

    log!("init"; "project created at `{}`", root.display());
    Ok(())
}

/// Check if a directory is completely empty
fn is_dir_empty(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(true);
    }
    Ok(fs::read_dir(path)?.next().is_none())
}

/// Write default configuration file
fn init_default_config(root: &Path) -> Result<()> {
    let content = toml::to_string_pretty(&SiteConfig::default())?;
    fs::write(root.join(CONFIG_FILE), content)?;
    Ok(())
}

/// Create the starter section under the input root
fn init_section(input: &Path) -> Result<()> {
    if input.exists() {
        bail!(
            "Path `{}` already exists. Try `toccata init <NAME>` instead.",
            input.display()
        );
    }
    fs::create_dir_all(input)
        .with_context(|| format!("Failed to create {}", input.display()))?;

    for (name, content) in STARTER_FILES {
        fs::write(input.join(name), content)?;
    }
    Ok(())
}

/// Initialize .gitignore and .ignore files with specified paths
fn init_ignored_files(root: &Path, paths: &[&Path]) -> Result<()> {
    let content = paths
        .iter()
        .filter_map(|p| p.to_str())
        .collect::<Vec<_>>()
        .join("\n");

    for filename in IGNORE_FILES {
        let path = root.join(filename);
        if !path.exists() {
            fs::write(&path, &content)?;
        }
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
