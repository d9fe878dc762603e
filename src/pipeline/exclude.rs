//! Garbage collection of unreferenced content files.
//!
//! Before processing starts, the staged input is swept: every content
//! file (`*.md` anywhere, `index.yaml` anywhere, plus anything matching
//! the configured ignore globs) that no manifest references is deleted.
//! Referenced files always survive, ignore globs included. Underscore-
//! prefixed directories (private includes, templates) are never entered.
//!
//! The sweep runs on the staged working copy only; user sources are
//! untouched.

use crate::{toc::TocService, utils::paths::to_slash};
use anyhow::{Context, Result};
use regex::Regex;
use std::{collections::HashSet, fs, io, path::PathBuf};
use walkdir::WalkDir;

/// Delete unreferenced content files under the service's input root.
///
/// Returns the deleted paths relative to the input root. A file vanishing
/// between the walk and the delete is not an error.
pub fn sweep_unreferenced(toc: &TocService, extra: &[String]) -> Result<Vec<PathBuf>> {
    let input_root = toc.input_root();

    let extra: Vec<Regex> = extra
        .iter()
        .map(|pattern| glob_to_regex(pattern))
        .collect::<Result<_>>()?;

    let referenced: HashSet<String> = toc
        .navigation_paths()
        .iter()
        .map(|rel| to_slash(&input_root.join(rel)))
        .collect();

    let mut swept = Vec::new();

    let walker = WalkDir::new(input_root).into_iter().filter_entry(|e| {
        !(e.depth() > 0
            && e.file_type().is_dir()
            && e.file_name().to_string_lossy().starts_with('_'))
    });

    for entry in walker {
        let entry = entry.context("failed to walk input tree")?;
        if !entry.file_type().is_file() {
            continue;
        }

        let rel = entry
            .path()
            .strip_prefix(input_root)
            .unwrap_or(entry.path());
        let rel_slash = to_slash(rel);

        let is_content = rel_slash.ends_with(".md")
            || entry.file_name() == "index.yaml"
            || extra.iter().any(|re| re.is_match(&rel_slash));
        if !is_content {
            continue;
        }

        if referenced.contains(&to_slash(entry.path())) {
            continue;
        }

        match fs::remove_file(entry.path()) {
            Ok(()) => swept.push(rel.to_path_buf()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("failed to remove `{}`", entry.path().display())
                });
            }
        }
    }

    Ok(swept)
}

/// Compile a glob into an anchored regex over slash-separated paths.
///
/// `**/` matches any directory prefix including none, `**` the rest of
/// the path, `*` within one segment, `?` one non-separator character.
fn glob_to_regex(pattern: &str) -> Result<Regex> {
    let mut re = String::with_capacity(pattern.len() + 8);
    re.push('^');

    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    if chars.peek() == Some(&'/') {
                        chars.next();
                        re.push_str("(?:.*/)?");
                    } else {
                        re.push_str(".*");
                    }
                } else {
                    re.push_str("[^/]*");
                }
            }
            '?' => re.push_str("[^/]"),
            c if "\\.+()[]{}^$|".contains(c) => {
                re.push('\\');
                re.push(c);
            }
            c => re.push(c),
        }
    }

    re.push('$');
    Regex::new(&re).with_context(|| format!("invalid ignore pattern `{pattern}`"))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn sweep(dir: &TempDir, extra: &[&str]) -> Vec<PathBuf> {
        let toc = TocService::discover(dir.path()).unwrap();
        let extra: Vec<String> = extra.iter().map(|s| (*s).to_string()).collect();
        let mut swept = sweep_unreferenced(&toc, &extra).unwrap();
        swept.sort();
        swept
    }

    #[test]
    fn test_sweeps_unreferenced_markdown() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "toc.yaml", "items:\n  - href: kept.md\n");
        write(dir.path(), "kept.md", "# Kept\n");
        write(dir.path(), "orphan.md", "# Orphan\n");
        write(dir.path(), "sub/stray.md", "# Stray\n");

        let swept = sweep(&dir, &[]);

        assert_eq!(
            swept,
            vec![PathBuf::from("orphan.md"), PathBuf::from("sub/stray.md")]
        );
        assert!(dir.path().join("kept.md").exists());
        assert!(!dir.path().join("orphan.md").exists());
        assert!(!dir.path().join("sub/stray.md").exists());
    }

    #[test]
    fn test_sweeps_unreferenced_index_manifests_only() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "toc.yaml",
            "href: index.yaml\nitems:\n  - href: page.md\n",
        );
        write(dir.path(), "index.yaml", "title: Kept\n");
        write(dir.path(), "page.md", "# Page\n");
        write(dir.path(), "sub/index.yaml", "title: Orphan\n");
        write(dir.path(), "sub/other.yaml", "freeform: true\n");

        let swept = sweep(&dir, &[]);

        // index.yaml is content; arbitrary yaml is not.
        assert_eq!(swept, vec![PathBuf::from("sub/index.yaml")]);
        assert!(dir.path().join("index.yaml").exists());
        assert!(dir.path().join("sub/other.yaml").exists());
    }

    #[test]
    fn test_manifests_themselves_survive() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "toc.yaml", "items:\n  - href: page.md\n");
        write(dir.path(), "page.md", "# Page\n");
        write(dir.path(), "sub/toc.yaml", "items:\n  - href: deep.md\n");
        write(dir.path(), "sub/deep.md", "# Deep\n");

        let swept = sweep(&dir, &[]);

        assert!(swept.is_empty());
        assert!(dir.path().join("toc.yaml").exists());
        assert!(dir.path().join("sub/toc.yaml").exists());
    }

    #[test]
    fn test_underscore_directories_are_not_entered() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "toc.yaml", "items:\n  - href: page.md\n");
        write(dir.path(), "page.md", "# Page\n");
        write(dir.path(), "_includes/snippet.md", "unreferenced\n");
        write(dir.path(), "sub/_templates/index.yaml", "private\n");

        let swept = sweep(&dir, &[]);

        assert!(swept.is_empty());
        assert!(dir.path().join("_includes/snippet.md").exists());
        assert!(dir.path().join("sub/_templates/index.yaml").exists());
    }

    #[test]
    fn test_extra_globs_extend_content_set() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "toc.yaml", "items:\n  - href: page.md\n");
        write(dir.path(), "page.md", "# Page\n");
        write(dir.path(), "notes.tmp", "scratch\n");
        write(dir.path(), "deep/notes.tmp", "scratch\n");

        // Not content by default.
        assert!(sweep(&dir, &[]).is_empty());

        let swept = sweep(&dir, &["**/*.tmp"]);
        assert_eq!(
            swept,
            vec![PathBuf::from("deep/notes.tmp"), PathBuf::from("notes.tmp")]
        );
    }

    #[test]
    fn test_referenced_files_survive_extra_globs() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "toc.yaml",
            "items:\n  - href: drafts/wip.md\n",
        );
        write(dir.path(), "drafts/wip.md", "# WIP\n");
        write(dir.path(), "drafts/old.md", "# Old\n");

        let swept = sweep(&dir, &["**/drafts/**"]);

        assert_eq!(swept, vec![PathBuf::from("drafts/old.md")]);
        assert!(dir.path().join("drafts/wip.md").exists());
    }

    #[test]
    fn test_glob_star_stays_within_segment() {
        let re = glob_to_regex("*.tmp").unwrap();
        assert!(re.is_match("notes.tmp"));
        assert!(!re.is_match("deep/notes.tmp"));
        assert!(!re.is_match("notesxtmp"));
    }

    #[test]
    fn test_glob_double_star_prefix_is_optional() {
        let re = glob_to_regex("**/drafts/**").unwrap();
        assert!(re.is_match("drafts/a.md"));
        assert!(re.is_match("x/y/drafts/a.md"));
        assert!(!re.is_match("mydrafts/a.md"));
    }

    #[test]
    fn test_glob_question_mark() {
        let re = glob_to_regex("page-?.md").unwrap();
        assert!(re.is_match("page-1.md"));
        assert!(!re.is_match("page-10.md"));
        assert!(!re.is_match("page-x/md"));
    }

    #[test]
    fn test_glob_regex_metachars_are_literal() {
        let re = glob_to_regex("a+b(c).md").unwrap();
        assert!(re.is_match("a+b(c).md"));
        assert!(!re.is_match("aab(c).md"));
        assert!(!re.is_match("a+b(c)xmd"));
    }
}
