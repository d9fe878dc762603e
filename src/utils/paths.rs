//! Path arithmetic helpers shared across the pipeline.

use std::path::{Component, Path, PathBuf};

/// Lexically normalize a path: strips `.` components and resolves `..`
/// against preceding segments without touching the filesystem.
///
/// `..` at the start of a relative path is kept; `..` directly under the
/// root is dropped.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut parts: Vec<Component> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            part => parts.push(part),
        }
    }

    parts.iter().collect()
}

/// Slash-consistent string form of a path, for set membership across
/// separator styles.
pub fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_resolves_parent_dirs() {
        assert_eq!(
            normalize_path(Path::new("a/../shared.md")),
            PathBuf::from("shared.md")
        );
        assert_eq!(
            normalize_path(Path::new("a/b/../../c.md")),
            PathBuf::from("c.md")
        );
        assert_eq!(
            normalize_path(Path::new("/root/a/../b")),
            PathBuf::from("/root/b")
        );
    }

    #[test]
    fn test_normalize_strips_cur_dirs() {
        assert_eq!(
            normalize_path(Path::new("./a/./b.md")),
            PathBuf::from("a/b.md")
        );
    }

    #[test]
    fn test_normalize_keeps_leading_parent_dirs() {
        assert_eq!(
            normalize_path(Path::new("../a.md")),
            PathBuf::from("../a.md")
        );
        assert_eq!(
            normalize_path(Path::new("../../a.md")),
            PathBuf::from("../../a.md")
        );
    }

    #[test]
    fn test_normalize_parent_at_root_is_dropped() {
        assert_eq!(normalize_path(Path::new("/../a")), PathBuf::from("/a"));
    }

    #[test]
    fn test_normalize_identity() {
        assert_eq!(
            normalize_path(Path::new("guide/install.md")),
            PathBuf::from("guide/install.md")
        );
        assert_eq!(normalize_path(Path::new("")), PathBuf::new());
    }

    #[test]
    fn test_to_slash() {
        assert_eq!(to_slash(Path::new("a/b/c.md")), "a/b/c.md");
        assert_eq!(to_slash(Path::new("a\\b\\c.md")), "a/b/c.md");
    }
}
