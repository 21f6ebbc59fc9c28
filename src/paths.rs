//! Lexical path utilities
//!
//! Nothing here touches the filesystem: paths are cleaned and related purely by their components.

use std::path::{Component, Path, PathBuf};

/// Normalize a path to use '/' as separator (for cross-platform consistency)
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Lexically clean a path: drop `.` segments and fold `name/..` pairs.
///
/// An empty result is returned as `.`.
pub fn clean(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        return PathBuf::from(".");
    }
    parts.iter().collect()
}

/// Resolve `path` against `pwd` unless it is already absolute, then clean it.
pub fn absolutize(pwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        clean(path)
    } else {
        clean(&pwd.join(path))
    }
}

/// Express `target` relative to `base`, inserting `..` where `target` is outside `base`.
///
/// Both paths must be of the same kind (absolute or relative). Returns `None` when no
/// lexical relation exists, e.g. when `base` climbs above a relative `target`.
pub fn relative_to(base: &Path, target: &Path) -> Option<PathBuf> {
    let base = clean(base);
    let target = clean(target);
    if base.is_absolute() != target.is_absolute() {
        return None;
    }

    let base_parts: Vec<_> = base.components().filter(|c| *c != Component::CurDir).collect();
    let target_parts: Vec<_> = target
        .components()
        .filter(|c| *c != Component::CurDir)
        .collect();
    let common = base_parts
        .iter()
        .zip(&target_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for part in &base_parts[common..] {
        if matches!(part, Component::ParentDir | Component::Prefix(_) | Component::RootDir) {
            return None;
        }
        relative.push("..");
    }
    for part in &target_parts[common..] {
        relative.push(part.as_os_str());
    }
    if relative.as_os_str().is_empty() {
        relative.push(".");
    }
    Some(relative)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        let path = Path::new("network/main.tf");
        assert_eq!(normalize_path(path), "network/main.tf");
    }

    #[test]
    fn test_clean_drops_cur_dir() {
        assert_eq!(clean(Path::new("./a/./b.tf")), PathBuf::from("a/b.tf"));
        assert_eq!(clean(Path::new("/work/./base")), PathBuf::from("/work/base"));
    }

    #[test]
    fn test_clean_folds_parent_dir() {
        assert_eq!(clean(Path::new("a/b/../c")), PathBuf::from("a/c"));
        assert_eq!(clean(Path::new("../a")), PathBuf::from("../a"));
        assert_eq!(clean(Path::new("/../a")), PathBuf::from("/a"));
    }

    #[test]
    fn test_clean_empty_is_dot() {
        assert_eq!(clean(Path::new("")), PathBuf::from("."));
        assert_eq!(clean(Path::new("a/..")), PathBuf::from("."));
    }

    #[test]
    fn test_absolutize_relative() {
        let pwd = Path::new("/work");
        assert_eq!(
            absolutize(pwd, Path::new("./infra/net")),
            PathBuf::from("/work/infra/net")
        );
    }

    #[test]
    fn test_absolutize_keeps_absolute() {
        let pwd = Path::new("/work");
        assert_eq!(
            absolutize(pwd, Path::new("/repo/net/")),
            PathBuf::from("/repo/net")
        );
    }

    #[test]
    fn test_relative_to_child() {
        let rel = relative_to(Path::new("/work/base"), Path::new("/work/base/net/vpc"));
        assert_eq!(rel, Some(PathBuf::from("net/vpc")));
    }

    #[test]
    fn test_relative_to_same_dir_is_dot() {
        let rel = relative_to(Path::new("/work/base"), Path::new("/work/base"));
        assert_eq!(rel, Some(PathBuf::from(".")));
    }

    #[test]
    fn test_relative_to_sibling_uses_parent_dir() {
        let rel = relative_to(Path::new("/work/base"), Path::new("/work/other/net"));
        assert_eq!(rel, Some(PathBuf::from("../other/net")));
    }

    #[test]
    fn test_relative_to_mixed_kinds() {
        assert_eq!(relative_to(Path::new("/work"), Path::new("net")), None);
    }
}
