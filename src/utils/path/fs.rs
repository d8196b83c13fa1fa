//! Filesystem path resolution.

use std::path::{Component, Path, PathBuf};

/// Absolute form of `path`, used as an identity key for files.
///
/// Canonicalizes when the file exists, otherwise falls back to a lexical
/// cleanup of `.` and `..` against the current directory.
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        };
        clean(&absolute)
    })
}

/// Resolve a configured path against the project root.
///
/// Absolute paths are kept as written.
pub fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        clean(path)
    } else {
        clean(&root.join(path))
    }
}

/// Path of `path` relative to `root`, for display.
pub fn relative_to<'a>(root: &Path, path: &'a Path) -> &'a Path {
    path.strip_prefix(root).unwrap_or(path)
}

/// Drop `.` components and fold `..` into the preceding component.
fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_relative() {
        let normalized = normalize_path(Path::new("relative/path/file.txt"));
        assert!(normalized.is_absolute());
        assert!(normalized.ends_with("relative/path/file.txt"));
    }

    #[test]
    fn test_normalize_missing_file_folds_parents() {
        let normalized = normalize_path(Path::new("/no/such/dir/../file.css"));
        assert_eq!(normalized, PathBuf::from("/no/such/file.css"));
    }

    #[test]
    fn test_resolve_against_root() {
        let root = Path::new("/project");
        assert_eq!(resolve(root, Path::new("dist/./docs")), PathBuf::from("/project/dist/docs"));
        assert_eq!(resolve(root, Path::new("/abs/out")), PathBuf::from("/abs/out"));
        assert_eq!(resolve(root, Path::new("src/../dist")), PathBuf::from("/project/dist"));
    }

    #[test]
    fn test_relative_to() {
        let root = Path::new("/project");
        assert_eq!(relative_to(root, Path::new("/project/dist/a.css")), Path::new("dist/a.css"));
        assert_eq!(relative_to(root, Path::new("/elsewhere/a.css")), Path::new("/elsewhere/a.css"));
    }
}
