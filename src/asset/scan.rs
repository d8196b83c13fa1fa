//! Source resolution: glob pattern → ordered list of assets.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::Pattern;
use jwalk::WalkDir;

use super::{Asset, Origin};
use crate::utils::path::{glob_base, pattern};

/// Predicate excluding files from a source set (relative to the root).
type Ignore = Box<dyn Fn(&Path) -> bool + Send + Sync>;

/// A glob over a project root, optionally with an ignore predicate.
pub struct SourceSet {
    root: PathBuf,
    pattern: Pattern,
    base: PathBuf,
    ignore: Option<Ignore>,
}

impl SourceSet {
    pub fn new(root: impl Into<PathBuf>, glob: &str) -> Result<Self> {
        let pattern =
            Pattern::new(glob).with_context(|| format!("invalid source glob `{glob}`"))?;
        Ok(Self {
            root: root.into(),
            pattern,
            base: glob_base(glob),
            ignore: None,
        })
    }

    /// Exclude files for which `ignore(relative_to_root)` returns true.
    pub fn ignore(mut self, ignore: impl Fn(&Path) -> bool + Send + Sync + 'static) -> Self {
        self.ignore = Some(Box::new(ignore));
        self
    }

    /// Absolute directory that asset paths are relative to.
    pub fn base_dir(&self) -> PathBuf {
        self.root.join(&self.base)
    }

    fn accepts(&self, relative: &Path) -> bool {
        pattern::matches(&self.pattern, relative)
            && !self.ignore.as_ref().is_some_and(|ignore| ignore(relative))
    }
}

/// Read every file matched by `set`, in sorted walk order.
///
/// Asset paths are relative to the glob base (`src/builds/*.css` yields
/// `app.css`, `docs/**` yields `guide/index.html`). A missing base
/// directory yields an empty set.
pub fn scan_sources(set: &SourceSet) -> Result<Vec<Asset>> {
    let base_dir = set.base_dir();
    if !base_dir.is_dir() {
        crate::debug!("scan"; "no such directory: {}", base_dir.display());
        return Ok(Vec::new());
    }

    let mut files: Vec<PathBuf> = WalkDir::new(&base_dir)
        .sort(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path())
        .collect();
    files.sort();

    let mut assets = Vec::new();
    for file in files {
        let Ok(relative_to_root) = file.strip_prefix(&set.root) else {
            continue;
        };
        if !set.accepts(relative_to_root) {
            continue;
        }
        let Ok(relative_to_base) = file.strip_prefix(&base_dir) else {
            continue;
        };

        let content =
            fs::read(&file).with_context(|| format!("failed to read `{}`", file.display()))?;
        #[allow(clippy::cast_possible_truncation)]
        let origin = Origin(assets.len() as u32);
        assets.push(Asset::new(origin, &file, relative_to_base, content));
    }

    Ok(assets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_scan_flat_glob() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "src/builds/dark.css", "a{}");
        touch(dir.path(), "src/builds/app.css", "b{}");
        touch(dir.path(), "src/builds/nested/skip.css", "c{}");
        touch(dir.path(), "src/parts/vars.css", "d{}");

        let set = SourceSet::new(dir.path(), "src/builds/*.css").unwrap();
        let assets = scan_sources(&set).unwrap();

        let paths: Vec<_> = assets.iter().map(|a| a.path.clone()).collect();
        assert_eq!(paths, vec![PathBuf::from("app.css"), PathBuf::from("dark.css")]);
        assert_eq!(assets[0].origin(), Origin(0));
        assert_eq!(assets[1].origin(), Origin(1));
        assert_eq!(assets[0].content, b"b{}");
    }

    #[test]
    fn test_scan_recursive_with_ignore() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "docs/index.html", "<p>");
        touch(dir.path(), "docs/_partial.html", "<i>");
        touch(dir.path(), "docs/guide/index.html", "<p>");
        touch(dir.path(), "docs/script.js", "x");

        let set = SourceSet::new(dir.path(), "docs/**").unwrap().ignore(|rel| {
            rel.extension().is_some_and(|e| e == "html")
                && rel.file_name().is_some_and(|n| n != "index.html")
        });
        let assets = scan_sources(&set).unwrap();

        let paths: Vec<_> = assets.iter().map(|a| a.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("guide/index.html"),
                PathBuf::from("index.html"),
                PathBuf::from("script.js"),
            ]
        );
    }

    #[test]
    fn test_scan_missing_base_is_empty() {
        let dir = TempDir::new().unwrap();
        let set = SourceSet::new(dir.path(), "nothing/*.css").unwrap();
        assert!(scan_sources(&set).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_glob_is_error() {
        assert!(SourceSet::new("/tmp", "src/[.css").is_err());
    }
}
