//! `@import` inlining.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use rustc_hash::FxHashSet;

use crate::asset::Asset;
use crate::pipeline::{PipelineError, Stage};
use crate::utils::path::normalize_path;

/// `@import "x.css" media;`, `@import 'x.css';`, `@import url(x.css) media;`
static IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"@import\s+(?:url\(\s*["']?([^"')]+?)["']?\s*\)|["']([^"']+)["'])\s*([^;]*);"#)
        .unwrap()
});

/// Inline local `@import`s recursively.
///
/// Imports whose path contains the keep marker (`.min` by default) stay in
/// place so builds can load minified files lazily. Remote imports stay in
/// place. Every file is inlined at most once per asset, which also breaks
/// cycles.
#[derive(Debug, Clone)]
pub struct ImportInliner {
    keep: String,
}

impl Default for ImportInliner {
    fn default() -> Self {
        Self::keeping(".min")
    }
}

impl ImportInliner {
    pub fn keeping(marker: impl Into<String>) -> Self {
        Self {
            keep: marker.into(),
        }
    }

    fn inline(
        &self,
        css: &str,
        importer: &Path,
        seen: &mut FxHashSet<PathBuf>,
    ) -> Result<String, PipelineError> {
        let dir = importer.parent().unwrap_or_else(|| Path::new(""));
        let mut out = String::with_capacity(css.len());
        let mut last = 0;

        for caps in IMPORT.captures_iter(css) {
            let Some(whole) = caps.get(0) else { continue };
            let target = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map_or("", |m| m.as_str().trim());
            let media = caps.get(3).map_or("", |m| m.as_str().trim());

            out.push_str(&css[last..whole.start()]);
            last = whole.end();

            if is_remote(target) || target.contains(&self.keep) {
                out.push_str(whole.as_str());
                continue;
            }

            let path = resolve(dir, target).ok_or_else(|| {
                PipelineError::source_parse(importer, format!("cannot find import `{target}`"))
            })?;
            if !seen.insert(normalize_path(&path)) {
                continue;
            }

            let content = fs::read_to_string(&path).map_err(|e| PipelineError::io(&path, e))?;
            let inlined = self.inline(&content, &path, seen)?;
            let inlined = inlined.trim_end();
            if media.is_empty() {
                out.push_str(inlined);
            } else {
                let _ = write!(out, "@media {media} {{\n{inlined}\n}}");
            }
        }

        out.push_str(&css[last..]);
        Ok(out)
    }
}

impl Stage for ImportInliner {
    fn name(&self) -> &str {
        "import"
    }

    fn apply(&self, mut asset: Asset) -> Result<Vec<Asset>, PipelineError> {
        let mut seen = FxHashSet::default();
        seen.insert(normalize_path(asset.source()));
        let text = self.inline(asset.text()?, asset.source(), &mut seen)?;
        asset.set_text(text);
        Ok(vec![asset])
    }
}

fn is_remote(target: &str) -> bool {
    target.starts_with("//") || target.contains("://") || target.starts_with("data:")
}

/// Resolve an import relative to the importing file, trying `.css` when the
/// target has no extension.
fn resolve(dir: &Path, target: &str) -> Option<PathBuf> {
    let path = dir.join(target);
    if path.is_file() {
        return Some(path);
    }
    if path.extension().is_none() {
        let with_ext = path.with_extension("css");
        if with_ext.is_file() {
            return Some(with_ext);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::Origin;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, content: &str) -> PathBuf {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    fn inline(dir: &Path, entry: &str) -> Result<String, PipelineError> {
        let source = dir.join(entry);
        let content = fs::read(&source).unwrap();
        let asset = Asset::new(Origin(0), &source, entry, content);
        let out = ImportInliner::default().apply(asset)?;
        Ok(String::from_utf8(out[0].content.clone()).unwrap())
    }

    #[test]
    fn test_inlines_relative_imports() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "parts/vars.css", ":root { --c: red; }");
        write(
            dir.path(),
            "builds/app.css",
            "@import \"../parts/vars.css\";\na { color: var(--c); }",
        );

        let css = inline(dir.path(), "builds/app.css").unwrap();
        assert!(css.contains(":root { --c: red; }"));
        assert!(!css.contains("@import"));
        assert!(css.contains("color: var(--c)"));
    }

    #[test]
    fn test_url_form_and_media() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "print.css", "a { color: black; }");
        write(dir.path(), "app.css", "@import url(print.css) print;\n");

        let css = inline(dir.path(), "app.css").unwrap();
        assert!(css.contains("@media print {\na { color: black; }\n}"));
    }

    #[test]
    fn test_min_and_remote_imports_are_kept() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "dark.min.css", "a{}");
        let entry = "@import \"dark.min.css\";\n@import url(https://example.com/x.css);\nb{}";
        write(dir.path(), "app.css", entry);

        let css = inline(dir.path(), "app.css").unwrap();
        assert_eq!(css, entry);
    }

    #[test]
    fn test_cycles_and_duplicates_inline_once() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.css", "@import \"b.css\";\n.a{}");
        write(dir.path(), "b.css", "@import \"a.css\";\n.b{}");
        write(dir.path(), "app.css", "@import \"a.css\";\n@import \"b.css\";\n.app{}");

        let css = inline(dir.path(), "app.css").unwrap();
        assert_eq!(css.matches(".a{}").count(), 1);
        assert_eq!(css.matches(".b{}").count(), 1);
    }

    #[test]
    fn test_extensionless_import() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "vars.css", ".v{}");
        write(dir.path(), "app.css", "@import 'vars';");
        assert_eq!(inline(dir.path(), "app.css").unwrap(), ".v{}");
    }

    #[test]
    fn test_missing_import_is_parse_error() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "app.css", "@import \"nope.css\";");

        let err = inline(dir.path(), "app.css").unwrap_err();
        assert!(matches!(err, PipelineError::SourceParse { .. }));
        let msg = err.to_string();
        assert!(msg.contains("app.css"));
        assert!(msg.contains("nope.css"));
    }
}
