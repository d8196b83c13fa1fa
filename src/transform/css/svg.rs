//! `svg-load()` inlining.

use std::fs;
use std::sync::LazyLock;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use regex::{Captures, Regex};

use crate::asset::Asset;
use crate::pipeline::{PipelineError, Stage};

/// `svg-load("icon.svg")`, `svg-load('icon.svg', fill=#fff)`, `svg-load(icon.svg)`
static SVG_LOAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"svg-load\(\s*["']?([^"',)]+)["']?\s*((?:,\s*[\w-]+\s*=\s*[^,)]+)*)\)"#).unwrap()
});

static PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\w-]+)\s*=\s*([^,]+)").unwrap());

/// Characters escaped in the data URI; everything else stays readable.
const DATA_URI: &AsciiSet = &CONTROLS
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'&')
    .add(b'#')
    .add(b'{')
    .add(b'}')
    .add(b'"');

/// Replace `svg-load(path)` with a `data:image/svg+xml` URL.
///
/// Paths resolve against the style sheet's directory. `name=value`
/// parameters become attributes on the root `<svg>` element.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineSvg;

impl Stage for InlineSvg {
    fn name(&self) -> &str {
        "inline svg"
    }

    fn apply(&self, mut asset: Asset) -> Result<Vec<Asset>, PipelineError> {
        let text = asset.text()?;
        if !text.contains("svg-load(") {
            return Ok(vec![asset]);
        }

        let dir = asset.source_dir().to_path_buf();
        let mut failure = None;
        let replaced = SVG_LOAD.replace_all(text, |caps: &Captures<'_>| {
            let target = caps[1].trim();
            let path = dir.join(target);
            match fs::read_to_string(&path) {
                Ok(svg) => data_uri(&with_params(&svg, &caps[2])),
                Err(_) => {
                    failure.get_or_insert_with(|| {
                        PipelineError::source_parse(
                            asset.source(),
                            format!("cannot find svg `{target}`"),
                        )
                    });
                    caps[0].to_string()
                }
            }
        });

        if let Some(err) = failure {
            return Err(err);
        }
        let replaced = replaced.into_owned();
        asset.set_text(replaced);
        Ok(vec![asset])
    }
}

/// Set `name=value` pairs as attributes on the root `<svg` tag.
fn with_params(svg: &str, params: &str) -> String {
    let attrs: String = PARAM
        .captures_iter(params)
        .map(|c| format!(" {}=\"{}\"", &c[1], c[2].trim()))
        .collect();
    if attrs.is_empty() {
        return svg.to_string();
    }
    match svg.find("<svg") {
        Some(at) => {
            let insert = at + "<svg".len();
            format!("{}{attrs}{}", &svg[..insert], &svg[insert..])
        }
        None => svg.to_string(),
    }
}

fn data_uri(svg: &str) -> String {
    let compact: String = svg
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .replace('"', "'");
    format!(
        "url(\"data:image/svg+xml;charset=utf-8,{}\")",
        utf8_percent_encode(&compact, DATA_URI)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::Origin;
    use std::path::Path;
    use tempfile::TempDir;

    fn run(dir: &Path, css: &str) -> Result<String, PipelineError> {
        let asset = Asset::new(Origin(0), dir.join("app.css"), "app.css", css);
        let out = InlineSvg.apply(asset)?;
        Ok(String::from_utf8(out[0].content.clone()).unwrap())
    }

    #[test]
    fn test_inlines_svg_as_data_uri() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("arrow.svg"),
            "<svg xmlns=\"http://www.w3.org/2000/svg\">\n  <path d=\"M0 0\"/>\n</svg>\n",
        )
        .unwrap();

        let css = run(dir.path(), "a { background: svg-load('arrow.svg'); }").unwrap();
        assert!(css.starts_with("a { background: url(\"data:image/svg+xml;charset=utf-8,"));
        assert!(css.contains("%3Csvg xmlns='http://www.w3.org/2000/svg'%3E"));
        assert!(!css.contains("svg-load"));
        assert!(css.ends_with("\"); }"));
    }

    #[test]
    fn test_params_become_root_attributes() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("i.svg"), "<svg><path/></svg>").unwrap();

        let css = run(dir.path(), "a { b: svg-load(\"i.svg\", fill=#fff); }").unwrap();
        assert!(css.contains("%3Csvg fill='%23fff'%3E"));
    }

    #[test]
    fn test_missing_svg_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let err = run(dir.path(), "a { b: svg-load(\"gone.svg\"); }").unwrap_err();
        assert!(err.to_string().contains("gone.svg"));
        assert!(err.to_string().contains("app.css"));
    }

    #[test]
    fn test_without_calls_unchanged() {
        let dir = TempDir::new().unwrap();
        assert_eq!(run(dir.path(), "a{}").unwrap(), "a{}");
    }
}
