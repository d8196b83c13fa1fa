//! HTML inclusion and minification.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::asset::Asset;
use crate::pipeline::{PipelineError, Stage};

const MAX_DEPTH: usize = 32;

/// `<include src="x.html"></include>` and `<include src="x.html" />`
static INCLUDE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<include\s+src\s*=\s*["']([^"']+)["'][^>]*?(?:/>|>\s*</include>)"#).unwrap()
});

/// Replace `<include>` elements with the referenced fragment, recursively.
///
/// Fragment paths resolve against `root`, not the including file.
#[derive(Debug, Clone)]
pub struct Include {
    root: PathBuf,
}

impl Include {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn expand(&self, html: &str, referrer: &Path, depth: usize) -> Result<String, PipelineError> {
        if depth > MAX_DEPTH {
            return Err(PipelineError::source_parse(
                referrer,
                format!("includes nested deeper than {MAX_DEPTH} levels"),
            ));
        }

        let mut out = String::with_capacity(html.len());
        let mut last = 0;
        for caps in INCLUDE.captures_iter(html) {
            let Some(whole) = caps.get(0) else { continue };
            out.push_str(&html[last..whole.start()]);
            last = whole.end();

            let fragment = self.root.join(caps[1].trim());
            if !fragment.is_file() {
                return Err(PipelineError::MissingInclude {
                    referrer: referrer.to_path_buf(),
                    missing: fragment,
                });
            }
            let content =
                fs::read_to_string(&fragment).map_err(|e| PipelineError::io(&fragment, e))?;
            out.push_str(&self.expand(&content, &fragment, depth + 1)?);
        }
        out.push_str(&html[last..]);
        Ok(out)
    }
}

impl Stage for Include {
    fn name(&self) -> &str {
        "include"
    }

    fn apply(&self, mut asset: Asset) -> Result<Vec<Asset>, PipelineError> {
        let text = asset.text()?;
        if !text.contains("<include") {
            return Ok(vec![asset]);
        }
        let expanded = self.expand(text, asset.source(), 0)?;
        asset.set_text(expanded);
        Ok(vec![asset])
    }
}

/// Minify HTML documents, including inline styles and scripts.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlMinify;

impl HtmlMinify {
    fn cfg() -> minify_html::Cfg {
        let mut cfg = minify_html::Cfg::new();
        cfg.keep_closing_tags = true;
        cfg.keep_html_and_head_opening_tags = true;
        cfg.keep_comments = false;
        cfg.minify_css = true;
        cfg.minify_js = true;
        cfg.remove_bangs = true;
        cfg.remove_processing_instructions = true;
        cfg
    }
}

impl Stage for HtmlMinify {
    fn name(&self) -> &str {
        "minification"
    }

    fn apply(&self, mut asset: Asset) -> Result<Vec<Asset>, PipelineError> {
        asset.content = minify_html::minify(&asset.content, &Self::cfg());
        Ok(vec![asset])
    }
}
