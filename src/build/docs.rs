//! Documentation site build.
//!
//! Every file under `docs.src` is copied to `docs.dest`; three partitions
//! route the typed assets through their own stages on the way:
//!
//! | Partition | Stages                                              |
//! |-----------|-----------------------------------------------------|
//! | `*.html`  | include → html minify                               |
//! | `*.js`    | maps init → transpile → minify → maps write          |
//! | `*.css`   | maps init → minify → maps write                      |
//!
//! HTML files not named like `docs.entry` are fragments: they are skipped by
//! the scan and only reach the output through `<include>`.

use std::ffi::OsString;
use std::path::Path;

use anyhow::{Result, anyhow};

use crate::asset::{Asset, SourceSet, scan_sources};
use crate::config::SluiceConfig;
use crate::pipeline::{Partition, Pipeline};
use crate::transform::{
    CssMinify, HtmlMinify, Include, JsMinify, SourceMapsInit, SourceMapsWrite, Transpile,
};

/// `docs.src` minus every HTML file other than the entry.
pub fn docs_sources(config: &SluiceConfig) -> Result<Vec<Asset>> {
    let entry = OsString::from(&config.docs.entry);
    let set = SourceSet::new(&config.root, &config.docs.src)?
        .ignore(move |path| is_fragment(path, &entry));
    scan_sources(&set)
}

fn is_fragment(path: &Path, entry: &OsString) -> bool {
    path.extension().is_some_and(|ext| ext == "html")
        && path.file_name().is_some_and(|name| name != entry.as_os_str())
}

/// Assemble the docs pipeline for `config`.
pub fn docs_pipeline(config: &SluiceConfig) -> Result<Pipeline> {
    let docs = &config.docs;
    let transpile = Transpile::new(&docs.js_target).map_err(|e| anyhow!(e))?;
    let targets = config.style.targets;

    let html = Partition::extension("html");
    let js = Partition::extension("js");
    let css = Partition::extension("css");

    Ok(Pipeline::new("docs")
        .partition(&html)
        .pipe(Include::new(config.root_join(&docs.root)))
        .pipe(HtmlMinify)
        .restore(&html)
        .partition(&js)
        .pipe(SourceMapsInit)
        .pipe(transpile)
        .pipe(JsMinify)
        .pipe(SourceMapsWrite)
        .restore(&js)
        .partition(&css)
        .pipe(SourceMapsInit)
        .pipe(CssMinify::new(targets))
        .pipe(SourceMapsWrite)
        .restore(&css)
        .dest(config.root_join(&docs.dest)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_fragment_detection() {
        let entry = OsString::from("index.html");
        assert!(is_fragment(Path::new("docs/header.html"), &entry));
        assert!(!is_fragment(Path::new("docs/guide/index.html"), &entry));
        assert!(!is_fragment(Path::new("docs/app.js"), &entry));
    }

    #[test]
    fn test_docs_sources_skip_fragments() {
        let dir = TempDir::new().unwrap();
        let docs = dir.path().join("docs");
        fs::create_dir_all(docs.join("guide")).unwrap();
        fs::write(docs.join("index.html"), "<p>home</p>").unwrap();
        fs::write(docs.join("nav.html"), "<nav></nav>").unwrap();
        fs::write(docs.join("guide/index.html"), "<p>guide</p>").unwrap();
        fs::write(docs.join("app.js"), "let a = 1;").unwrap();

        let config = SluiceConfig {
            root: dir.path().to_path_buf(),
            ..SluiceConfig::default()
        };
        let paths: Vec<_> = docs_sources(&config)
            .unwrap()
            .into_iter()
            .map(|a| a.path)
            .collect();

        assert_eq!(
            paths,
            vec![
                Path::new("app.js").to_path_buf(),
                Path::new("guide/index.html").to_path_buf(),
                Path::new("index.html").to_path_buf(),
            ]
        );
    }

    #[test]
    fn test_docs_pipeline_rejects_bad_target() {
        let mut config = SluiceConfig::default();
        config.docs.js_target = "es1999".into();
        assert!(docs_pipeline(&config).is_err());
    }

    #[test]
    fn test_docs_pipeline_copies_untyped_assets() {
        let dir = TempDir::new().unwrap();
        let docs = dir.path().join("docs");
        fs::create_dir_all(&docs).unwrap();
        fs::write(docs.join("index.html"), "<html><body><include src=\"nav.html\"/></body></html>").unwrap();
        fs::write(docs.join("nav.html"), "<nav>menu</nav>").unwrap();
        fs::write(docs.join("logo.txt"), "logo").unwrap();

        let config = SluiceConfig {
            root: dir.path().to_path_buf(),
            ..SluiceConfig::default()
        };
        let summary = docs_pipeline(&config)
            .unwrap()
            .run(docs_sources(&config).unwrap())
            .unwrap();
        assert_eq!(summary.written, 2);

        let out = dir.path().join("dist/docs");
        assert_eq!(fs::read_to_string(out.join("logo.txt")).unwrap(), "logo");
        let html = fs::read_to_string(out.join("index.html")).unwrap();
        assert!(html.contains("<nav>menu</nav>"));
        assert!(!out.join("nav.html").exists());
    }
}
