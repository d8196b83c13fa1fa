//! Style sheet build.
//!
//! ```text
//! src/builds/*.css
//!   → maps init → import → color-mod → svg-load
//!   → [css variables] → [autoprefixer] → maps write → flatten → dist/
//!   → *.css only → [minification] → .min → maps write → dist/ (+ mirror)
//!   → *.css only → SIZE REPORT
//! ```
//!
//! Bracketed stages are instrumented and print a size diff per file.

use std::sync::Arc;

use anyhow::Result;

use crate::asset::{Asset, SourceSet, scan_sources};
use crate::config::SluiceConfig;
use crate::pipeline::{Pipeline, Reporter, SizeReport, instrument};
use crate::transform::{
    Autoprefix, ColorMod, CssMinify, Flatten, ImportInliner, InlineSvg, InlineVars, Retain,
    SourceMapsInit, SourceMapsWrite, Suffix,
};

/// Title of the table printed after the last sink.
pub const REPORT_TITLE: &str = "SIZE REPORT";

/// Entry style sheets matched by `style.src`.
pub fn style_sources(config: &SluiceConfig) -> Result<Vec<Asset>> {
    scan_sources(&SourceSet::new(&config.root, &config.style.src)?)
}

/// Assemble the style pipeline for `config`.
pub fn style_pipeline(config: &SluiceConfig, reporter: &Arc<dyn Reporter>) -> Pipeline {
    let style = &config.style;
    let targets = style.targets;
    let dest = config.root_join(&style.dest);

    let mut pipeline = Pipeline::new("style")
        .pipe(SourceMapsInit)
        .pipe(ImportInliner::default())
        .pipe(ColorMod)
        .pipe(InlineSvg)
        .pipe(instrument("css variables", InlineVars).with_reporter(reporter.clone()))
        .pipe(instrument("autoprefixer", Autoprefix::new(targets)).with_reporter(reporter.clone()))
        .pipe(SourceMapsWrite)
        .pipe(Flatten)
        .dest(dest.clone())
        .pipe(Retain::css())
        .pipe(instrument("minification", CssMinify::new(targets)).with_reporter(reporter.clone()))
        .pipe(Suffix::new(style.suffix.as_str()))
        .pipe(SourceMapsWrite)
        .dest(dest);

    if !style.mirror.as_os_str().is_empty() {
        pipeline = pipeline.dest(config.root_join(&style.mirror));
    }

    pipeline
        .pipe(Retain::css())
        .report(SizeReport::new(REPORT_TITLE).with_reporter(reporter.clone()))
}
