//! Build targets.
//!
//! - **Style** - `style.src` → flattened, prefixed, minified style sheets
//! - **Docs** - `docs.src` → included, transpiled, minified docs site
//!
//! The two targets share no state; [`build_all`] runs them concurrently.

mod docs;
mod style;

pub use docs::{docs_pipeline, docs_sources};
pub use style::{REPORT_TITLE, style_pipeline, style_sources};

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};

use crate::config::SluiceConfig;
use crate::log;
use crate::pipeline::{Reporter, RunSummary};

/// A buildable unit, also the unit of watch bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Style,
    Docs,
}

impl Target {
    pub const ALL: [Self; 2] = [Self::Style, Self::Docs];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Style => "style",
            Self::Docs => "docs",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Scan and run one target from scratch.
///
/// Pipeline failures keep their [`PipelineError`](crate::pipeline::PipelineError)
/// type inside the returned error.
pub fn run(target: Target, config: &SluiceConfig, reporter: &Arc<dyn Reporter>) -> Result<RunSummary> {
    let start = Instant::now();
    let summary = match target {
        Target::Style => style_pipeline(config, reporter).run(style_sources(config)?)?,
        Target::Docs => docs_pipeline(config)?.run(docs_sources(config)?)?,
    };

    crate::debug!(
        target.name();
        "{} files written in {:.2?}",
        summary.written,
        start.elapsed()
    );
    Ok(summary)
}

/// Build every target once, concurrently.
///
/// When both targets fail, the docs error is logged and the style error returned.
pub fn build_all(config: &SluiceConfig, reporter: &Arc<dyn Reporter>) -> Result<()> {
    let (style, docs) = rayon::join(
        || run(Target::Style, config, reporter).context("style build failed"),
        || run(Target::Docs, config, reporter).context("docs build failed"),
    );

    for (target, result) in [(Target::Style, &style), (Target::Docs, &docs)] {
        if let Ok(summary) = result {
            log!(target.name(); "wrote {} files", summary.written);
        }
    }

    match (style, docs) {
        (Err(style), Err(docs)) => {
            log!("error"; "{:#}", docs);
            Err(style)
        }
        (style, docs) => style.and(docs).map(|_| ()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_names() {
        assert_eq!(Target::Style.to_string(), "style");
        assert_eq!(Target::Docs.name(), "docs");
        assert_eq!(Target::ALL.len(), 2);
    }
}
