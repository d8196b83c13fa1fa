//! Size-diff instrumentation.
//!
//! [`instrument`] wraps any stage, measures the asset before and after, and
//! hands a [`SizeDiff`] to the reporter. Content is never touched, so wrappers
//! nest freely:
//!
//! ```ignore
//! instrument("minification", CssMinify::new(targets))
//! ```

use std::sync::Arc;

use owo_colors::OwoColorize;

use super::PipelineError;
use super::report::{Reporter, stdout_reporter};
use super::stage::Stage;
use crate::asset::{Asset, humanize};

/// Width of the right-aligned stage column.
const LABEL_WIDTH: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Kept,
    Saved,
    Gained,
}

/// Size measurement of one asset across one stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeDiff {
    pub label: String,
    pub file: String,
    pub before: u64,
    pub after: u64,
}

impl SizeDiff {
    pub fn verdict(&self) -> Verdict {
        match self.after.cmp(&self.before) {
            std::cmp::Ordering::Equal => Verdict::Kept,
            std::cmp::Ordering::Less => Verdict::Saved,
            std::cmp::Ordering::Greater => Verdict::Gained,
        }
    }

    /// The message part without colors.
    pub fn message(&self) -> String {
        match self.verdict() {
            Verdict::Kept => format!("kept original filesize. ({})", humanize(self.before)),
            verdict => format!(
                "{} {} ({} -> {})",
                if verdict == Verdict::Saved { "saved" } else { "gained" },
                humanize(self.before.abs_diff(self.after)),
                humanize(self.before),
                humanize(self.after)
            ),
        }
    }

    /// The full report line with colors.
    pub fn render(&self) -> String {
        let label = format!("{:>width$}", self.label, width = LABEL_WIDTH);
        let message = match self.verdict() {
            Verdict::Kept => format!(
                "kept original filesize. ({})",
                humanize(self.before).bold()
            ),
            verdict => {
                let after = humanize(self.after);
                let after = if verdict == Verdict::Gained {
                    after.yellow().bold().to_string()
                } else {
                    after.green().bold().to_string()
                };
                format!(
                    "{} {} ({} -> {after})",
                    if verdict == Verdict::Saved { "saved" } else { "gained" },
                    humanize(self.before.abs_diff(self.after)),
                    humanize(self.before),
                )
            }
        };
        format!("{}: {} {message}", label.cyan(), self.file.bold())
    }
}

/// A stage wrapped with size-diff measurement.
pub struct Instrumented<S> {
    label: String,
    inner: S,
    reporter: Arc<dyn Reporter>,
}

/// Wrap `stage` so every application reports a size diff under `label`.
pub fn instrument<S: Stage>(label: impl Into<String>, stage: S) -> Instrumented<S> {
    Instrumented {
        label: label.into(),
        inner: stage,
        reporter: stdout_reporter(),
    }
}

impl<S: Stage> Instrumented<S> {
    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }
}

impl<S: Stage> Stage for Instrumented<S> {
    fn name(&self) -> &str {
        &self.label
    }

    fn apply(&self, asset: Asset) -> Result<Vec<Asset>, PipelineError> {
        let path = asset.path.clone();
        let file = path.display().to_string();
        let before = asset.size() as u64;

        let outputs = self.inner.apply(asset)?;

        // Forked companions (maps) are not part of the asset's size
        let primary = outputs
            .iter()
            .find(|a| a.path == path)
            .or_else(|| outputs.first());
        let after = primary.map_or(0, |a| a.size() as u64);
        self.reporter.size_diff(&SizeDiff {
            label: self.label.clone(),
            file,
            before,
            after,
        });
        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::report::SizeRow;
    use crate::pipeline::stage::{from_fn, map};
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recording(Mutex<Vec<SizeDiff>>);

    impl Reporter for Recording {
        fn size_diff(&self, diff: &SizeDiff) {
            self.0.lock().push(diff.clone());
        }

        fn size_report(&self, _title: &str, _rows: &[SizeRow]) {}
    }

    fn diff(before: u64, after: u64) -> SizeDiff {
        SizeDiff {
            label: "minification".into(),
            file: "app.css".into(),
            before,
            after,
        }
    }

    #[test]
    fn test_message_kept() {
        let d = diff(1024, 1024);
        assert_eq!(d.verdict(), Verdict::Kept);
        assert_eq!(d.message(), "kept original filesize. (1 kB)");
    }

    #[test]
    fn test_message_saved() {
        let d = diff(2048, 1536);
        assert_eq!(d.verdict(), Verdict::Saved);
        assert_eq!(d.message(), "saved 512 B (2 kB -> 1.5 kB)");
    }

    #[test]
    fn test_message_gained() {
        let d = diff(1000, 1100);
        assert_eq!(d.verdict(), Verdict::Gained);
        assert_eq!(d.message(), "gained 100 B (1000 B -> 1.07 kB)");
    }

    #[test]
    fn test_render_pads_label() {
        let line = diff(10, 10).render();
        assert!(line.contains("minification"));
        let short = SizeDiff {
            label: "css".into(),
            ..diff(10, 10)
        };
        assert!(short.render().contains(&format!("{:>12}", "css")));
    }

    #[test]
    fn test_instrument_reports_without_altering_content() {
        let rec = Arc::new(Recording::default());
        let stage = instrument(
            "shrink",
            map("shrink", |mut a: Asset| {
                a.content.truncate(2);
                Ok(a)
            }),
        )
        .with_reporter(rec.clone());

        let out = stage.apply(Asset::virtual_file(0, "a.css", "abcdef")).unwrap();
        assert_eq!(out[0].content, b"ab");

        let diffs = rec.0.lock();
        assert_eq!(diffs.len(), 1);
        assert_eq!((diffs[0].before, diffs[0].after), (6, 2));
        assert_eq!(diffs[0].file, "a.css");
    }

    #[test]
    fn test_instrument_ignores_forked_companions() {
        let rec = Arc::new(Recording::default());
        let fork = from_fn("fork", |a: Asset| {
            let map = a.derive("a.css.map", "{\"version\":3}");
            Ok(vec![map, a])
        });
        let stage = instrument("fork", fork).with_reporter(rec.clone());
        let out = stage.apply(Asset::virtual_file(0, "a.css", "abc")).unwrap();
        assert_eq!(out.len(), 2);

        let diff = rec.0.lock()[0].clone();
        assert_eq!((diff.before, diff.after), (3, 3));
        assert_eq!(diff.verdict(), Verdict::Kept);
    }

    #[test]
    fn test_instrument_renamed_output_measured() {
        let rec = Arc::new(Recording::default());
        let rename = map("rename", |mut a: Asset| {
            a.path = "a.min.css".into();
            a.content.truncate(1);
            Ok(a)
        });
        let stage = instrument("rename", rename).with_reporter(rec.clone());
        stage.apply(Asset::virtual_file(0, "a.css", "abc")).unwrap();
        assert_eq!(rec.0.lock()[0].after, 1);
    }

    #[test]
    fn test_instrument_nests() {
        let rec = Arc::new(Recording::default());
        let identity = map("id", Ok);
        let stage = instrument("outer", instrument("inner", identity).with_reporter(rec.clone()))
            .with_reporter(rec.clone());
        let out = stage.apply(Asset::virtual_file(0, "a.css", "abc")).unwrap();
        assert_eq!(out[0].content, b"abc");

        let labels: Vec<_> = rec.0.lock().iter().map(|d| d.label.clone()).collect();
        assert_eq!(labels, vec!["inner", "outer"]);
    }

    #[test]
    fn test_errors_skip_report() {
        let rec = Arc::new(Recording::default());
        let failing = map("fail", |a: Asset| {
            Err(PipelineError::source_parse(a.source(), "boom"))
        });
        let stage = instrument("fail", failing).with_reporter(rec.clone());
        assert!(stage.apply(Asset::virtual_file(0, "a.css", "")).is_err());
        assert!(rec.0.lock().is_empty());
    }
}
