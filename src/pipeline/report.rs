//! Report sinks: where size diffs and size tables go.

use std::io::Write;
use std::sync::Arc;

use flate2::Compression;
use flate2::write::GzEncoder;
use owo_colors::OwoColorize;

use super::PipelineError;
use super::instrument::SizeDiff;
use crate::asset::{Asset, humanize};
use crate::logger::report_line;

/// Receives instrumentation output.
///
/// The default writes to stdout; tests install a recording reporter.
pub trait Reporter: Send + Sync {
    fn size_diff(&self, diff: &SizeDiff);

    fn size_report(&self, title: &str, rows: &[SizeRow]);
}

/// Writes colored report lines to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutReporter;

impl Reporter for StdoutReporter {
    fn size_diff(&self, diff: &SizeDiff) {
        report_line(&diff.render());
    }

    fn size_report(&self, title: &str, rows: &[SizeRow]) {
        for line in render_table(title, rows) {
            report_line(&line);
        }
    }
}

pub fn stdout_reporter() -> Arc<dyn Reporter> {
    Arc::new(StdoutReporter)
}

/// One file in a size report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeRow {
    pub name: String,
    pub size: u64,
    pub gzip: u64,
}

impl SizeRow {
    pub fn measure(asset: &Asset) -> Result<Self, PipelineError> {
        Ok(Self {
            name: asset.path.display().to_string(),
            size: asset.size() as u64,
            gzip: gzip_size(&asset.content).map_err(|e| PipelineError::io(&asset.path, e))?,
        })
    }
}

/// Byte length of `bytes` after gzip at the default level.
pub fn gzip_size(bytes: &[u8]) -> std::io::Result<u64> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    Ok(encoder.finish()?.len() as u64)
}

/// A report step: one row per asset reaching it, stream unchanged.
#[derive(Clone)]
pub struct SizeReport {
    title: String,
    reporter: Arc<dyn Reporter>,
}

impl SizeReport {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            reporter: stdout_reporter(),
        }
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn emit(&self, assets: &[Asset]) -> Result<(), PipelineError> {
        let rows = assets
            .iter()
            .map(SizeRow::measure)
            .collect::<Result<Vec<_>, _>>()?;
        self.reporter.size_report(&self.title, &rows);
        Ok(())
    }
}

fn render_table(title: &str, rows: &[SizeRow]) -> Vec<String> {
    let cells: Vec<[String; 3]> = rows
        .iter()
        .map(|r| [r.name.clone(), humanize(r.size), humanize(r.gzip)])
        .collect();
    let header = ["File", "Original", "Gzipped"];

    let mut widths = header.map(str::len);
    for row in &cells {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.len());
        }
    }

    let mut lines = vec![
        title.bold().to_string(),
        format!(
            "  {:<w0$}  {:>w1$}  {:>w2$}",
            header[0],
            header[1],
            header[2],
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2]
        )
        .dimmed()
        .to_string(),
    ];
    for [name, size, gzip] in cells {
        lines.push(format!(
            "  {:<w0$}  {:>w1$}  {:>w2$}",
            name.cyan().to_string(),
            size,
            gzip.green().to_string(),
            w0 = widths[0] + color_overhead(&name),
            w1 = widths[1],
            w2 = widths[2] + color_overhead(&gzip),
        ));
    }
    lines
}

/// Extra bytes that ANSI codes add to a colored cell (zero without colors).
fn color_overhead(plain: &str) -> usize {
    plain.cyan().to_string().len() - plain.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gzip_size_of_repetitive_input_is_small() {
        let input = "a{color:red}".repeat(200);
        let gz = gzip_size(input.as_bytes()).unwrap();
        assert!(gz > 0);
        assert!(gz < input.len() as u64);
    }

    #[test]
    fn test_size_row_measure() {
        let asset = Asset::virtual_file(0, "app.min.css", "body{margin:0}");
        let row = SizeRow::measure(&asset).unwrap();
        assert_eq!(row.name, "app.min.css");
        assert_eq!(row.size, 14);
        assert!(row.gzip > 0);
    }

    #[test]
    fn test_render_table_has_title_and_rows() {
        owo_colors::set_override(false);
        let rows = vec![SizeRow {
            name: "app.min.css".into(),
            size: 2048,
            gzip: 700,
        }];
        let lines = render_table("SIZE REPORT", &rows);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("SIZE REPORT"));
        assert!(lines[2].contains("app.min.css"));
        assert!(lines[2].contains("2 kB"));
        assert!(lines[2].contains("700 B"));
    }
}
