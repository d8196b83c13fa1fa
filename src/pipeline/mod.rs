//! Staged asset pipeline.
//!
//! # Architecture
//!
//! ```text
//! ┌────────┐   ┌────────────────────────── steps ───────────────────────────┐
//! │  scan  │ → │ stage → split ─ stage ─ restore → dest → stage → report    │
//! └────────┘   └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Steps run strictly in order; the output of one step is the only input of
//! the next. Per-asset stages run in parallel (rayon) and keep stream order.
//! The first failing step aborts the run, sinks that already ran stay written.

mod error;
pub mod instrument;
pub mod partition;
pub mod report;
pub mod sink;
pub mod stage;

pub use error::PipelineError;
pub use instrument::{Instrumented, SizeDiff, Verdict, instrument};
pub use partition::{Partition, Stream};
pub use report::{Reporter, SizeReport, SizeRow, StdoutReporter};
pub use sink::Dest;
pub use stage::Stage;

use std::path::PathBuf;

use rayon::prelude::*;

use crate::asset::Asset;

/// One pipeline step.
pub enum Step {
    /// Apply a stage to every asset.
    Each(Box<dyn Stage>),
    Split(Partition),
    Restore(Partition),
    /// Persist the stream and pass it on.
    Sink(Dest),
    Report(SizeReport),
}

impl Step {
    fn describe(&self) -> String {
        match self {
            Self::Each(stage) => format!("stage `{}`", stage.name()),
            Self::Split(p) => format!("split `{}`", p.label()),
            Self::Restore(p) => format!("restore `{}`", p.label()),
            Self::Sink(dest) => format!("sink `{}`", dest.dir().display()),
            Self::Report(report) => format!("report `{}`", report.title()),
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Files written, counted per sink.
    pub written: usize,
    pub destinations: Vec<PathBuf>,
    /// The stream as it left the last step.
    pub assets: Vec<Asset>,
}

/// An ordered list of steps, built once and runnable many times.
pub struct Pipeline {
    name: String,
    steps: Vec<Step>,
}

impl Pipeline {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pipe(mut self, stage: impl Stage + 'static) -> Self {
        self.steps.push(Step::Each(Box::new(stage)));
        self
    }

    pub fn partition(mut self, partition: &Partition) -> Self {
        self.steps.push(Step::Split(partition.clone()));
        self
    }

    pub fn restore(mut self, partition: &Partition) -> Self {
        self.steps.push(Step::Restore(partition.clone()));
        self
    }

    pub fn dest(mut self, dir: impl Into<PathBuf>) -> Self {
        self.steps.push(Step::Sink(Dest::new(dir)));
        self
    }

    pub fn report(mut self, report: SizeReport) -> Self {
        self.steps.push(Step::Report(report));
        self
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Run every step over `assets`.
    pub fn run(&self, assets: Vec<Asset>) -> Result<RunSummary, PipelineError> {
        crate::debug!("pipeline"; "{}: {} assets in", self.name, assets.len());

        let mut stream = Stream::new(assets);
        let mut summary = RunSummary::default();

        for step in &self.steps {
            match step {
                Step::Each(stage) => {
                    let input = std::mem::take(&mut stream.assets);
                    stream.assets = apply_each(stage.as_ref(), input)?;
                }
                Step::Split(partition) => stream.split(partition),
                Step::Restore(partition) => stream.restore(partition)?,
                Step::Sink(dest) => {
                    stream.ensure_closed(&step.describe())?;
                    dest.write_all(&stream.assets)?;
                    summary.written += stream.assets.len();
                    summary.destinations.push(dest.dir().to_path_buf());
                }
                Step::Report(report) => report.emit(&stream.assets)?,
            }
        }

        stream.ensure_closed("end of pipeline")?;
        summary.assets = stream.into_assets();
        Ok(summary)
    }
}

/// Apply `stage` to every asset in parallel, keeping stream order.
///
/// Outputs of one input stay contiguous; the first error in stream order wins.
fn apply_each(stage: &dyn Stage, assets: Vec<Asset>) -> Result<Vec<Asset>, PipelineError> {
    let results: Vec<_> = assets.into_par_iter().map(|a| stage.apply(a)).collect();

    let mut out = Vec::with_capacity(results.len());
    for result in results {
        out.extend(result?);
    }
    Ok(out)
}
