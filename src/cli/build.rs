//! `sluice build`: style and docs once, then exit.

use anyhow::Result;

use crate::build::build_all;
use crate::config::SluiceConfig;
use crate::pipeline::report::stdout_reporter;

/// Run both builds; any failure makes the command fail.
pub fn run_build(config: &SluiceConfig) -> Result<()> {
    build_all(config, &stdout_reporter())
}
