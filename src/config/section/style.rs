//! `[style]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [style]
//! src = "src/builds/*.css"        # Entry style sheets, one output each
//! watch = "src/**/*.css"          # Rebuild when any of these change
//! dest = "dist"                   # Flattened output directory
//! mirror = "dist/docs/water.css"  # Second copy of the minified files ("" to skip)
//! targets = "legacy"              # legacy | modern
//! suffix = ".min"                 # Minified file name suffix
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::transform::BrowserTargets;

/// Style build settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StyleConfig {
    pub src: String,
    pub watch: String,
    pub dest: PathBuf,
    /// Extra destination for the minified artifacts; empty disables it.
    pub mirror: PathBuf,
    pub targets: BrowserTargets,
    pub suffix: String,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            src: "src/builds/*.css".into(),
            watch: "src/**/*.css".into(),
            dest: "dist".into(),
            mirror: "dist/docs/water.css".into(),
            targets: BrowserTargets::Legacy,
            suffix: ".min".into(),
        }
    }
}
