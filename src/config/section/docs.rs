//! `[docs]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [docs]
//! root = "docs"           # Include paths resolve against this directory
//! src = "docs/**"         # Every file of the docs site
//! dest = "dist/docs"      # Output directory, also served by `watch`
//! entry = "index.html"    # The only HTML file name built as a page
//! js_target = "es2015"    # Transpile target for scripts
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Docs build settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DocsConfig {
    pub root: PathBuf,
    pub src: String,
    pub dest: PathBuf,
    /// HTML files with any other name are fragments for `<include>`.
    pub entry: String,
    pub js_target: String,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            root: "docs".into(),
            src: "docs/**".into(),
            dest: "dist/docs".into(),
            entry: "index.html".into(),
            js_target: "es2015".into(),
        }
    }
}
