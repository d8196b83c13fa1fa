//! Path-only stages.

use std::path::PathBuf;

use crate::asset::Asset;
use crate::pipeline::{PipelineError, Stage};

/// Insert a suffix before the extension: `a.css` -> `a.min.css`.
///
/// Applied once per pass, so `a.min.css` becomes `a.min.min.css`.
#[derive(Debug, Clone)]
pub struct Suffix {
    suffix: String,
}

impl Suffix {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }

    pub fn rename(&self, path: &std::path::Path) -> PathBuf {
        let Some(stem) = path.file_stem().map(|s| s.to_string_lossy()) else {
            return path.to_path_buf();
        };
        let name = match path.extension() {
            Some(ext) => format!("{stem}{}.{}", self.suffix, ext.to_string_lossy()),
            None => format!("{stem}{}", self.suffix),
        };
        path.with_file_name(name)
    }
}

impl Stage for Suffix {
    fn name(&self) -> &str {
        "rename"
    }

    fn apply(&self, mut asset: Asset) -> Result<Vec<Asset>, PipelineError> {
        asset.path = self.rename(&asset.path);
        Ok(vec![asset])
    }
}

/// Drop every directory component: `builds/app.css` -> `app.css`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Flatten;

impl Stage for Flatten {
    fn name(&self) -> &str {
        "flatten"
    }

    fn apply(&self, mut asset: Asset) -> Result<Vec<Asset>, PipelineError> {
        if let Some(name) = asset.path.file_name() {
            asset.path = PathBuf::from(name);
        }
        Ok(vec![asset])
    }
}
