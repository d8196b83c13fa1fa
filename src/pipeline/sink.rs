//! Destination sinks.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use super::PipelineError;
use crate::asset::Asset;

/// Writes every asset reaching it to `dir/<asset.path>` and passes the
/// stream on unchanged.
#[derive(Debug, Clone)]
pub struct Dest {
    dir: PathBuf,
}

impl Dest {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn write_all(&self, assets: &[Asset]) -> Result<(), PipelineError> {
        assets.par_iter().try_for_each(|asset| self.write(asset))?;
        crate::debug!("dest"; "wrote {} files to {}", assets.len(), self.dir.display());
        Ok(())
    }

    fn write(&self, asset: &Asset) -> Result<(), PipelineError> {
        let target = self.dir.join(&asset.path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
        }
        fs::write(&target, &asset.content).map_err(|e| PipelineError::io(&target, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_nested_dirs() {
        let dir = TempDir::new().unwrap();
        let dest = Dest::new(dir.path().join("dist/docs"));
        let assets = vec![
            Asset::virtual_file(0, "index.html", "<p>"),
            Asset::virtual_file(1, "guide/index.html", "<p>guide"),
        ];
        dest.write_all(&assets).unwrap();

        let guide = fs::read_to_string(dir.path().join("dist/docs/guide/index.html")).unwrap();
        assert_eq!(guide, "<p>guide");
    }

    #[test]
    fn test_write_failure_is_io_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("dist");
        fs::write(&blocker, "file, not a dir").unwrap();

        let err = Dest::new(&blocker)
            .write_all(&[Asset::virtual_file(0, "a.css", "")])
            .unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
    }
}
