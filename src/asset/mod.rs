//! Assets in flight through a pipeline.
//!
//! An [`Asset`] is one logical file: a path relative to the glob base it was
//! scanned from, a byte payload and an optional source map. Its identity
//! ([`Origin`] plus the path it was scanned with) never changes, so a stream
//! can be split, forked and merged while every asset stays traceable.

mod scan;
mod size;

pub use scan::{SourceSet, scan_sources};
pub use size::humanize;

use std::path::{Path, PathBuf};

use crate::pipeline::PipelineError;

/// Scan-order ordinal of the source file an asset descends from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Origin(pub u32);

/// Source map state carried by an asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapState {
    /// Maps are enabled but no map-aware stage has run yet.
    Pending,
    /// A v3 source map (JSON) describing the current content.
    Ready(String),
}

/// One logical file in flight.
#[derive(Debug, Clone)]
pub struct Asset {
    origin: Origin,
    /// Logical path at scan time.
    origin_path: PathBuf,
    /// File the asset was read from; relative references resolve against its directory.
    source: PathBuf,
    /// Logical path relative to the destination directory.
    pub path: PathBuf,
    pub content: Vec<u8>,
    pub map: Option<MapState>,
}

impl Asset {
    pub fn new(
        origin: Origin,
        source: impl Into<PathBuf>,
        path: impl Into<PathBuf>,
        content: impl Into<Vec<u8>>,
    ) -> Self {
        let path = path.into();
        Self {
            origin,
            origin_path: path.clone(),
            source: source.into(),
            path,
            content: content.into(),
            map: None,
        }
    }

    /// Build an in-memory asset whose source path equals its logical path.
    pub fn virtual_file(origin: u32, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        let path = path.into();
        Self::new(Origin(origin), path.clone(), path, content)
    }

    /// Derive a companion asset (same identity, new path and content, no map).
    pub fn derive(&self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            origin: self.origin,
            origin_path: self.origin_path.clone(),
            source: self.source.clone(),
            path: path.into(),
            content: content.into(),
            map: None,
        }
    }

    pub const fn origin(&self) -> Origin {
        self.origin
    }

    /// Logical path this asset had when it was scanned.
    pub fn origin_path(&self) -> &Path {
        &self.origin_path
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Directory that relative references inside the content resolve against.
    pub fn source_dir(&self) -> &Path {
        self.source.parent().unwrap_or_else(|| Path::new(""))
    }

    /// Byte length of the content.
    pub fn size(&self) -> usize {
        self.content.len()
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn extension(&self) -> Option<&str> {
        self.path.extension().and_then(|e| e.to_str())
    }

    /// Content as UTF-8 text.
    pub fn text(&self) -> Result<&str, PipelineError> {
        std::str::from_utf8(&self.content)
            .map_err(|e| PipelineError::source_parse(&self.source, format!("invalid UTF-8: {e}")))
    }

    /// Replace the content from a text stage.
    ///
    /// A map produced for the previous content no longer describes it, so a
    /// `Ready` map falls back to `Pending`.
    pub fn set_text(&mut self, text: String) {
        if text.as_bytes() == self.content.as_slice() {
            return;
        }
        self.content = text.into_bytes();
        if let Some(MapState::Ready(_)) = self.map {
            self.map = Some(MapState::Pending);
        }
    }

    /// Replace the content from a map-aware stage.
    ///
    /// `map` is ignored when maps are disabled for this asset.
    pub fn set_mapped(&mut self, text: String, map: Option<String>) {
        self.content = text.into_bytes();
        if self.maps_enabled() {
            self.map = Some(map.map_or(MapState::Pending, MapState::Ready));
        }
    }

    pub fn maps_enabled(&self) -> bool {
        self.map.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_keeps_identity() {
        let mut asset = Asset::virtual_file(7, "app.css", "a{}");
        asset.map = Some(MapState::Pending);
        asset.path = PathBuf::from("app.min.css");

        let map = asset.derive("app.min.css.map", "{}");
        assert_eq!(map.origin(), Origin(7));
        assert_eq!(map.origin_path(), Path::new("app.css"));
        assert!(map.map.is_none());
    }

    #[test]
    fn test_text_rejects_invalid_utf8() {
        let asset = Asset::virtual_file(0, "bad.css", vec![0xff, 0xfe]);
        let err = asset.text().unwrap_err();
        assert!(err.to_string().contains("bad.css"));
    }

    #[test]
    fn test_text_change_invalidates_ready_map() {
        let mut asset = Asset::virtual_file(0, "a.css", "a{}");
        asset.set_mapped("a{}".into(), Some("{}".into()));
        assert!(asset.map.is_none());

        asset.map = Some(MapState::Pending);
        asset.set_mapped("b{}".into(), Some("{\"version\":3}".into()));
        assert!(matches!(asset.map, Some(MapState::Ready(_))));

        asset.set_text("b{}".into());
        assert!(matches!(asset.map, Some(MapState::Ready(_))));

        asset.set_text("c{}".into());
        assert_eq!(asset.map, Some(MapState::Pending));
    }

    #[test]
    fn test_file_name_and_extension() {
        let asset = Asset::virtual_file(0, "guide/script.js", "");
        assert_eq!(asset.file_name(), "script.js");
        assert_eq!(asset.extension(), Some("js"));
        assert_eq!(asset.source_dir(), Path::new("guide"));
    }
}
