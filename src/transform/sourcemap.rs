//! Source map bracket stages.
//!
//! `SourceMapsInit` switches maps on; map-aware stages in between fill them
//! in; `SourceMapsWrite` forks every mapped asset into its content (with a
//! `sourceMappingURL` trailer) and a `<path>.map` companion.

use std::path::PathBuf;

use serde_json::{Value, json};

use crate::asset::{Asset, MapState};
use crate::pipeline::{PipelineError, Stage};

/// Enable source maps on every asset passing through.
#[derive(Debug, Default, Clone, Copy)]
pub struct SourceMapsInit;

impl Stage for SourceMapsInit {
    fn name(&self) -> &str {
        "sourcemaps init"
    }

    fn apply(&self, mut asset: Asset) -> Result<Vec<Asset>, PipelineError> {
        if asset.map.is_none() {
            asset.map = Some(MapState::Pending);
        }
        Ok(vec![asset])
    }
}

/// Emit `.map` companions next to their files.
#[derive(Debug, Default, Clone, Copy)]
pub struct SourceMapsWrite;

impl Stage for SourceMapsWrite {
    fn name(&self) -> &str {
        "sourcemaps write"
    }

    fn apply(&self, mut asset: Asset) -> Result<Vec<Asset>, PipelineError> {
        let Some(state) = asset.map.take() else {
            return Ok(vec![asset]);
        };

        let file_name = asset.file_name();
        let map_json = match state {
            MapState::Ready(json) => with_file(&json, &file_name)
                .map_err(|e| PipelineError::source_parse(asset.source(), e.to_string()))?,
            MapState::Pending => identity_map(&asset, &file_name),
        };

        let map_name = format!("{file_name}.map");
        let mut content = std::mem::take(&mut asset.content);
        let trailer = match asset.extension() {
            Some("css") => Some(format!("/*# sourceMappingURL={map_name} */")),
            Some("js" | "mjs") => Some(format!("//# sourceMappingURL={map_name}")),
            _ => None,
        };
        if let Some(trailer) = trailer {
            if !content.ends_with(b"\n") {
                content.push(b'\n');
            }
            content.extend_from_slice(trailer.as_bytes());
            content.push(b'\n');
        }
        asset.content = content;

        let map_path: PathBuf = asset.path.with_file_name(&map_name);
        let companion = asset.derive(map_path, map_json);

        // Maps stay on so a later write describes the next content.
        asset.map = Some(MapState::Pending);
        Ok(vec![asset, companion])
    }
}

/// Point a generated map at the current file name.
fn with_file(json: &str, file_name: &str) -> serde_json::Result<String> {
    let mut map: Value = serde_json::from_str(json)?;
    if let Some(obj) = map.as_object_mut() {
        obj.insert("file".to_string(), Value::String(file_name.to_string()));
    }
    serde_json::to_string(&map)
}

/// A map for content no map-aware stage has touched: the file maps onto its
/// own source, which is embedded.
fn identity_map(asset: &Asset, file_name: &str) -> String {
    let source = crate::utils::path::to_slash(asset.origin_path());
    json!({
        "version": 3,
        "file": file_name,
        "sources": [source],
        "sourcesContent": [String::from_utf8_lossy(&asset.content)],
        "names": [],
        "mappings": "",
    })
    .to_string()
}
